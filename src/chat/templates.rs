//! Prompt templates per task type.
//!
//! Each task type has a built-in template; a configured template directory
//! can override any of them with `<task>.tpl` files. Templates use
//! `{{query}}` and `{{context}}` placeholders.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The kind of work a chat request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Answer,
    Summarize,
    Explain,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Answer, TaskType::Summarize, TaskType::Explain];

    /// File stem of the override template for this task.
    pub fn file_stem(&self) -> &'static str {
        match self {
            TaskType::Answer => "answer",
            TaskType::Summarize => "summarize",
            TaskType::Explain => "explain",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Inputs substituted into a template.
pub struct PromptContext<'a> {
    pub query: &'a str,
    pub context: Option<&'a str>,
}

const ANSWER_TEMPLATE: &str = "You are a helpful assistant.\n\n\
Context: {{context}}\n\n\
Question: {{query}}\n\n\
Answer the question directly and concisely.";

const SUMMARIZE_TEMPLATE: &str = "You are a helpful assistant.\n\n\
Context: {{context}}\n\n\
Summarize the following text in a few sentences:\n{{query}}";

const EXPLAIN_TEMPLATE: &str = "You are a helpful assistant.\n\n\
Context: {{context}}\n\n\
Explain the following in simple terms:\n{{query}}";

const DEFAULT_CONTEXT: &str = "No additional context provided.";

/// Template set keyed by task type.
pub struct PromptTemplates {
    templates: HashMap<TaskType, String>,
}

impl PromptTemplates {
    /// The built-in template set.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert(TaskType::Answer, ANSWER_TEMPLATE.to_string());
        templates.insert(TaskType::Summarize, SUMMARIZE_TEMPLATE.to_string());
        templates.insert(TaskType::Explain, EXPLAIN_TEMPLATE.to_string());
        Self { templates }
    }

    /// Built-ins with per-task overrides from `<dir>/<task>.tpl`.
    ///
    /// Missing or unreadable files leave the built-in in place.
    pub fn from_dir(dir: &Path) -> Self {
        let mut set = Self::builtin();
        let mut overridden = 0;

        for task in TaskType::ALL {
            let path = dir.join(format!("{}.tpl", task.file_stem()));
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    set.templates.insert(task, contents);
                    overridden += 1;
                }
                Err(e) => {
                    warn!("failed to read template {}: {}", path.display(), e);
                }
            }
        }

        info!(
            dir = %dir.display(),
            overridden,
            "loaded prompt template overrides"
        );
        set
    }

    /// Render the template for `task` with the given inputs.
    pub fn render(&self, task: TaskType, ctx: &PromptContext<'_>) -> String {
        let template = &self.templates[&task];
        template
            .replace("{{query}}", ctx.query)
            .replace("{{context}}", ctx.context.unwrap_or(DEFAULT_CONTEXT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_render_substitutes_query_and_context() {
        let templates = PromptTemplates::builtin();
        let prompt = templates.render(
            TaskType::Answer,
            &PromptContext {
                query: "What is Rust?",
                context: Some("A language question."),
            },
        );
        assert!(prompt.contains("What is Rust?"));
        assert!(prompt.contains("A language question."));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_missing_context_gets_default_text() {
        let templates = PromptTemplates::builtin();
        let prompt = templates.render(
            TaskType::Summarize,
            &PromptContext {
                query: "some text",
                context: None,
            },
        );
        assert!(prompt.contains(DEFAULT_CONTEXT));
    }

    #[test]
    fn test_task_type_deserializes_lowercase() {
        let task: TaskType = serde_json::from_str("\"summarize\"").unwrap();
        assert_eq!(task, TaskType::Summarize);
        assert!(serde_json::from_str::<TaskType>("\"Summarize\"").is_err());
    }

    #[test]
    fn test_from_dir_overrides_only_present_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("explain.tpl"), "Custom: {{query}}").unwrap();

        let templates = PromptTemplates::from_dir(dir.path());
        let custom = templates.render(
            TaskType::Explain,
            &PromptContext {
                query: "q",
                context: None,
            },
        );
        assert_eq!(custom, "Custom: q");

        let builtin = templates.render(
            TaskType::Answer,
            &PromptContext {
                query: "q",
                context: None,
            },
        );
        assert!(builtin.contains("Answer the question"));
    }
}
