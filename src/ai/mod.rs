//! AI provider clients and their registry.
//!
//! Every provider implements [`AiClient`]; the factory owns the registered
//! set and resolves request-supplied provider names. Network-backed clients
//! share the chat-completions wire shape, so the request body builder and
//! the response extractor live here.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::errors::AppError;

mod factory;
mod mock;
mod openai;
mod openrouter;

pub use factory::AiProviderFactory;
pub use mock::MockClient;
pub use openai::OpenAiClient;
pub use openrouter::OpenRouterClient;

pub type QueryFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AppError>> + Send + 'a>>;

/// A single AI provider backend.
pub trait AiClient: Send + Sync {
    /// Canonical provider name, e.g. `"OpenAi"`. Matching against
    /// request-supplied names is case-insensitive.
    fn provider_name(&self) -> &str;

    /// Send `prompt` and return the completion text.
    ///
    /// Callers must not pass an empty or whitespace-only prompt; doing so
    /// is a contract violation and panics.
    fn query<'a>(&'a self, prompt: &'a str) -> QueryFuture<'a>;
}

/// Chat-completions request body shared by the network clients.
pub(crate) fn completion_body(model: &str, max_tokens: u32, prompt: &str) -> Value {
    serde_json::json!({
        "model": model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "max_tokens": max_tokens,
    })
}

/// Pull `choices[0].message.content` out of a chat-completions response.
///
/// A null content is a valid empty completion. A missing path means the
/// body is not the shape we asked for, which the caller reports as a
/// provider error.
pub(crate) fn parse_completion(body: &str) -> Result<String, String> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|e| format!("response is not valid JSON: {}", e))?;

    let content = parsed
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .ok_or_else(|| "response has no choices[0].message.content".to_string())?;

    Ok(match content {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// First 200 characters of an error body, for log and error messages.
pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Serve exactly one HTTP request with a fixed status and body, returning
/// the base URL to point a client at.
#[cfg(test)]
pub(crate) async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 16 * 1024];
        let mut read = 0;
        // Drain headers plus the Content-Length body before answering.
        loop {
            let n = socket.read(&mut buf[read..]).await.unwrap();
            if n == 0 {
                break;
            }
            read += n;
            let head = String::from_utf8_lossy(&buf[..read]).into_owned();
            if let Some(header_end) = head.find("\r\n\r\n") {
                let content_length = head
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if read >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });

    format!("http://{}/", addr)
}
