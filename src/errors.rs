//! Error taxonomy shared across the backend.
//!
//! Every expected failure travels through the layers as an [`AppError`] value
//! and is rendered at the HTTP boundary as a structured error document with a
//! stable machine-readable code. Unexpected conditions (contract violations,
//! startup misconfiguration) are not represented here; they fail hard via
//! panic or `anyhow` during startup.

use std::fmt;

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::{Value, json};

/// Typed error values for all expected failure paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Missing or invalid credentials.
    AuthenticationFailed(String),
    /// Authenticated but insufficiently privileged.
    AuthorizationFailed(String),
    /// The requested AI provider is not registered (or none are).
    ProviderNotFound { provider: String, detail: String },
    /// An upstream AI call failed: bad status, transport error, malformed body.
    AiProvider {
        provider: String,
        status: Option<u16>,
        detail: String,
    },
    /// Malformed request payload.
    ValidationFailed(String),
    /// A referenced domain entity does not exist.
    EntityNotFound { entity: String, id: String },
}

impl AppError {
    pub fn provider_not_found(provider: &str, detail: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            provider: provider.to_string(),
            detail: detail.into(),
        }
    }

    pub fn ai_provider(provider: &str, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::AiProvider {
            provider: provider.to_string(),
            status,
            detail: detail.into(),
        }
    }

    /// Stable machine-readable code for client-side dispatch.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "common.authentication_failed",
            Self::AuthorizationFailed(_) => "common.authorization_failed",
            Self::ProviderNotFound { .. } => "ai.provider_not_found",
            Self::AiProvider { .. } => "ai.provider_error",
            Self::ValidationFailed(_) => "common.validation_failed",
            Self::EntityNotFound { .. } => "common.entity_not_found",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "Authentication failed",
            Self::AuthorizationFailed(_) => "Authorization failed",
            Self::ProviderNotFound { .. } => "AI provider not found",
            Self::AiProvider { .. } => "AI provider error",
            Self::ValidationFailed(_) => "Validation failed",
            Self::EntityNotFound { .. } => "Entity not found",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::AuthenticationFailed(detail)
            | Self::AuthorizationFailed(detail)
            | Self::ValidationFailed(detail)
            | Self::ProviderNotFound { detail, .. }
            | Self::AiProvider { detail, .. } => detail.clone(),
            Self::EntityNotFound { entity, id } => {
                format!("No {} exists with id '{}'", entity, id)
            }
        }
    }

    /// HTTP status the boundary maps this error to.
    ///
    /// The provider name is request-supplied on the chat endpoint, so an
    /// unknown provider is a client error rather than a server one.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            Self::AuthorizationFailed(_) => StatusCode::FORBIDDEN,
            Self::ProviderNotFound { .. } => StatusCode::BAD_REQUEST,
            Self::AiProvider { .. } => StatusCode::BAD_GATEWAY,
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::EntityNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    /// Structured parameters for diagnostics, `Value::Null` when none apply.
    pub fn params(&self) -> Value {
        match self {
            Self::ProviderNotFound { provider, .. } => json!({ "providerName": provider }),
            Self::AiProvider {
                provider, status, ..
            } => json!({ "providerName": provider, "statusCode": status }),
            Self::EntityNotFound { entity, id } => json!({ "entity": entity, "id": id }),
            _ => Value::Null,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.detail())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut document = json!({
            "code": self.code(),
            "title": self.title(),
            "detail": self.detail(),
        });
        let params = self.params();
        if !params.is_null() {
            document["params"] = params;
        }
        (self.status_code(), Json(document)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_code_and_detail() {
        let err = AppError::AuthenticationFailed("no access token provided".to_string());
        assert_eq!(
            err.to_string(),
            "common.authentication_failed: no access token provided"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::AuthenticationFailed(String::new()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::AuthorizationFailed(String::new()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::provider_not_found("Nope", "unknown").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ai_provider("OpenAi", Some(500), "boom").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::ValidationFailed(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::EntityNotFound {
                entity: "school".to_string(),
                id: "42".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_ai_provider_params_carry_provider_and_status() {
        let err = AppError::ai_provider("OpenAi", Some(503), "unavailable");
        let params = err.params();
        assert_eq!(params["providerName"], "OpenAi");
        assert_eq!(params["statusCode"], 503);
    }

    #[test]
    fn test_entity_not_found_detail() {
        let err = AppError::EntityNotFound {
            entity: "user".to_string(),
            id: "abc".to_string(),
        };
        assert_eq!(err.detail(), "No user exists with id 'abc'");
    }
}
