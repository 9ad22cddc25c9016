//! Token model: claims, the immutable token, and the request principal.

use serde::{Deserialize, Serialize};

/// Claim names shared between sign-in and parsing.
pub mod known_claims {
    pub const SUBJECT: &str = "sub";
    pub const ISSUER: &str = "iss";
    pub const AUDIENCE: &str = "aud";
    pub const ROLE: &str = "role";
}

/// A named, string-valued fact about the authenticated subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub kind: String,
    pub value: String,
}

impl Claim {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// An immutable, ordered collection of claims recovered from a parsed token.
///
/// A token with zero claims is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    claims: Vec<Claim>,
}

impl Token {
    pub fn new(claims: Vec<Claim>) -> Self {
        Self { claims }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }
}

/// The opaque signed access token produced by a generator.
#[derive(Debug, Clone)]
pub struct TokenGenerationResult {
    pub access_token: String,
}

/// Diagnostic message describing why a token failed validation.
///
/// Malformed or invalid input always yields this error rather than a panic;
/// only parser misconfiguration (caught at construction) is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParseError(pub String);

impl std::fmt::Display for TokenParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TokenParseError {}

/// The authenticated identity attached to a request.
///
/// A transient projection of a token's claims; the token owns nothing once
/// the principal is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    claims: Vec<Claim>,
}

impl Principal {
    pub fn new(claims: Vec<Claim>) -> Self {
        Self { claims }
    }

    pub fn from_token(token: &Token) -> Self {
        Self {
            claims: token.claims().to_vec(),
        }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// First claim value of the given kind, if any.
    pub fn claim(&self, kind: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.value.as_str())
    }

    pub fn subject(&self) -> Option<&str> {
        self.claim(known_claims::SUBJECT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_valid() {
        let token = Token::empty();
        assert!(token.claims().is_empty());
    }

    #[test]
    fn test_token_preserves_claim_order() {
        let token = Token::new(vec![
            Claim::new("sub", "42"),
            Claim::new("role", "admin"),
            Claim::new("role", "editor"),
        ]);
        let kinds: Vec<&str> = token.claims().iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["sub", "role", "role"]);
    }

    #[test]
    fn test_principal_subject_lookup() {
        let principal = Principal::new(vec![
            Claim::new(known_claims::SUBJECT, "42"),
            Claim::new(known_claims::ROLE, "admin"),
        ]);
        assert_eq!(principal.subject(), Some("42"));
        assert_eq!(principal.claim(known_claims::ROLE), Some("admin"));
        assert_eq!(principal.claim("missing"), None);
    }

    #[test]
    fn test_principal_from_token_copies_claims() {
        let token = Token::new(vec![Claim::new("sub", "7")]);
        let principal = Principal::from_token(&token);
        assert_eq!(principal.claims(), token.claims());
    }
}
