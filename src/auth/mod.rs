//! Cookie-and-token authentication.
//!
//! The scheme is assembled from three seams:
//!
//! - **Token model**: claims, the immutable [`Token`], and the request
//!   [`Principal`]
//! - **JWT backend**: [`TokenParser`] / [`TokenGenerator`] implementations
//!   signing with Ed25519 (or a fixed dev secret when unconfigured)
//! - **Cookie transport**: [`CookieTokenAccessor`] moves tokens via an
//!   HttpOnly cookie
//!
//! [`TokenAuthScheme`] ties them together and exposes the lifecycle the
//! HTTP layer drives: authenticate, sign-in, sign-out, challenge and
//! forbidden, each overridable through [`TokenAuthEvents`].

mod cookie;
mod events;
mod jwt;
mod scheme;
mod token;

pub use cookie::{CookieTokenAccessor, DEFAULT_COOKIE_NAME};
pub use events::{ChallengeContext, ForbiddenContext, SigningInContext, TokenAuthEvents};
pub use jwt::{JwtTokenGenerator, JwtTokenParser, TokenGenerator, TokenParser};
pub use scheme::TokenAuthScheme;
pub use token::{Claim, Principal, Token, TokenGenerationResult, TokenParseError, known_claims};
