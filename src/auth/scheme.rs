//! The token authentication scheme: authenticate, sign-in, sign-out,
//! challenge and forbidden, wired through the cookie accessor and the
//! token parser/generator pair.

use std::sync::Arc;

use axum::body::Body;
use http::{HeaderMap, Response, StatusCode};
use tracing::debug;

use crate::auth::cookie::CookieTokenAccessor;
use crate::auth::events::{SigningInContext, TokenAuthEvents};
use crate::auth::jwt::{TokenGenerator, TokenParser};
use crate::auth::token::Principal;
use crate::errors::AppError;

/// Cookie-transported token authentication.
///
/// Parser and generator are trait objects so the signing backend can be
/// swapped without touching the scheme.
pub struct TokenAuthScheme {
    accessor: CookieTokenAccessor,
    parser: Arc<dyn TokenParser>,
    generator: Arc<dyn TokenGenerator>,
    events: TokenAuthEvents,
}

impl TokenAuthScheme {
    pub fn new(
        accessor: CookieTokenAccessor,
        parser: Arc<dyn TokenParser>,
        generator: Arc<dyn TokenGenerator>,
    ) -> Self {
        Self {
            accessor,
            parser,
            generator,
            events: TokenAuthEvents::default(),
        }
    }

    pub fn with_events(mut self, events: TokenAuthEvents) -> Self {
        self.events = events;
        self
    }

    /// Resolve the request's principal from its token cookie.
    ///
    /// A missing cookie and an invalid token both fail authentication; the
    /// error detail distinguishes them for logs and clients.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        let token = self
            .accessor
            .get(headers)
            .ok_or_else(|| AppError::AuthenticationFailed("no access token provided".to_string()))?;

        let parsed = self
            .parser
            .parse(&token)
            .map_err(|e| AppError::AuthenticationFailed(e.0))?;

        Ok(Principal::from_token(&parsed))
    }

    /// Issue a token for `principal` and attach it to `response`.
    ///
    /// The sign-in hook runs first and may handle the step itself, in which
    /// case no token is generated and no cookie is written.
    pub fn sign_in(
        &self,
        principal: Principal,
        response: &mut Response<Body>,
    ) -> anyhow::Result<()> {
        let mut context = SigningInContext::new(principal);
        if self.events.signing_in(&mut context) {
            debug!("sign-in handled by event hook");
            return Ok(());
        }

        let subject = context.principal.subject().map(str::to_owned);
        let tokens = self.generator.generate(context.principal.claims())?;
        self.accessor.set(response, &tokens.access_token);
        debug!(subject = ?subject, "issued access token cookie");
        Ok(())
    }

    /// Clear the token cookie. Always succeeds, signed in or not.
    pub fn sign_out(&self, response: &mut Response<Body>) {
        self.accessor.delete(response);
        debug!("cleared access token cookie");
    }

    /// Mark `response` as requiring authentication (401 unless a hook
    /// handles it).
    pub fn challenge(&self, response: &mut Response<Body>) {
        if !self.events.challenge(response) {
            *response.status_mut() = StatusCode::UNAUTHORIZED;
        }
    }

    /// Mark `response` as forbidden (403 unless a hook handles it).
    pub fn forbidden(&self, response: &mut Response<Body>) {
        if !self.events.forbidden(response) {
            *response.status_mut() = StatusCode::FORBIDDEN;
        }
    }
}
