//! Lifecycle hooks for the token authentication scheme.
//!
//! Each hook receives a mutable context; setting `handled` on the context
//! tells the scheme to skip its default behavior for that step.

use axum::body::Body;
use http::Response;

use crate::auth::token::Principal;

/// Context passed to the sign-in hook before a token is issued.
pub struct SigningInContext {
    pub principal: Principal,
    /// Set to suppress token generation and the cookie write.
    pub handled: bool,
}

impl SigningInContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            handled: false,
        }
    }
}

/// Context passed to the challenge hook when a request is unauthenticated.
pub struct ChallengeContext<'a> {
    pub response: &'a mut Response<Body>,
    /// Set to suppress the default 401 status.
    pub handled: bool,
}

/// Context passed to the forbidden hook when a request lacks privilege.
pub struct ForbiddenContext<'a> {
    pub response: &'a mut Response<Body>,
    /// Set to suppress the default 403 status.
    pub handled: bool,
}

type SigningInHook = Box<dyn Fn(&mut SigningInContext) + Send + Sync>;
type ChallengeHook = Box<dyn for<'a> Fn(&mut ChallengeContext<'a>) + Send + Sync>;
type ForbiddenHook = Box<dyn for<'a> Fn(&mut ForbiddenContext<'a>) + Send + Sync>;

/// Optional hooks invoked at each step of the scheme lifecycle.
#[derive(Default)]
pub struct TokenAuthEvents {
    pub on_signing_in: Option<SigningInHook>,
    pub on_challenge: Option<ChallengeHook>,
    pub on_forbidden: Option<ForbiddenHook>,
}

impl TokenAuthEvents {
    /// Run the sign-in hook; returns true when the hook handled the step.
    pub fn signing_in(&self, context: &mut SigningInContext) -> bool {
        if let Some(hook) = &self.on_signing_in {
            hook(context);
        }
        context.handled
    }

    pub fn challenge(&self, response: &mut Response<Body>) -> bool {
        match &self.on_challenge {
            Some(hook) => {
                let mut context = ChallengeContext {
                    response,
                    handled: false,
                };
                hook(&mut context);
                context.handled
            }
            None => false,
        }
    }

    pub fn forbidden(&self, response: &mut Response<Body>) -> bool {
        match &self.on_forbidden {
            Some(hook) => {
                let mut context = ForbiddenContext {
                    response,
                    handled: false,
                };
                hook(&mut context);
                context.handled
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::Claim;

    #[test]
    fn test_absent_hooks_report_unhandled() {
        let events = TokenAuthEvents::default();
        let mut context = SigningInContext::new(Principal::new(vec![]));
        assert!(!events.signing_in(&mut context));

        let mut response = Response::new(Body::empty());
        assert!(!events.challenge(&mut response));
        assert!(!events.forbidden(&mut response));
    }

    #[test]
    fn test_signing_in_hook_can_take_over() {
        let events = TokenAuthEvents {
            on_signing_in: Some(Box::new(|ctx| {
                ctx.handled = true;
            })),
            ..Default::default()
        };
        let principal = Principal::new(vec![Claim::new("sub", "42")]);
        let mut context = SigningInContext::new(principal);
        assert!(events.signing_in(&mut context));
    }

    #[test]
    fn test_challenge_hook_sees_response() {
        let events = TokenAuthEvents {
            on_challenge: Some(Box::new(|ctx| {
                ctx.response
                    .headers_mut()
                    .insert("www-authenticate", "Cookie".parse().unwrap());
                ctx.handled = true;
            })),
            ..Default::default()
        };
        let mut response = Response::new(Body::empty());
        assert!(events.challenge(&mut response));
        assert!(response.headers().contains_key("www-authenticate"));
    }
}
