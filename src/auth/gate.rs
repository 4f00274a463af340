use super::error::AuthError;
use super::policy::RolePolicy;
use crate::request_context::RequestContext;

/// An operation handler: structured input in, domain value or taxonomy
/// error out. Implemented by every resolver-style operation so that a
/// [`Gate`] can wrap it without changing its signature.
#[async_trait::async_trait]
pub trait Handler: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn handle(&self, input: Self::Input, ctx: &RequestContext)
        -> crate::Result<Self::Output>;
}

/// A handler decorated with a role policy. The policy is checked before the
/// wrapped handler runs; an unauthorized call fails without invoking the
/// handler, so the unauthorized path has no side effects.
pub struct Gate<H> {
    policy: RolePolicy,
    handler: H,
}

impl<H> Gate<H> {
    pub fn policy(&self) -> &RolePolicy {
        &self.policy
    }
}

/// Wrap `handler` so it only runs for callers holding at least one role of
/// `policy`.
pub fn gate<H: Handler>(policy: RolePolicy, handler: H) -> Gate<H> {
    Gate { policy, handler }
}

#[async_trait::async_trait]
impl<H: Handler> Handler for Gate<H> {
    type Input = H::Input;
    type Output = H::Output;

    async fn handle(
        &self,
        input: Self::Input,
        ctx: &RequestContext,
    ) -> crate::Result<Self::Output> {
        if !self.policy.allows(&ctx.caller.roles) {
            tracing::debug!(
                caller = %ctx.caller.caller_id,
                required = %self.policy,
                "denied"
            );
            return Err(AuthError::Forbidden { required: self.policy.clone() }.into());
        }
        self.handler.handle(input, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::{gate, Handler};
    use crate::auth::{AuthError, CallerContext, Role, RolePolicy};
    use crate::config::Batch;
    use crate::request_context::RequestContext;
    use crate::user::InMemoryUserStore;
    use crate::Error;

    struct Probe {
        invocations: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Handler for Probe {
        type Input = ();
        type Output = &'static str;

        async fn handle(&self, _: (), _: &RequestContext) -> crate::Result<&'static str> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok("ran")
        }
    }

    fn context_with_roles(roles: &[Role]) -> RequestContext {
        let caller =
            CallerContext::new("caller-1", "A").roles(roles.iter().copied().collect());
        RequestContext::new(caller, Arc::new(InMemoryUserStore::default()), &Batch::default())
    }

    #[tokio::test]
    async fn denies_without_invoking_the_handler() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let gated = gate(
            RolePolicy::any([Role::Admin, Role::Super]),
            Probe { invocations: invocations.clone() },
        );
        let ctx = context_with_roles(&[Role::Teacher]);

        let result = gated.handle((), &ctx).await;

        assert_eq!(
            result.unwrap_err(),
            Error::Auth(AuthError::Forbidden {
                required: RolePolicy::any([Role::Admin, Role::Super])
            })
        );
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delegates_when_any_role_matches() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let gated = gate(
            RolePolicy::any([Role::Admin, Role::Super]),
            Probe { invocations: invocations.clone() },
        );
        let ctx = context_with_roles(&[Role::Teacher, Role::Admin]);

        let result = gated.handle((), &ctx).await;

        assert_eq!(result.unwrap(), "ran");
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }
}
