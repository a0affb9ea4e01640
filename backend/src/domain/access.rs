//! Access control gate.
//!
//! Every protected use-case runs one of these checks before touching data.
//! The session is supplied through an explicit [`SessionResolver`] so the
//! gate has no ambient state and never depends on the transport.

use tracing::debug;

use super::ports::SessionResolver;
use super::{Error, Identity, Role, UserId};

/// Message carried by every unauthenticated failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Message carried by role and ownership failures.
pub const FORBIDDEN_MESSAGE: &str = "Forbidden";

/// Whether `role` is the administrator role.
///
/// # Examples
/// ```
/// use parcel_backend::domain::{Role, is_admin_role};
///
/// assert!(is_admin_role(Role::Admin));
/// assert!(!is_admin_role(Role::User));
/// ```
#[must_use]
pub const fn is_admin_role(role: Role) -> bool {
    matches!(role, Role::Admin)
}

/// Resolve the session and fail with `Unauthorized` when there is none.
pub async fn require_authenticated(resolver: &dyn SessionResolver) -> Result<Identity, Error> {
    authenticated(resolver.resolve().await?)
}

/// Resolve the session and additionally require the admin role.
pub async fn require_admin(resolver: &dyn SessionResolver) -> Result<Identity, Error> {
    admin(resolver.resolve().await?)
}

/// Allow admins and the record's owner; everyone else is `Forbidden`.
pub fn ensure_owner_or_admin(identity: &Identity, owner: UserId) -> Result<(), Error> {
    if is_admin_role(identity.role) || identity.user_id == owner {
        return Ok(());
    }
    debug!(user_id = %identity.user_id, owner = %owner, "ownership check rejected caller");
    Err(Error::forbidden(FORBIDDEN_MESSAGE))
}

fn authenticated(identity: Option<Identity>) -> Result<Identity, Error> {
    identity.ok_or_else(|| Error::unauthorized(UNAUTHORIZED_MESSAGE))
}

fn admin(identity: Option<Identity>) -> Result<Identity, Error> {
    let identity = authenticated(identity)?;
    if !is_admin_role(identity.role) {
        debug!(user_id = %identity.user_id, "admin gate rejected caller");
        return Err(Error::forbidden(FORBIDDEN_MESSAGE));
    }
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rstest_bdd_macros::{given, then, when};

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{FixedSessionResolver, MockSessionResolver};

    fn identity(raw: i32, role: Role) -> Identity {
        Identity::new(UserId::new(raw).expect("valid id"), role)
    }

    #[given("a session for a regular user")]
    fn a_session_for_a_regular_user() -> Option<Identity> {
        Some(identity(7, Role::User))
    }

    #[given("a session for an administrator")]
    fn a_session_for_an_administrator() -> Option<Identity> {
        Some(identity(1, Role::Admin))
    }

    #[given("no session")]
    fn no_session() -> Option<Identity> {
        None
    }

    #[when("the admin gate runs")]
    fn the_admin_gate_runs(session: Option<Identity>) -> Result<Identity, Error> {
        admin(session)
    }

    #[when("the authentication gate runs")]
    fn the_authentication_gate_runs(session: Option<Identity>) -> Result<Identity, Error> {
        authenticated(session)
    }

    #[then("the caller is rejected as unauthenticated")]
    fn the_caller_is_rejected_as_unauthenticated(result: Result<Identity, Error>) {
        let error = result.expect_err("gate should reject");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[then("the caller is rejected as forbidden")]
    fn the_caller_is_rejected_as_forbidden(result: Result<Identity, Error>) {
        let error = result.expect_err("gate should reject");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[then("the identity passes through unchanged")]
    fn the_identity_passes_through_unchanged(
        session: Option<Identity>,
        result: Result<Identity, Error>,
    ) {
        assert_eq!(result.ok(), session);
    }

    #[rstest]
    fn regular_users_are_forbidden_from_admin_operations() {
        let session = a_session_for_a_regular_user();
        let result = the_admin_gate_runs(session);
        the_caller_is_rejected_as_forbidden(result);
    }

    #[rstest]
    fn administrators_pass_the_admin_gate() {
        let session = a_session_for_an_administrator();
        let result = the_admin_gate_runs(session);
        the_identity_passes_through_unchanged(session, result);
    }

    #[rstest]
    fn missing_sessions_fail_the_admin_gate_as_unauthenticated() {
        let result = the_admin_gate_runs(no_session());
        the_caller_is_rejected_as_unauthenticated(result);
    }

    #[rstest]
    fn any_role_passes_the_authentication_gate() {
        for session in [a_session_for_a_regular_user(), a_session_for_an_administrator()] {
            let result = the_authentication_gate_runs(session);
            the_identity_passes_through_unchanged(session, result);
        }
    }

    #[rstest]
    fn missing_sessions_fail_the_authentication_gate() {
        let result = the_authentication_gate_runs(no_session());
        the_caller_is_rejected_as_unauthenticated(result);
    }

    #[rstest]
    fn unauthenticated_message_is_stable() {
        let error = authenticated(None).expect_err("no session");
        assert_eq!(error.message(), UNAUTHORIZED_MESSAGE);
    }

    #[rstest]
    #[case(Role::User, 7, true)]
    #[case(Role::User, 8, false)]
    #[case(Role::Admin, 8, true)]
    fn ownership_rule(#[case] role: Role, #[case] owner: i32, #[case] allowed: bool) {
        let caller = identity(7, role);
        let owner = UserId::new(owner).expect("valid id");
        let outcome = ensure_owner_or_admin(&caller, owner);
        assert_eq!(outcome.is_ok(), allowed);
        if let Err(error) = outcome {
            assert_eq!(error.code(), ErrorCode::Forbidden);
        }
    }

    #[tokio::test]
    async fn resolver_is_consulted_once_per_check() {
        let mut resolver = MockSessionResolver::new();
        resolver
            .expect_resolve()
            .times(1)
            .return_once(|| Ok(Some(identity(1, Role::Admin))));

        let resolved = require_admin(&resolver).await.expect("admin passes");
        assert_eq!(resolved.role, Role::Admin);
    }

    #[tokio::test]
    async fn resolver_failures_propagate() {
        let mut resolver = MockSessionResolver::new();
        resolver
            .expect_resolve()
            .return_once(|| Err(Error::service_unavailable("session store down")));

        let error = require_authenticated(&resolver)
            .await
            .expect_err("resolver failed");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn fixed_resolver_drives_the_gate() {
        let resolver = FixedSessionResolver(Some(identity(3, Role::User)));
        let resolved = require_authenticated(&resolver).await.expect("authenticated");
        assert_eq!(resolved.user_id.get(), 3);
        assert!(require_admin(&resolver).await.is_err());
    }
}
