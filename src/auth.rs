use axum::http::{StatusCode, request::Parts};
use axum::extract::FromRequestParts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tower_sessions::Session;

/// Well-known role names. The bootstrap seeder guarantees both exist before the
/// listener binds; signup attaches `ROLE_USER` to every self-registered account.
pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Session record key under which the authenticated identity is stored.
/// Every consumer of the session (the authorization gate, the `SessionUser`
/// extractor, login and logout) reads and writes this single key.
pub const SESSION_USER_KEY: &str = "auth_user";

/// SessionUser
///
/// The ephemeral session identity: proof of a prior successful authentication,
/// held server-side for the lifetime of the session. It is materialized by the
/// login handler and never persisted to the database.
///
/// The role names are modeled as a *set* internally; the comma-joined string
/// ("ROLE_A,ROLE_B") only exists at the wire boundary, where it is an observable
/// contract: clients parse a comma-joined roles string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    /// The authenticated username, used to stamp post ownership.
    pub username: String,
    /// The set of role names granted to this identity. Exactly one in practice.
    pub roles: BTreeSet<String>,
}

impl SessionUser {
    /// Builds the identity for a user holding a single role.
    pub fn with_role(username: impl Into<String>, role_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: BTreeSet::from([role_name.into()]),
        }
    }

    /// Renders the wire format for the role set: names joined by commas, in
    /// deterministic (sorted) order.
    pub fn roles_csv(&self) -> String {
        self.roles.iter().cloned().collect::<Vec<_>>().join(",")
    }

    /// True when this identity holds at least one of the required role names.
    pub fn has_any_role(&self, required: &[&str]) -> bool {
        required.iter().any(|r| self.roles.contains(*r))
    }
}

/// SessionUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making SessionUser usable as a
/// function argument in any handler that needs the authenticated identity. This
/// cleanly separates authentication (session resolution) from business logic
/// (the handler).
///
/// The process involves:
/// 1. Resolving the `tower_sessions::Session` from the request extensions
///    (inserted by the SessionManagerLayer).
/// 2. Loading the stored identity from the session record.
///
/// Rejection: Returns StatusCode::UNAUTHORIZED (401) when no identity exists.
/// Note that for the gated namespaces the authorization middleware rejects such
/// requests first, with the structured JSON body; the extractor is the inner
/// line of defense.
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, _)| status)?;

        session
            .get::<SessionUser>(SESSION_USER_KEY)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("session load error: {:?}", e);
                None
            })
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

// --- Password Hashing ---

/// hash_password
///
/// One-way adaptive hash (bcrypt, salted per hash, `DEFAULT_COST`). Used at
/// signup and by the bootstrap seeder. The plaintext never outlives this call.
pub fn hash_password(plaintext: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)
}

/// verify_password
///
/// Verifies a plaintext candidate against a stored bcrypt hash. A malformed
/// stored hash is logged and reported as a plain mismatch so the caller's
/// failure path stays uniform (no oracle for broken records).
pub fn verify_password(plaintext: &str, password_hash: &str) -> bool {
    bcrypt::verify(plaintext, password_hash).unwrap_or_else(|e| {
        tracing::error!("password verification error: {:?}", e);
        false
    })
}
