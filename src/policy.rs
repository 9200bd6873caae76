use axum::{
    extract::Request,
    http::{Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::auth::{ROLE_ADMIN, ROLE_USER, SESSION_USER_KEY, SessionUser};

/// Access
///
/// The tagged access requirement attached to a policy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Allowed unconditionally, no session required.
    Public,
    /// Requires any authenticated session, regardless of role.
    Authenticated,
    /// Requires an authenticated session whose role set intersects the listed names.
    AnyRole(&'static [&'static str]),
}

/// PolicyRule
///
/// One row of the authorization policy: an optional method restriction, a path
/// pattern, and the access requirement. A pattern ending in '/' matches as a raw
/// prefix (a namespace); any other pattern matches the exact path or any path
/// nested under it.
#[derive(Debug, Clone)]
pub struct PolicyRule {
    pub method: Option<Method>,
    pub pattern: &'static str,
    pub access: Access,
}

impl PolicyRule {
    fn applies(&self, method: &Method, path: &str) -> bool {
        if let Some(required) = &self.method {
            if method != required {
                return false;
            }
        }
        path_matches(self.pattern, path)
    }
}

/// POLICY
///
/// The ordered authorization table, evaluated top-down on every inbound request
/// before any handler runs. **First match wins**; the final catch-all row makes
/// the default posture deny-without-session.
///
/// 1. Pre-flight OPTIONS requests pass unconditionally so the CORS handshake
///    from the browser never needs credentials.
/// 2. The signup namespace and the login endpoint are reachable without a
///    session (they are how a session comes to exist).
/// 3. The board namespace requires the USER or ADMIN role.
/// 4. Everything else requires some authenticated session.
pub const POLICY: &[PolicyRule] = &[
    PolicyRule {
        method: Some(Method::OPTIONS),
        pattern: "/",
        access: Access::Public,
    },
    PolicyRule {
        method: None,
        pattern: "/api/auth/",
        access: Access::Public,
    },
    PolicyRule {
        method: None,
        pattern: "/login",
        access: Access::Public,
    },
    PolicyRule {
        method: None,
        pattern: "/api/posts",
        access: Access::AnyRole(&[ROLE_USER, ROLE_ADMIN]),
    },
    PolicyRule {
        method: None,
        pattern: "/",
        access: Access::Authenticated,
    },
];

/// Pattern matching for policy rows. A trailing '/' marks a namespace prefix;
/// otherwise the path must be the pattern itself or live directly under it
/// ("/api/posts" covers "/api/posts" and "/api/posts/42", never "/api/postscript").
fn path_matches(pattern: &str, path: &str) -> bool {
    if pattern.ends_with('/') {
        path.starts_with(pattern)
    } else {
        match path.strip_prefix(pattern) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// required_access
///
/// Evaluates the policy table for a (method, path) pair. The catch-all row
/// guarantees a match; the fallback mirrors its deny-by-default posture.
pub fn required_access(method: &Method, path: &str) -> Access {
    POLICY
        .iter()
        .find(|rule| rule.applies(method, path))
        .map(|rule| rule.access)
        .unwrap_or(Access::Authenticated)
}

/// authorize
///
/// The authorization gate middleware. Layered over the entire router (inside the
/// session layer, so the session is already resolved) and evaluated on every
/// request before routing logic.
///
/// Rejection contract:
/// - No session identity where one is required → 401 with the structured body
///   `{"error": "Unauthorized", "message": "<cause>"}`. The cause is the gate's
///   own message, never internal error text, and embedded quotes are escaped
///   before the message lands in the hand-assembled JSON.
/// - Session present but role set disjoint from the requirement → 403 with
///   `{"error": "Forbidden", "message": "Access is denied"}`.
pub async fn authorize(session: Session, request: Request, next: Next) -> Response {
    let access = required_access(request.method(), request.uri().path());

    if access == Access::Public {
        return next.run(request).await;
    }

    let identity = session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .unwrap_or_else(|e| {
            // A broken session store read degrades to "no identity"; the caller
            // sees the uniform unauthenticated failure, not the store error.
            tracing::error!("session load error in authorization gate: {:?}", e);
            None
        });

    match (access, identity) {
        (_, None) => unauthorized("Full authentication is required to access this resource"),
        (Access::AnyRole(required), Some(user)) if !user.has_any_role(required) => {
            forbidden("Access is denied")
        }
        _ => next.run(request).await,
    }
}

/// Escapes embedded double quotes so the cause text can be inlined into the
/// hand-assembled JSON failure body.
fn escape_quotes(message: &str) -> String {
    message.replace('"', "\\\"")
}

fn unauthorized(cause: &str) -> Response {
    let body = format!(
        "{{\"error\": \"Unauthorized\", \"message\": \"{}\"}}",
        escape_quotes(cause)
    );
    (
        StatusCode::UNAUTHORIZED,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

fn forbidden(cause: &str) -> Response {
    let body = format!(
        "{{\"error\": \"Forbidden\", \"message\": \"{}\"}}",
        escape_quotes(cause)
    );
    (
        StatusCode::FORBIDDEN,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
