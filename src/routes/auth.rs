use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Authentication Router Module
///
/// Defines the endpoints of the identity lifecycle. The login and signup routes
/// are the two holes the authorization policy punches for unauthenticated
/// traffic; they are how a session comes to exist in the first place.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        // POST /login
        // Credential verification and session establishment. Success returns the
        // username plus the comma-joined role names; failure is a uniform 401.
        .route("/login", post(handlers::login))
        // POST /logout
        // Destroys the server-side session. Requires a session by policy.
        .route("/logout", post(handlers::logout))
        // POST /api/auth/signup
        // Account registration with the default USER role. Duplicate usernames
        // are rejected with a specific 400 message.
        .route("/api/auth/signup", post(handlers::signup))
}
