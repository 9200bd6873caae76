use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Board Router Module
///
/// Plain CRUD over posts. Reachable only with a session holding the USER or
/// ADMIN role (enforced by the policy table over the `/api/posts` namespace).
///
/// Note on the authorization boundary: update and delete intentionally carry no
/// per-post ownership check beyond the namespace rule: any authenticated USER
/// can modify or remove any post. That is the documented, observable contract.
pub fn post_routes() -> Router<AppState> {
    Router::new()
        // GET /api/posts: full board listing.
        // POST /api/posts: submit a post; author stamped from the session.
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        // GET/PUT/DELETE /api/posts/{id}: single-post retrieval, overwrite, removal.
        .route(
            "/api/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
}
