/// Router Module Index
///
/// Organizes the application's routing logic by concern. Access control is NOT
/// decided here: every route passes through the ordered authorization policy
/// (see `crate::policy`) layered over the whole router, so the modules below
/// only group handlers and document the access each namespace ends up with.

/// Authentication endpoints: login, logout, signup.
/// `/login` and the `/api/auth/` namespace are public by policy; `/logout`
/// falls under the authenticated catch-all.
pub mod auth;

/// Board endpoints under `/api/posts`, gated to the USER/ADMIN roles by policy.
pub mod posts;
