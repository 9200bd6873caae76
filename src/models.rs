use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Represents the user's canonical identity record stored in the `users` table.
/// This structure includes the single role reference resolved during authentication.
///
/// **Security**: `User` deliberately does *not* derive `Serialize`. The record carries
/// the bcrypt password hash, which must never appear on the wire; handlers only ever
/// echo the username and role names back to the caller.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i64,
    // The user's primary identifier. Unique at the storage layer.
    pub username: String,
    // One-way salted bcrypt hash. Never the plaintext.
    pub password_hash: String,
    // FK to roles.id. Exactly one role per user.
    pub role_id: i64,
    /// The referenced role's name, loaded via a JOIN in the repository queries.
    #[sqlx(default)]
    pub role_name: String,
}

/// Role
///
/// A named permission group from the `roles` table ("ROLE_USER", "ROLE_ADMIN").
/// Created only by the bootstrap seeder; immutable thereafter.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Role {
    pub id: i64,
    // Unique, convention-prefixed name.
    pub role_name: String,
}

/// Post
///
/// Represents a board post from the `posts` table, augmented with the author's
/// username (a join operation). This is the primary Board Service data structure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Post {
    pub id: i64,
    // FK to users.id (Author).
    pub user_id: i64,
    // This field is loaded via a JOIN in the repository query.
    pub author: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment
///
/// Represents a comment record from the `comments` table. The entity and its
/// repository operations exist, but no HTTP endpoint exposes them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    // FK to users.id (comment author).
    pub user_id: i64,
    // Loaded via a JOIN in the repository query.
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// --- Request Payloads (Input Schemas) ---

/// SignupRequest
///
/// Input payload for the public registration endpoint (POST /api/auth/signup).
/// The password only exists in memory long enough to be hashed; it is never
/// persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// LoginRequest
///
/// Input payload for the login endpoint (POST /login).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// CreatePostRequest
///
/// Input payload for submitting a new post (POST /api/posts). The author is
/// stamped from the authenticated session, never taken from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// UpdatePostRequest
///
/// Full-overwrite payload for modifying an existing post (PUT /api/posts/{id}).
/// Both fields are required; an update replaces title and content
/// unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
}

/// --- Response Payloads (Output Schemas) ---

/// LoginSuccess
///
/// Success payload for POST /login. `roles` is the comma-joined list of role
/// names ("ROLE_A,ROLE_B"), the multi-role wire shape clients parse, even
/// though exactly one role exists in practice.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginSuccess {
    pub message: String,
    pub username: String,
    pub roles: String,
}
