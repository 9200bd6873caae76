use crate::models::{Comment, Post, Role, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

/// RepositoryError
///
/// The persistence-layer failure taxonomy. Only creation paths surface errors to
/// their callers; the distinguished `UniqueViolation` variant carries the storage
/// layer's verdict on duplicate usernames and role names, which is the
/// authoritative guard when two concurrent signups race on the same username.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations: find-by-unique-key,
/// find-all, save and delete per entity. This is the core of the Repository
/// Abstraction pattern, allowing the handlers to interact with the data layer
/// without knowing the specific implementation (Postgres, in-memory, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable and usable across Axum's asynchronous
/// task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    // Lookup by the unique username key. Returns the user joined with its role name.
    async fn find_user_by_username(&self, username: &str) -> Option<User>;
    // Inserts a new user. The storage layer's uniqueness constraint on `username`
    // is the final arbiter; a duplicate surfaces as `UniqueViolation`.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role_id: i64,
    ) -> Result<User, RepositoryError>;

    // --- Roles ---
    async fn find_role_by_name(&self, role_name: &str) -> Option<Role>;
    async fn create_role(&self, role_name: &str) -> Result<Role, RepositoryError>;

    // --- Posts ---
    async fn list_posts(&self) -> Vec<Post>;
    async fn find_post(&self, id: i64) -> Option<Post>;
    async fn create_post(&self, user_id: i64, title: &str, content: &str) -> Option<Post>;
    // Unconditional overwrite of title and content. No ownership check: the blanket
    // `/api/posts/**` role rule is the only authorization boundary for updates.
    async fn update_post(&self, id: i64, title: &str, content: &str) -> Option<Post>;
    // Returns true if a row was deleted, false if the post did not exist.
    async fn delete_post(&self, id: i64) -> bool;

    // --- Comments (modeled; no HTTP surface) ---
    async fn list_comments(&self, post_id: i64) -> Vec<Comment>;
    async fn create_comment(&self, post_id: i64, user_id: i64, content: &str) -> Option<Comment>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL
/// database. All queries use the runtime-checked sqlx API so the crate builds
/// without a database connection.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a sqlx error into the repository taxonomy, tagging unique-constraint
/// violations with the offending key.
fn map_create_error(err: sqlx::Error, key: &'static str) -> RepositoryError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return RepositoryError::UniqueViolation(key);
        }
    }
    RepositoryError::Database(err)
}

#[async_trait]
impl Repository for PostgresRepository {
    /// find_user_by_username
    ///
    /// Resolves a user by its unique username, joining `roles` so the caller gets
    /// the role name in the same round trip (the Authentication Gate needs both).
    async fn find_user_by_username(&self, username: &str) -> Option<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.password_hash, u.role_id, r.role_name
            FROM users u
            JOIN roles r ON u.role_id = r.id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_user_by_username error: {:?}", e);
            None
        })
    }

    /// create_user
    ///
    /// Inserts a new user row. Uses a CTE to return the inserted row joined with
    /// its role name in a single query. A duplicate username is reported as
    /// `UniqueViolation`. This is the race-authoritative path; the handler-level
    /// pre-check only exists for the friendly error message.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role_id: i64,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"
            WITH inserted AS (
                INSERT INTO users (username, password_hash, role_id)
                VALUES ($1, $2, $3)
                RETURNING id, username, password_hash, role_id
            )
            SELECT i.id, i.username, i.password_hash, i.role_id, r.role_name
            FROM inserted i
            JOIN roles r ON i.role_id = r.id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_error(e, "users.username"))
    }

    /// find_role_by_name
    ///
    /// Lookup by the unique role name ("ROLE_USER" / "ROLE_ADMIN").
    async fn find_role_by_name(&self, role_name: &str) -> Option<Role> {
        sqlx::query_as::<_, Role>("SELECT id, role_name FROM roles WHERE role_name = $1")
            .bind(role_name)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("find_role_by_name error: {:?}", e);
                None
            })
    }

    /// create_role
    ///
    /// Inserts a new role. Only the bootstrap seeder calls this; the uniqueness
    /// constraint on `role_name` keeps re-runs idempotent even if a lookup was missed.
    async fn create_role(&self, role_name: &str) -> Result<Role, RepositoryError> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (role_name) VALUES ($1) RETURNING id, role_name",
        )
        .bind(role_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_error(e, "roles.role_name"))
    }

    /// list_posts
    ///
    /// Retrieves every post joined with its author's username, oldest first.
    async fn list_posts(&self) -> Vec<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.user_id, u.username AS author, p.title, p.content, p.created_at
            FROM posts p
            JOIN users u ON p.user_id = u.id
            ORDER BY p.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_posts error: {:?}", e);
            vec![]
        })
    }

    /// find_post
    ///
    /// Simple retrieval of a post by ID, with the author join.
    async fn find_post(&self, id: i64) -> Option<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.user_id, u.username AS author, p.title, p.content, p.created_at
            FROM posts p
            JOIN users u ON p.user_id = u.id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_post error: {:?}", e);
            None
        })
    }

    /// create_post
    ///
    /// Inserts a new post stamped with the author's user ID. Uses a CTE to return
    /// the enriched row (author username joined) in one query.
    async fn create_post(&self, user_id: i64, title: &str, content: &str) -> Option<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (user_id, title, content)
                VALUES ($1, $2, $3)
                RETURNING id, user_id, title, content, created_at
            )
            SELECT i.id, i.user_id, u.username AS author, i.title, i.content, i.created_at
            FROM inserted i
            JOIN users u ON i.user_id = u.id
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map(Some)
        .unwrap_or_else(|e| {
            tracing::error!("create_post error: {:?}", e);
            None
        })
    }

    /// update_post
    ///
    /// Overwrites title and content unconditionally. Returns `None` when the post
    /// does not exist.
    async fn update_post(&self, id: i64, title: &str, content: &str) -> Option<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            WITH updated AS (
                UPDATE posts SET title = $2, content = $3
                WHERE id = $1
                RETURNING id, user_id, title, content, created_at
            )
            SELECT up.id, up.user_id, u.username AS author, up.title, up.content, up.created_at
            FROM updated up
            JOIN users u ON up.user_id = u.id
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_post error: {:?}", e);
            None
        })
    }

    /// delete_post
    ///
    /// Deletes a post by ID. Comments cascade at the storage layer.
    async fn delete_post(&self, id: i64) -> bool {
        match sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_post error: {:?}", e);
                false
            }
        }
    }

    /// list_comments
    ///
    /// Retrieves all comments for a post, enriched with the author username.
    async fn list_comments(&self, post_id: i64) -> Vec<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.post_id, c.user_id, u.username AS author, c.content, c.created_at
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_comments error: {:?}", e);
            vec![]
        })
    }

    /// create_comment
    ///
    /// Inserts a comment attached to a post.
    async fn create_comment(&self, post_id: i64, user_id: i64, content: &str) -> Option<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, user_id, content, created_at
            )
            SELECT i.id, i.post_id, i.user_id, u.username AS author, i.content, i.created_at
            FROM inserted i
            JOIN users u ON i.user_id = u.id
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map(Some)
        .unwrap_or_else(|e| {
            tracing::error!("create_comment error: {:?}", e);
            None
        })
    }
}
