#![allow(dead_code)]

use async_trait::async_trait;
use board_api::{
    AppState, bootstrap,
    config::AppConfig,
    create_router,
    models::{Comment, Post, Role, User},
    repository::{Repository, RepositoryError, RepositoryState},
};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

// --- In-Memory Repository ---

#[derive(Default)]
struct Inner {
    roles: Vec<Role>,
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory `Repository` implementation for integration tests. Mirrors the
/// storage layer's behavior that matters to the handlers: the uniqueness
/// constraints on usernames and role names, and author-username joins.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Inner>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role_count(&self) -> usize {
        self.inner.lock().unwrap().roles.len()
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_user_by_username(&self, username: &str) -> Option<User> {
        let inner = self.inner.lock().unwrap();
        inner.users.iter().find(|u| u.username == username).cloned()
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role_id: i64,
    ) -> Result<User, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.username == username) {
            return Err(RepositoryError::UniqueViolation("users.username"));
        }
        let role_name = inner
            .roles
            .iter()
            .find(|r| r.id == role_id)
            .map(|r| r.role_name.clone())
            .unwrap_or_default();
        let user = User {
            id: inner.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role_id,
            role_name,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_role_by_name(&self, role_name: &str) -> Option<Role> {
        let inner = self.inner.lock().unwrap();
        inner
            .roles
            .iter()
            .find(|r| r.role_name == role_name)
            .cloned()
    }

    async fn create_role(&self, role_name: &str) -> Result<Role, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.roles.iter().any(|r| r.role_name == role_name) {
            return Err(RepositoryError::UniqueViolation("roles.role_name"));
        }
        let role = Role {
            id: inner.next_id(),
            role_name: role_name.to_string(),
        };
        inner.roles.push(role.clone());
        Ok(role)
    }

    async fn list_posts(&self) -> Vec<Post> {
        self.inner.lock().unwrap().posts.clone()
    }

    async fn find_post(&self, id: i64) -> Option<Post> {
        let inner = self.inner.lock().unwrap();
        inner.posts.iter().find(|p| p.id == id).cloned()
    }

    async fn create_post(&self, user_id: i64, title: &str, content: &str) -> Option<Post> {
        let mut inner = self.inner.lock().unwrap();
        let author = inner
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())?;
        let post = Post {
            id: inner.next_id(),
            user_id,
            author,
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        inner.posts.push(post.clone());
        Some(post)
    }

    async fn update_post(&self, id: i64, title: &str, content: &str) -> Option<Post> {
        let mut inner = self.inner.lock().unwrap();
        let post = inner.posts.iter_mut().find(|p| p.id == id)?;
        post.title = title.to_string();
        post.content = content.to_string();
        Some(post.clone())
    }

    async fn delete_post(&self, id: i64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.posts.len();
        inner.posts.retain(|p| p.id != id);
        // Comments cascade with their post, as at the storage layer.
        inner.comments.retain(|c| c.post_id != id);
        inner.posts.len() < before
    }

    async fn list_comments(&self, post_id: i64) -> Vec<Comment> {
        let inner = self.inner.lock().unwrap();
        inner
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect()
    }

    async fn create_comment(&self, post_id: i64, user_id: i64, content: &str) -> Option<Comment> {
        let mut inner = self.inner.lock().unwrap();
        let author = inner
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())?;
        let comment = Comment {
            id: inner.next_id(),
            post_id,
            user_id,
            author,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        inner.comments.push(comment.clone());
        Some(comment)
    }
}

// --- Test Application Harness ---

pub struct TestApp {
    pub address: String,
    /// Direct repository handle for seeding fixtures beyond what the HTTP
    /// surface can create (e.g. accounts with non-standard roles).
    pub repo: RepositoryState,
}

/// Boots the real router (CORS, session layer, authorization gate and all) on an
/// ephemeral port, backed by a freshly seeded in-memory repository.
pub async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    bootstrap::seed_defaults(&repo)
        .await
        .expect("Failed to seed test repository");

    let state = AppState {
        repo: repo.clone(),
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, repo }
}

/// A client with a cookie store, so the session cookie set at login flows back
/// on subsequent requests, which is the same contract the frontend relies on.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build test client")
}

/// Registers an account through the public signup endpoint.
pub async fn signup(client: &reqwest::Client, address: &str, username: &str, password: &str) {
    let response = client
        .post(format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({"username": username, "password": password}))
        .send()
        .await
        .expect("signup request failed");
    assert_eq!(response.status(), 200, "signup should succeed");
}

/// Authenticates through the login endpoint; the session cookie lands in the
/// client's store.
pub async fn login(
    client: &reqwest::Client,
    address: &str,
    username: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/login", address))
        .json(&serde_json::json!({"username": username, "password": password}))
        .send()
        .await
        .expect("login request failed")
}
