use thiserror::Error;

use crate::auth::{self, ROLE_ADMIN, ROLE_USER};
use crate::models::Role;
use crate::repository::{RepositoryError, RepositoryState};

/// BootstrapError
///
/// Failures during baseline data seeding. Any of these is fatal at startup:
/// the service must not accept traffic without its reference data.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// seed_defaults
///
/// Guarantees the baseline reference data exists: the two well-known roles and
/// the two default accounts (`user`/`user`, `admin`/`admin`). Runs exactly once
/// per process start, from `main`, before the listener binds; it never has a
/// concurrent invocation to coordinate against.
///
/// **Idempotent**: a lookup precedes every creation, so N runs yield exactly two
/// roles and two users. Each creation is an independent unit; there is no
/// rollback to coordinate. Creations are logged; no-ops are silent.
///
/// Ordering: roles are created before the accounts that reference them, keeping
/// the no-orphan-role invariant intact at every intermediate state.
pub async fn seed_defaults(repo: &RepositoryState) -> Result<(), BootstrapError> {
    let user_role = ensure_role(repo, ROLE_USER).await?;
    let admin_role = ensure_role(repo, ROLE_ADMIN).await?;

    ensure_account(repo, "user", "user", &user_role).await?;
    ensure_account(repo, "admin", "admin", &admin_role).await?;

    Ok(())
}

/// Looks up a role by name, creating it when absent.
async fn ensure_role(repo: &RepositoryState, role_name: &str) -> Result<Role, BootstrapError> {
    if let Some(role) = repo.find_role_by_name(role_name).await {
        return Ok(role);
    }

    let role = repo.create_role(role_name).await?;
    tracing::info!("created role {}", role.role_name);
    Ok(role)
}

/// Looks up an account by username, creating it with a freshly computed hash
/// and the given role when absent. The plaintext only exists in this frame.
async fn ensure_account(
    repo: &RepositoryState,
    username: &str,
    password: &str,
    role: &Role,
) -> Result<(), BootstrapError> {
    if repo.find_user_by_username(username).await.is_some() {
        return Ok(());
    }

    let password_hash = auth::hash_password(password)?;
    let user = repo.create_user(username, &password_hash, role.id).await?;
    tracing::info!("created default account {} ({})", user.username, role.role_name);
    Ok(())
}
