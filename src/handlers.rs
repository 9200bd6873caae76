use crate::{
    AppState,
    auth::{self, ROLE_USER, SESSION_USER_KEY, SessionUser},
    models::{CreatePostRequest, LoginRequest, LoginSuccess, Post, SignupRequest, UpdatePostRequest},
    repository::RepositoryError,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

// --- Authentication Handlers ---

/// The uniform credential-failure response. Deliberately identical for an
/// unknown username and a wrong password, so the endpoint cannot be used to
/// enumerate existing accounts.
fn login_failed() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"error": "Login failed"})),
    )
        .into_response()
}

/// login
///
/// [Public Route] The authentication gate. Verifies the submitted credentials
/// against the credential store and, on success, establishes the server-side
/// session identity (username + role set) keyed by the session cookie.
///
/// *Failure shape*: both "unknown user" and "wrong password" produce the same
/// generic 401 body, preserved deliberately to prevent user enumeration.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginSuccess),
        (status = 401, description = "Login failed")
    )
)]
pub async fn login(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let Some(user) = state.repo.find_user_by_username(&payload.username).await else {
        return login_failed();
    };

    if !auth::verify_password(&payload.password, &user.password_hash) {
        return login_failed();
    }

    let identity = SessionUser::with_role(user.username, user.role_name);
    if let Err(e) = session.insert(SESSION_USER_KEY, &identity).await {
        tracing::error!("failed to establish session: {:?}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let body = LoginSuccess {
        message: "Login successful".to_string(),
        username: identity.username.clone(),
        // Comma-joined role names; the set materializes as "ROLE_A,ROLE_B" on the wire.
        roles: identity.roles_csv(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// logout
///
/// [Authenticated Route] Destroys the server-side session state. The cookie the
/// caller holds stops resolving to an identity immediately.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Logout successful"))
)]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::error!("failed to destroy session: {:?}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({"message": "Logout successful"})),
    )
        .into_response()
}

/// signup
///
/// [Public Route] Registers a new account with the default USER role.
///
/// *Duplicate handling*: the friendly pre-check produces the specific 400
/// message; the storage layer's uniqueness constraint remains the authoritative
/// guard, so a race between two identical signups ends with exactly one success
/// and one constraint violation mapped to the same 400.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Signup success"),
        (status = 400, description = "Username already exists")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Response {
    if state
        .repo
        .find_user_by_username(&payload.username)
        .await
        .is_some()
    {
        return (StatusCode::BAD_REQUEST, "Username already exists").into_response();
    }

    // Role existence precedes user creation; the seeder guarantees this role at
    // startup, so a miss here is a deployment fault, not a caller error.
    let Some(default_role) = state.repo.find_role_by_name(ROLE_USER).await else {
        tracing::error!("default role {} not found", ROLE_USER);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let password_hash = match auth::hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("password hashing error: {:?}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match state
        .repo
        .create_user(&payload.username, &password_hash, default_role.id)
        .await
    {
        Ok(_) => (StatusCode::OK, "Signup success").into_response(),
        // Lost the race against a concurrent signup for the same username.
        Err(RepositoryError::UniqueViolation(_)) => {
            (StatusCode::BAD_REQUEST, "Username already exists").into_response()
        }
        Err(e) => {
            tracing::error!("signup error: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// --- Board Service Handlers (CRUD glue) ---

/// list_posts
///
/// [USER/ADMIN Route] Lists every post on the board.
#[utoipa::path(
    get,
    path = "/api/posts",
    responses((status = 200, description = "All posts", body = [Post]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.repo.list_posts().await)
}

/// create_post
///
/// [USER/ADMIN Route] Submits a new post. Ownership is stamped from the
/// authenticated session's username, never from the payload.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses((status = 200, description = "Created", body = Post))
)]
pub async fn create_post(
    SessionUser { username, .. }: SessionUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<Post>, StatusCode> {
    // Resolve the session identity back to the stored account. A miss means the
    // account vanished mid-session; surfaced as a generic failure.
    let author = state
        .repo
        .find_user_by_username(&username)
        .await
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    state
        .repo
        .create_post(author.id, &payload.title, &payload.content)
        .await
        .map(Json)
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// get_post
///
/// [USER/ADMIN Route] Retrieves a single post by ID.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, StatusCode> {
    match state.repo.find_post(id).await {
        Some(post) => Ok(Json(post)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// update_post
///
/// [USER/ADMIN Route] Overwrites a post's title and content.
///
/// *Authorization boundary*: there is deliberately no ownership or role check
/// beyond the blanket board-namespace rule: any authenticated USER can edit any
/// other user's post. This is the documented contract and is covered as
/// specified behavior by the integration tests.
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, StatusCode> {
    match state
        .repo
        .update_post(id, &payload.title, &payload.content)
        .await
    {
        Some(post) => Ok(Json(post)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// delete_post
///
/// [USER/ADMIN Route] Deletes a post. Same deliberate authorization boundary as
/// `update_post`: any authenticated USER may delete any post.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    if state.repo.delete_post(id).await {
        (StatusCode::OK, "Deleted").into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
