use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;

// Module for routing segregation (authentication endpoints, board endpoints).
pub mod routes;

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// This struct auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application. It aggregates all API paths and data schemas that have been
/// decorated with the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all public handler functions here for documentation generation.
    paths(
        handlers::login, handlers::logout, handlers::signup,
        handlers::list_posts, handlers::create_post, handlers::get_post,
        handlers::update_post, handlers::delete_post
    ),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::Post, models::Comment, models::LoginRequest, models::LoginSuccess,
            models::SignupRequest, models::CreatePostRequest, models::UpdatePostRequest,
        )
    ),
    tags(
        (name = "board", description = "Discussion Board API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe, and
/// immutable container holding all essential application services and configuration.
/// The application state is shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers to selectively pull components from the
// shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped
/// middleware, and registers the application state.
///
/// Layer order (outermost first at request time): CORS → request-id/trace →
/// session resolution → authorization gate → routes. The session layer must sit
/// outside the gate so the gate can read the resolved session on every request.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    // Exactly one allowed origin (the frontend dev server), with credentials so the
    // session cookie crosses. `Any` is not representable alongside credentials, so
    // request headers are mirrored instead and the method list is explicit.
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .frontend_origin
                .parse::<HeaderValue>()
                .expect("FATAL: FRONTEND_ORIGIN is not a valid header value"),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    // 2. Session Layer
    // Server-side session state in the process-local store (single-process design;
    // nothing distributed). The cookie is not marked Secure because the local
    // frontend talks plain HTTP.
    let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 3. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // GET /health
        // Liveness probe. Carries no policy exception, so it sits behind the
        // authenticated catch-all like every other unlisted path.
        .route("/health", get(|| async { "ok" }))
        // Authentication endpoints (login/logout/signup).
        .merge(routes::auth::auth_routes())
        // Board endpoints (/api/posts namespace).
        .merge(routes::posts::post_routes())
        // Authorization Gate: the ordered policy table, evaluated on every
        // request before any handler. Inside the session layer below.
        .layer(middleware::from_fn(policy::authorize))
        .layer(session_layer)
        // Apply the Unified State to all routes.
        .with_state(state);

    // 4. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: Generates a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: Wraps the entire request/response lifecycle in a
                // tracing span correlated by the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation: Returns the generated x-request-id header
                // to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer (outermost, so pre-flight requests short-circuit here)
        .layer(cors)
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
