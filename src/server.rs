//! # Server Configuration
//!
//! Router setup, OpenAPI documentation, and the server entry point that
//! wires the API and the background worker together.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::db;
use crate::handlers;
use crate::provider::HttpHrDataSource;
use crate::sync::registry::Registry;
use crate::telemetry::{self, TraceContext};
use crate::worker::SyncWorker;
use migration::MigratorTrait;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
}

/// Middleware that assigns each request a trace ID and scopes it into
/// task-local storage so error responses can quote it.
async fn trace_context_middleware(mut request: Request, next: Next) -> Response {
    let trace_id = uuid::Uuid::new_v4().to_string();
    let context = TraceContext {
        trace_id: trace_id.clone(),
    };
    request.extensions_mut().insert(context.clone());

    let mut response = telemetry::with_trace_context(context, next.run(request)).await;

    if let Ok(value) = trace_id.parse() {
        response.headers_mut().insert("x-trace-id", value);
    }
    response
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/sync-jobs",
            post(handlers::jobs::create_job).get(handlers::jobs::list_jobs),
        )
        .route("/sync-jobs/{id}", get(handlers::jobs::get_job))
        .route("/sync-jobs/{id}/retry", post(handlers::jobs::retry_job))
        .route("/sync-jobs/{id}/cancel", post(handlers::jobs::cancel_job))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            crate::auth::auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the API server and the background sync worker.
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::init_pool(&config).await?;
    migration::Migrator::up(&db, None).await?;

    let config = Arc::new(config);

    let data_source = HttpHrDataSource::new(&config.provider)?;
    let registry = Arc::new(Registry::new(
        db.clone(),
        Arc::new(data_source),
        Duration::from_millis(config.worker.scope_throttle_ms),
    ));
    let worker = Arc::new(SyncWorker::new(
        db.clone(),
        registry,
        config.worker.clone(),
    ));

    let shutdown = CancellationToken::new();
    let worker_handle = {
        let worker = Arc::clone(&worker);
        let token = shutdown.clone();
        tokio::spawn(async move { worker.run(token).await })
    };

    let state = AppState {
        db,
        config: Arc::clone(&config),
    };
    let app = create_app(state);

    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile = %config.profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    shutdown.cancel();
    let _ = worker_handle.await;

    Ok(())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::jobs::create_job,
        crate::handlers::jobs::list_jobs,
        crate::handlers::jobs::get_job,
        crate::handlers::jobs::retry_job,
        crate::handlers::jobs::cancel_job,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::handlers::jobs::CreateJobRequest,
            crate::handlers::jobs::JobInfo,
            crate::handlers::jobs::JobsResponse,
            crate::error::ApiError,
            crate::sync::JobType,
            crate::sync::JobStatus,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "HR Sync API",
        description = "Multi-tenant synchronization of HR records from an external provider",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
