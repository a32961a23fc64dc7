//! HTTP server implementation

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::api::error::set_debug_errors;
use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::database::Database;
use crate::notify::Notifier;
use crate::redis_client::RedisClient;
use crate::Result;

/// Access log middleware to log all HTTP requests
pub(crate) async fn access_log_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    info!("→ {} {}", method, uri);

    let response = next.run(request).await;
    let duration = start.elapsed();

    info!("← {} {}ms", response.status(), duration.as_millis());

    response
}

/// Responses are per-user; keep intermediaries from caching them
async fn no_cache_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

/// Routes plus the common middleware stack
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let mut app = routes::api_routes(state)
        .layer(axum::middleware::from_fn(no_cache_middleware))
        .layer(axum::middleware::from_fn(access_log_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::debug_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CompressionLayer::new());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true);
        app = app.layer(cors);
    }

    app
}

/// Resolves on Ctrl+C or SIGTERM
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::signal;
        use tokio::signal::unix::SignalKind;

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting Twiq API server...");
    set_debug_errors(config.server.debug_errors);
    if config.server.debug_errors {
        warn!("⚠️  Debug errors enabled: error bodies include internal details");
    }

    let database = Database::from_config(config).await?;
    info!("✅ Database service initialized");

    let redis = Arc::new(RedisClient::connect(&config.redis)?);
    redis.ping().await?;
    info!("✅ Redis connected (namespace {})", config.redis.namespace);

    let notifier = Notifier::from_config(&config.notify);
    info!(
        "📨 Notifications: sms={} email={}",
        notifier.sms.is_enabled(),
        notifier.mail.is_enabled()
    );

    let state = AppState::build(config, database, redis, notifier)?;
    let app = build_router(state, enable_cors);
    if enable_cors {
        info!("✅ CORS enabled");
    }

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 API server stopped");
    Ok(())
}
