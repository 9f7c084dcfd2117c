use axum::{middleware::from_fn, routing::get, Json, Router};
use hotel_upload_core::core::config::Config;
use hotel_upload_core::core::database;
use hotel_upload_core::core::middleware;
use hotel_upload_core::core::openapi::{ApiDoc, DocsInfoModifier};
use hotel_upload_core::features::hotel_uploads::{
    routes as hotel_uploads_routes, HotelInvoiceStore, HotelUploadService, PgHotelInvoiceStore,
};
use hotel_upload_core::shared::retry::RetryPolicy;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{Modify, OpenApi};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, max_retries={}, retry_backoff={:?}",
        worker_threads,
        config.ingestion.max_retries,
        config.ingestion.retry_backoff
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!(
        "Database connection pool created for {}",
        config.database.redacted_url()
    );

    let store: Arc<dyn HotelInvoiceStore> = Arc::new(PgHotelInvoiceStore::new(pool));
    let upload_service = Arc::new(HotelUploadService::new(
        store,
        RetryPolicy::from(config.ingestion),
    ));
    tracing::info!("Hotel upload service initialized");

    let mut openapi = ApiDoc::openapi();
    DocsInfoModifier {
        title: config.docs.title.clone(),
        version: config.docs.version.clone(),
        description: config.docs.description.clone(),
    }
    .modify(&mut openapi);

    let docs = Router::new().route(
        "/api-docs/openapi.json",
        get(move || {
            let openapi = openapi.clone();
            async move { Json(openapi) }
        }),
    );
    let docs = if let Some(credentials) = config.docs.credentials() {
        tracing::info!("API docs basic auth enabled");
        docs.layer(from_fn(middleware::basic_auth_middleware(Arc::new(
            credentials,
        ))))
    } else {
        docs
    };

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", get(health_check));

    let app = Router::new()
        .merge(docs)
        .merge(hotel_uploads_routes(
            upload_service,
            config.app.max_request_body_size,
        ))
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
