use crate::cli::ServeArgs;
use crate::infra::{ApiComponents, AppState};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use knighthaven::config::AppConfig;
use knighthaven::domains::places::{IngestionSettings, PlaceIngestion, YelpClient};
use knighthaven::error::AppError;
use knighthaven::storage::{MemoryStore, SqliteStore, Store};
use knighthaven::telemetry;
use knighthaven::uploads::UPLOAD_URL_PREFIX;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    if args.in_memory {
        info!("serving from the in-memory store; data is lost on exit");
        serve(config, Arc::new(MemoryStore::new())).await
    } else {
        let store = SqliteStore::connect(&config.database).await?;
        serve(config, Arc::new(store)).await
    }
}

async fn serve<S>(config: AppConfig, store: Arc<S>) -> Result<(), AppError>
where
    S: Store,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        maps_api_key: config.maps.api_key.clone(),
    };

    std::fs::create_dir_all(&config.uploads.directory)?;
    let components = ApiComponents::from_config(&config, store)?;

    let app = with_api_routes(components)
        .nest_service(UPLOAD_URL_PREFIX, ServeDir::new(&config.uploads.directory))
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "knighthaven api ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// One seeding pass against the configured database, printed as JSON.
pub(crate) async fn ingest() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = Arc::new(SqliteStore::connect(&config.database).await?);
    let directory = YelpClient::from_config(&config.yelp);
    if !directory.is_configured() {
        warn!("YELP_API_KEY is not set; every category fetch will fail");
    }

    let ingestion = PlaceIngestion::new(store, Arc::new(directory), IngestionSettings::campus());
    let report = ingestion.run().await?;

    let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}
