use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use client::WebApiClient;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};

fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load configuration; a missing config file falls back to defaults plus
/// environment variables (`SERVER_HOST`/`SERVER_PORT`, `WEBAPI_URL`,
/// `WEBAPI_TOKEN`).
fn load_config() -> anyhow::Result<configs::AppConfig> {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(_) => {
            let mut cfg = configs::AppConfig::default();
            if let Ok(host) = env::var("SERVER_HOST") {
                cfg.server.host = host;
            }
            if let Ok(port) = env::var("SERVER_PORT") {
                if let Ok(port) = port.parse::<u16>() {
                    cfg.server.port = port;
                }
            }
            cfg.normalize_and_validate()?;
            Ok(cfg)
        }
    }
}

/// Public entry: build the app and run the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config()?;

    // One Web API client per process, shared by every request.
    let web_api = WebApiClient::new(
        &cfg.webapi.url,
        cfg.webapi.token.as_deref(),
        Duration::from_secs(cfg.webapi.request_timeout_secs),
    )?;
    let state = ServerState {
        client: Arc::new(web_api),
        tenant: cfg.catalog.tenant.clone(),
        environment: cfg.catalog.environment.clone(),
    };

    let app: Router = routes::build_router(build_cors(), state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, tenant = %cfg.catalog.tenant, environment = %cfg.catalog.environment, "starting catalog admin server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
