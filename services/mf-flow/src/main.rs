//! mf-flow 服务入口

use std::net::SocketAddr;

use mes_adapter_postgres::{create_pool, MigrationRunner, PostgresConfig};
use mes_config::AppConfig;
use mes_telemetry::{init_metrics, init_tracing, init_tracing_json};
use secrecy::ExposeSecret;
use tracing::info;

use mf_flow::api::{router, AppState};
use mf_flow::infrastructure::persistence::migrations;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load("config")?;

    if config.is_production() {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }

    let metrics_handle = init_metrics();

    info!(app = %config.app_name, env = %config.app_env, "Starting service");

    let pg_config = PostgresConfig::new(config.database.url.expose_secret().as_str())
        .with_max_connections(config.database.max_connections)
        .with_application_name("mf-flow");
    let pool = create_pool(&pg_config).await?;

    if config.database.run_migrations {
        let applied = MigrationRunner::new(pool.clone()).run(&migrations()).await?;
        info!(applied, "Migrations up to date");
    }

    let state = AppState::new(pool, metrics_handle);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
