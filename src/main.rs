use std::net::SocketAddr;

use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

use sphone::config::Config;
use sphone::handlers::{self, AppState};
use sphone::service::PhoneService;
use sphone::store::PhoneStore;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sphone=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    let store = PhoneStore::connect(&config.database_url).await?;
    tracing::info!(url = %config.database_url, "store ready");

    if !config.serve {
        tracing::info!("listener disabled, exiting after store setup");
        return Ok(());
    }

    let service = PhoneService::new(store.clone());
    let app = handlers::router(AppState { service, store });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
