use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use job_aggregator::{
    config::Config,
    database::pool::create_pool,
    router,
    services::{
        job_store::PgJobStore,
        scraper_client::{JobSource, ScraperClient},
    },
    AppState,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config).await?;
    let store = PgJobStore::new(pool, config.jobs_table.clone())?;
    store.ensure_schema().await?;

    let scraper: Option<Arc<dyn JobSource>> = match &config.scraper_url {
        Some(url) => {
            let http_client = reqwest::Client::builder()
                .timeout(Duration::from_secs(300))
                .build()?;
            info!("Using scraper at {}", url);
            Some(Arc::new(ScraperClient::new(http_client, url.clone())))
        }
        None => {
            warn!("SCRAPER_URL is not set; /api/scrape is disabled");
            None
        }
    };

    let app = router(AppState::new(Arc::new(store), scraper));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
