use ad_table_builder::config::ServerConfig;
use ad_table_builder::server;
use dotenv::dotenv;
use std::error::Error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    let config = ServerConfig::from_env()?;

    // RUST_LOG wins over LOG_LEVEL; `log` records are bridged into the subscriber.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    server::serve(&config).await?;
    Ok(())
}
