use anyhow::Result;
use linkgate::config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_from_env()?;
    init_tracing(&config.log_level, &config.log_format)?;
    config.print_summary();

    linkgate::server::run(config).await
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
