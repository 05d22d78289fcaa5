#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::EnvFilter;
    use workload_planner::{AppConfig, Planner, http_api};

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        storage = ?config.storage,
        "loading workload data"
    );
    let store = config.open_store()?;
    let planner = Planner::new(store, config.planner.clone())?;
    http_api::serve(config.http_addr, planner).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
