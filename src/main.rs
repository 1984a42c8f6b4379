use shelf_verify::{flow, ChromeDriver, VerifyConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting sign-in flow verification");

    let config = VerifyConfig::default();
    let driver = ChromeDriver::new();

    let report = flow::run(driver, config).await?;

    info!(
        "Done: before={} after={} ({}ms)",
        report.before_screenshot, report.after_screenshot, report.duration_ms
    );
    Ok(())
}
