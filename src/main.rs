use bookfinal_api::config::AppConfig;
use bookfinal_api::startup::{Application, BootstrapError};
use bookfinal_api::telemetry;

#[tokio::main]
async fn main() -> Result<(), BootstrapError> {
    // Load environment variables before the log filter is read
    dotenv::dotenv().ok();
    telemetry::init();

    let result = start().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "BookFinalAPI terminated");
    }
    result
}

async fn start() -> Result<(), BootstrapError> {
    let config = AppConfig::load()?;
    let app = Application::build(config).await?;
    if let Ok(addr) = app.local_addr() {
        tracing::info!("Server listening on {}", addr);
    }
    app.run().await
}
