use anyhow::Result;
use critic::{app::create_app, app_state::AppState, config::Config, critique::CritiquePipeline};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(completion = ?config.completion(), "configuration loaded");

    let pipeline = CritiquePipeline::from_config(config.completion());
    let app = create_app(AppState::new(pipeline));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
