use tokio_util::sync::CancellationToken;
use transcode_scheduler::api::{ApiServer, AppState};
use transcode_scheduler::config::AppConfig;
use transcode_scheduler::services::ServiceContainer;
use transcode_scheduler::{database, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    let (logging_config, _guard) = logging::init_logging(&config.log_dir)?;
    let shutdown = CancellationToken::new();
    logging_config.start_retention_cleanup(shutdown.clone());

    let pool = database::init_pool(&config.database_url).await?;
    database::run_migrations(&pool).await?;

    let services = ServiceContainer::new(pool.clone(), &config)?;
    let state =
        AppState::new(&services, &config.public_base_url).with_logging_config(logging_config);
    let server = ApiServer::new(config.server.clone(), state);

    let server_token = server.cancel_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        shutdown.cancel();
        server_token.cancel();
    });

    tracing::info!(
        transcoder = %config.transcoder_url,
        timezone = %config.search_timezone,
        "transcode-scheduler starting"
    );
    server.run().await?;

    pool.close().await;
    tracing::info!("transcode-scheduler stopped");
    Ok(())
}
