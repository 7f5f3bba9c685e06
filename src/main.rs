use std::sync::Arc;

use squeegee::bot::Bot;
use squeegee::channels::TelegramChannel;
use squeegee::config::Config;
use squeegee::store::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Missing configuration is fatal at startup.
    let config = Config::from_env()?;

    eprintln!("🧽 Squeegee v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path);
    eprintln!(
        "   Admin: {}",
        config
            .admin_chat_id
            .map_or("not configured".to_string(), |id| id.to_string())
    );

    let db = Arc::new(Database::open(&config.db_path)?);

    let channel = TelegramChannel::new(config.telegram_token.clone());
    channel.health_check().await?;
    tracing::info!("Telegram token verified");

    let events = channel.start();
    let bot = Bot::new(channel, db, config);

    tokio::select! {
        _ = bot.run(events) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping bot");
        }
    }

    Ok(())
}
