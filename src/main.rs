use std::sync::Arc;

use futures::StreamExt;

use enroll_bot::channels::{TelegramTransport, Transport};
use enroll_bot::config::BotConfig;
use enroll_bot::dispatch::Dispatcher;
use enroll_bot::store::{LibSqlStore, ProfileStore};

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

    let config = BotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export TELEGRAM_BOT_TOKEN=123456:ABC-...");
        std::process::exit(1);
    });

    eprintln!("🎓 Enroll Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());

    let store: Arc<dyn ProfileStore> = Arc::new(
        LibSqlStore::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {e}",
                    config.db_path.display()
                );
                std::process::exit(1);
            }),
    );

    let dispatcher = Arc::new(Dispatcher::new(store));
    let transport = Arc::new(TelegramTransport::new(
        config.bot_token.clone(),
        config.poll_timeout_secs,
    ));

    transport.health_check().await?;
    tracing::info!("Telegram health check passed");

    let mut updates = transport.start().await?;

    while let Some(update) = updates.next().await {
        let dispatcher = Arc::clone(&dispatcher);
        let transport = Arc::clone(&transport);

        // One task per update; the dispatcher serializes per identity.
        tokio::spawn(async move {
            for message in dispatcher.handle(update).await {
                if let Err(e) = transport.send(&message).await {
                    tracing::error!("Failed to send reply: {e}");
                }
            }
        });
    }

    transport.shutdown().await?;
    Ok(())
}
