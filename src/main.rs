use std::path::Path;
use std::process;
use std::sync::Arc;

use tourdesk::app::App;
use tourdesk::auth::OperatorPolicy;
use tourdesk::config::BotConfig;
use tourdesk::flow::{ConversationEngine, InMemorySessions};
use tourdesk::lifecycle::LifecycleController;
use tourdesk::notify::Notifier;
use tourdesk::store::LibSqlStore;
use tourdesk::telegram::TelegramClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Fatal: {e}");
        process::exit(1);
    }
}

async fn run(config: BotConfig) -> tourdesk::Result<()> {
    let store = Arc::new(LibSqlStore::new_local(Path::new(&config.db_path)).await?);
    tracing::info!(db_path = %config.db_path, "Store ready");

    let client = Arc::new(TelegramClient::new(config.bot_token));
    client.health_check().await?;

    let policy = OperatorPolicy::new(config.operators);
    tracing::info!(operators = policy.operators().len(), "Tourdesk starting");

    let notifier = Arc::new(Notifier::new(client.clone()));
    let controller = Arc::new(LifecycleController::new(
        store,
        notifier.clone(),
        policy,
        config.list_limit,
    ));
    let engine = ConversationEngine::new(Arc::new(InMemorySessions::new()));

    let events = client.start().await?;
    let app = Arc::new(App::new(engine, controller, notifier, client));
    app.run(events).await;
    Ok(())
}
