use persistence::Journal;
use server::EngineRuntime;
use session::SessionManager;
use types::config::GameConfig;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting game engine");

    let config = GameConfig::default();
    let seed: u64 = rand::random();
    let manager = SessionManager::new(config, seed)?;

    let journal_path =
        std::env::var("GAME_JOURNAL").unwrap_or_else(|_| "game.journal".to_string());
    let journal = Journal::open(&journal_path)?;
    tracing::info!(path = %journal_path, "journal opened");

    let (engine, handle) = EngineRuntime::new(manager, Box::new(journal));
    let engine_task = tokio::spawn(engine.run());
    EngineRuntime::spawn_timer(&handle);

    // Transport adapters (WebSocket, etc.) clone `handle` from here.
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    drop(handle);
    engine_task.abort();

    Ok(())
}
