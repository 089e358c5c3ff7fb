//! Multiworld client binary.
//!
//! Replays a recorded session script through the reconciliation runtime and
//! reports what the local player ended up with.
//!
//! # Examples
//!
//! ```bash
//! cargo run -p multiworld-client -- session.json
//!
//! # Or via the environment (a .env file is honored)
//! MULTIWORLD_SCRIPT=session.json RUST_LOG=runtime=debug cargo run -p multiworld-client
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use client_bootstrap::{ClientConfig, SessionBuilder, SessionScript, logging, replay};
use multiworld_runtime::{Event, HintEvent, ItemEvent, SessionEvent, Topic};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // 1. Load configuration from environment
    let config = ClientConfig::from_env();

    // 2. Setup logging
    let _log_guard = logging::setup_logging(config.session_id.as_deref(), config.log_dir.as_deref())?;

    // 3. Load the session script
    let script_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.script.clone())
        .context("no session script: pass a path or set MULTIWORLD_SCRIPT")?;
    let script = SessionScript::load(&script_path)?;

    tracing::info!(
        target: "client",
        script = %script_path.display(),
        steps = script.steps.len(),
        "Starting multiworld client"
    );

    // 4. Build runtime
    let setup = SessionBuilder::new(config).build(&script).await?;
    let handle = setup.runtime.handle();

    // 5. Consume events for the whole session
    let consumers: Vec<_> = handle
        .subscribe_multiple(&Topic::ALL)
        .into_iter()
        .map(|(topic, rx)| log_events(topic, rx))
        .collect();

    // 6. Replay
    let summary = replay(&handle, &setup.storage, &script).await?;

    println!("connections:      {}", summary.connections);
    println!("item batches:     {}", summary.batches);
    println!(
        "items received:   {} ({} delivered)",
        summary.item_count, summary.items_delivered
    );
    println!("hints known:      {}", summary.hint_count);

    // 7. Shutdown; consumers end once the event bus is dropped
    drop(handle);
    setup.runtime.shutdown().await?;
    for consumer in consumers {
        consumer.await?;
    }

    tracing::info!(target: "client", "Client shutdown complete");
    Ok(())
}

fn log_events(topic: Topic, mut rx: broadcast::Receiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: "client", ?topic, skipped, "Event consumer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn log_event(event: &Event) {
    match event {
        Event::Items(ItemEvent::Received { items, index }) => {
            for (offset, item) in items.iter().enumerate() {
                tracing::info!(
                    target: "client",
                    index = index + offset,
                    item = %item.id(),
                    from = %item.sender().display_name(),
                    progression = item.is_progression(),
                    "Item received"
                );
            }
        }
        Event::Hints(HintEvent::Initialized { hints }) => {
            tracing::info!(target: "client", count = hints.len(), "Hints loaded");
        }
        Event::Hints(HintEvent::Received { hint }) => {
            tracing::info!(
                target: "client",
                item = %hint.item(),
                location = %hint.location(),
                finder = %hint.finding_player(),
                status = %hint.status(),
                "New hint"
            );
        }
        Event::Hints(HintEvent::Found { hint }) => {
            tracing::info!(
                target: "client",
                item = %hint.item(),
                location = %hint.location(),
                status = %hint.status(),
                "Hint updated"
            );
        }
        Event::Session(SessionEvent::Connected { generation }) => {
            tracing::info!(target: "client", %generation, "Session reset for new connection");
        }
    }
}
