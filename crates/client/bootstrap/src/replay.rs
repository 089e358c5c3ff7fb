//! Drives a [`SessionScript`] through a running session.
use anyhow::{Context, Result, ensure};
use multiworld_core::ReceivedItemsPacket;
use multiworld_runtime::{InMemoryDataStorage, SessionHandle};

use crate::script::{SessionScript, Step};

/// What a replay left behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub connections: usize,
    pub batches: usize,
    pub item_count: usize,
    pub items_delivered: usize,
    pub hint_count: usize,
}

/// Feeds every step to the runtime in order.
///
/// `storage` must be the store the runtime was built with; hint steps write
/// to it and rely on its change notifications.
pub async fn replay(
    handle: &SessionHandle,
    storage: &InMemoryDataStorage,
    script: &SessionScript,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    let hints_key = script.hints_key();

    for (position, step) in script.steps.iter().enumerate() {
        tracing::trace!(target: "client", position, ?step, "Replaying step");

        match step {
            Step::Connected => {
                handle
                    .connected()
                    .await?
                    .initialized()
                    .await
                    .with_context(|| format!("step {position}: hints did not initialize"))?;
                summary.connections += 1;
            }
            Step::ReceivedItems { index, items } => {
                handle
                    .received_items(ReceivedItemsPacket::new(*index, items.clone()))
                    .await
                    .with_context(|| format!("step {position}: item batch at {index} rejected"))?;
                summary.batches += 1;
            }
            Step::SetHints { hints } => {
                storage.set(&hints_key, serde_json::to_value(hints)?)?;
            }
            Step::ExpectCount { count } => {
                let actual = handle.count().await?;
                ensure!(
                    actual == *count,
                    "step {position}: expected item count {count}, found {actual}"
                );
            }
        }
    }

    let status = handle.status().await?;
    summary.item_count = status.item_count;
    summary.items_delivered = status.items_delivered;
    summary.hint_count = status.hint_count;

    tracing::info!(
        target: "client",
        steps = script.steps.len(),
        connections = summary.connections,
        items = summary.item_count,
        hints = summary.hint_count,
        "Replay finished"
    );

    Ok(summary)
}
