//! Builds the runtime and its collaborators for a replayed session.
use anyhow::Result;
use multiworld_runtime::{InMemoryDataStorage, Runtime};

use crate::config::ClientConfig;
use crate::script::SessionScript;

/// Builder that assembles runtime state, storage, and configuration for clients.
pub struct SessionBuilder {
    config: ClientConfig,
    storage: InMemoryDataStorage,
}

impl SessionBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            storage: InMemoryDataStorage::new(),
        }
    }

    /// Provide a pre-populated store (e.g., hints left over from a previous run).
    pub fn storage(mut self, storage: InMemoryDataStorage) -> Self {
        self.storage = storage;
        self
    }

    pub async fn build(self, script: &SessionScript) -> Result<SessionSetup> {
        let roster = script.roster();
        tracing::debug!(
            target: "client",
            players = roster.len(),
            me = %script.me().display_name(),
            "Roster assembled"
        );

        let runtime = Runtime::builder()
            .config(self.config.runtime.clone())
            .resolver(roster)
            .storage(self.storage.clone())
            .build()
            .await?;

        Ok(SessionSetup {
            config: self.config,
            storage: self.storage,
            runtime,
        })
    }
}

pub struct SessionSetup {
    pub config: ClientConfig,
    /// Shares its contents with the store the runtime reads from.
    pub storage: InMemoryDataStorage,
    pub runtime: Runtime,
}
