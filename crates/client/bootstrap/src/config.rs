//! Client configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use multiworld_runtime::RuntimeConfig;

/// Configuration required to bootstrap a client session.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub runtime: RuntimeConfig,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub script: Option<PathBuf>,
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `MULTIWORLD_EVENT_BUFFER` - Per-topic event capacity (default: 100)
    /// - `MULTIWORLD_COMMAND_BUFFER` - Worker command queue size (default: 32)
    /// - `MULTIWORLD_SESSION_ID` - Session identifier for log files (default: auto-generated)
    /// - `MULTIWORLD_LOG_DIR` - Directory for log files (default: platform-specific)
    /// - `MULTIWORLD_SCRIPT` - Session script to replay
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(capacity) = parse::<usize>(&lookup, "MULTIWORLD_EVENT_BUFFER") {
            config.runtime.event_buffer_size = capacity.max(1);
        }

        if let Some(capacity) = parse::<usize>(&lookup, "MULTIWORLD_COMMAND_BUFFER") {
            config.runtime.command_buffer_size = capacity.max(1);
        }

        config.session_id = lookup("MULTIWORLD_SESSION_ID").filter(|id| !id.is_empty());
        config.log_dir = lookup("MULTIWORLD_LOG_DIR").map(PathBuf::from);
        config.script = lookup("MULTIWORLD_SCRIPT").map(PathBuf::from);

        config
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}
