// Copyright 2025 Tracefeed Contributors (https://github.com/tracefeed/tracefeed)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Feed configuration loading.
//!
//! Configuration merges three layers: built-in defaults, an optional TOML
//! file, and `TRACEFEED_*` environment variables, in that order.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};
use crate::policy::SyncPolicy;

/// Default server endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8600";

/// Connection and cadence settings for a feed client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Server base URL.
    pub endpoint: String,
    /// Refresh period in milliseconds.
    pub refresh_ms: u64,
    /// Records requested per page.
    pub page_size: u32,
    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            refresh_ms: 5_000,
            page_size: 50,
            request_timeout_ms: 30_000,
        }
    }
}

impl FeedConfig {
    /// Defaults overlaid with `TRACEFEED_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Reads a TOML config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FeedError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| FeedError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Overlays `TRACEFEED_*` environment variables onto this config.
    pub fn apply_env(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("TRACEFEED_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(refresh_ms) = env_parse("TRACEFEED_REFRESH_MS") {
            self.refresh_ms = refresh_ms;
        }
        if let Some(page_size) = env_parse("TRACEFEED_PAGE_SIZE") {
            self.page_size = page_size;
        }
        if let Some(timeout_ms) = env_parse("TRACEFEED_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = timeout_ms;
        }
        self
    }

    /// Refresh period as a `Duration`.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    /// HTTP request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Sync policy derived from these settings.
    pub fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy::new()
            .with_refresh_interval(self.refresh_interval())
            .with_page_size(self.page_size)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracefeed.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "endpoint = \"http://feed.internal:9000\"").unwrap();
        writeln!(file, "refresh_ms = 2000").unwrap();

        let config = FeedConfig::load(&path).unwrap();
        assert_eq!(config.endpoint, "http://feed.internal:9000");
        assert_eq!(config.refresh_ms, 2_000);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "refresh_ms = \"soon\"").unwrap();

        let err = FeedConfig::load(&path).unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));

        let err = FeedConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[test]
    fn test_env_overlay() {
        std::env::set_var("TRACEFEED_PAGE_SIZE", "25");
        std::env::set_var("TRACEFEED_REFRESH_MS", "not-a-number");
        let config = FeedConfig::default().apply_env();
        std::env::remove_var("TRACEFEED_PAGE_SIZE");
        std::env::remove_var("TRACEFEED_REFRESH_MS");

        assert_eq!(config.page_size, 25);
        // Unparseable values are ignored rather than propagated.
        assert_eq!(config.refresh_ms, 5_000);
    }

    #[test]
    fn test_sync_policy_mapping() {
        let config = FeedConfig {
            refresh_ms: 1_500,
            page_size: 20,
            ..FeedConfig::default()
        };
        let policy = config.sync_policy();
        assert_eq!(policy.refresh_interval, Duration::from_millis(1_500));
        assert_eq!(policy.page_size, 20);
    }
}
