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

//! Error types shared by the tracefeed crates.

use thiserror::Error;

/// Errors surfaced by page fetching and list synchronization.
///
/// The error is `Clone` because the sync engine carries the most recent
/// failure inside published snapshots.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    /// The request never produced an HTTP response (connect, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status code.
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid configuration values or an unreadable config file.
    #[error("config error: {0}")]
    Config(String),
}

impl FeedError {
    /// True when a later attempt at the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Transport(_) => true,
            FeedError::Api { status, .. } => *status >= 500 || *status == 429,
            FeedError::Decode(_) | FeedError::Config(_) => false,
        }
    }
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
