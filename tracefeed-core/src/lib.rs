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

//! Core types for tracefeed list synchronization.
//!
//! This crate defines the vocabulary shared by the sync engine, the HTTP
//! client, and the CLI: records and their identity, fetched pages, filter
//! criteria, the [`PageFetcher`] seam, sync policy, and selection state.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod page;
pub mod policy;
pub mod record;
pub mod selection;

pub use config::{FeedConfig, DEFAULT_ENDPOINT};
pub use error::{FeedError, Result};
pub use fetcher::{PageFetcher, PageRequest};
pub use filter::FilterSet;
pub use page::{now_us, PageInfo, RecordPage};
pub use policy::{RefetchSemantics, RetryPolicy, SyncPolicy, MAX_PAGE_SIZE, MIN_REFRESH_INTERVAL};
pub use record::{ListRecord, RunState, TraceSpan, WorkflowRun};
pub use selection::Selection;
