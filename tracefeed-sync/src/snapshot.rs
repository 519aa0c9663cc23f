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

//! Published view state of a live list query.

use std::sync::Arc;

use tracefeed_core::{FeedError, ListRecord, Selection};

/// Load phase of the list as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// The first page for the current filter has not arrived yet.
    Loading,
    /// At least one page has been absorbed; the list is renderable.
    Ready,
}

/// Which concurrent fetch lane issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchLane {
    /// Forward pagination toward higher page indexes.
    Forward,
    /// Periodic or explicit refresh of the first page.
    Refresh,
}

/// A fetch that failed after exhausting its retries.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// Page index the fetch was issued for.
    pub page: u32,
    /// Lane the fetch ran on.
    pub lane: FetchLane,
    /// The terminal error.
    pub error: FeedError,
    /// When the failure was recorded, microseconds since the Unix epoch.
    pub at_us: u64,
}

/// An immutable view of the merged list at one point in time.
///
/// Snapshots are cheap to clone; the record storage is shared. A snapshot
/// never contains two records with the same identifier.
#[derive(Debug, Clone)]
pub struct ListSnapshot<R> {
    /// Merged records in display order.
    pub records: Arc<[R]>,
    /// Load phase of the current filter's query.
    pub phase: LoadPhase,
    /// True while a refresh fetch is in flight.
    pub refreshing: bool,
    /// True while a forward pagination fetch is in flight.
    pub paginating: bool,
    /// Whether the server reports more pages past the current frontier.
    pub has_more: bool,
    /// Server-reported total for the active filter, if known.
    pub total: Option<u64>,
    /// Fetch time of the most recently absorbed page, microseconds since
    /// the Unix epoch; `None` until a page lands for the current filter.
    pub fetched_at_us: Option<u64>,
    /// The most recent failed fetch, cleared by the next success.
    pub last_failure: Option<FetchFailure>,
    /// Monotonic publication counter for this query session.
    pub version: u64,
}

impl<R: ListRecord> ListSnapshot<R> {
    /// An empty snapshot in the loading phase, as published before the
    /// first fetch of a query session completes.
    pub fn empty() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            phase: LoadPhase::Loading,
            refreshing: false,
            paginating: false,
            has_more: false,
            total: None,
            fetched_at_us: None,
            last_failure: None,
            version: 0,
        }
    }

    /// Number of merged records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are visible.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True until the first page for the current filter has arrived.
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    /// Finds a record by identifier.
    pub fn find(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.record_id() == id)
    }

    /// Row position of a record by identifier.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.record_id() == id)
    }

    /// Resolves a selection against this snapshot's records.
    pub fn selected<'a>(&'a self, selection: &Selection) -> Option<&'a R> {
        selection.resolve(&self.records)
    }
}
