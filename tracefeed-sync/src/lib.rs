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

//! Live synchronization of paginated, periodically refreshed list views.
//!
//! A [`LiveQuery`] worker fetches pages through a
//! [`PageFetcher`](tracefeed_core::PageFetcher) on two lanes (forward
//! pagination and first-page refresh), accumulates them keyed by page index,
//! and publishes merged, deduplicated [`ListSnapshot`]s over a watch
//! channel. The [`LiveQueryHandle`] is the UI-facing side: it signals
//! scroll position, requests refreshes, and swaps filters.

pub mod engine;
pub mod pages;
pub mod project;
pub mod snapshot;

pub use engine::{LiveQuery, LiveQueryHandle};
pub use pages::PageSet;
pub use project::project;
pub use snapshot::{FetchFailure, FetchLane, ListSnapshot, LoadPhase};
