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

//! HTTP page fetchers for the tracefeed list endpoints.
//!
//! [`HttpListClient`] implements [`tracefeed_core::PageFetcher`] against the
//! server's paginated search API, one typed client per list.

pub mod client;
mod wire;

pub use client::{ClientConfig, HttpListClient, RUNS_SEARCH_PATH, TRACES_SEARCH_PATH};

/// Fetcher for the trace list.
pub type TraceListClient = HttpListClient<tracefeed_core::TraceSpan>;

/// Fetcher for the workflow-run list.
pub type RunListClient = HttpListClient<tracefeed_core::WorkflowRun>;
