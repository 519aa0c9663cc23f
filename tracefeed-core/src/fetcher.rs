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

//! The page-fetching seam between the sync engine and a data source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::FilterSet;
use crate::page::RecordPage;
use crate::record::ListRecord;

/// Parameters identifying one page fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Requested page size.
    pub per_page: u32,
    /// Active filter criteria.
    #[serde(rename = "filters")]
    pub filter: FilterSet,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32, filter: FilterSet) -> Self {
        Self {
            page,
            per_page,
            filter,
        }
    }
}

/// Fetches pages of records for a filtered list query.
///
/// Implementations must be safe to call concurrently: the sync engine issues
/// pagination and refresh fetches from separate tasks. A returned page with
/// `has_more == false` marks the end of the collection for that filter.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// The record type this fetcher produces.
    type Record: ListRecord;

    /// Fetches a single page.
    async fn fetch_page(&self, request: &PageRequest) -> Result<RecordPage<Self::Record>>;
}
