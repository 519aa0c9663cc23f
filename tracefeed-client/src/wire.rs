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

//! Wire shapes for the list search endpoints.

use serde::Deserialize;

use tracefeed_core::{now_us, PageInfo, RecordPage};

/// Response envelope of the search endpoints.
///
/// Both the record array and the pagination block are optional on the wire,
/// whether absent or explicitly `null`; a degenerate response decodes into
/// an empty final page. Modelled as `Option` rather than `#[serde(default)]`
/// so the derive does not demand `R: Default`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageEnvelope<R> {
    pub records: Option<Vec<R>>,
    pub pagination: Option<PageInfo>,
}

impl<R> PageEnvelope<R> {
    /// Converts the envelope into a [`RecordPage`].
    ///
    /// The page is keyed by the index the request was issued for, not by
    /// whatever index the server echoes back.
    pub(crate) fn into_page(self, requested_index: u32) -> RecordPage<R> {
        RecordPage {
            index: requested_index,
            records: self.records.unwrap_or_default(),
            total: self.pagination.map(|p| p.total),
            has_more: self.pagination.map(|p| p.has_more).unwrap_or(false),
            fetched_at_us: now_us(),
        }
    }
}
