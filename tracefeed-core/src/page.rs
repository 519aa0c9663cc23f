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

//! Fetched pages and the wire pagination block.

use serde::{Deserialize, Serialize};

/// Current wall-clock time in microseconds since the Unix epoch.
pub fn now_us() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Pagination summary attached to a page response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    /// Zero-based index of the returned page.
    pub page: u32,
    /// Page size the server applied.
    pub per_page: u32,
    /// Total records matching the filter, as of this response.
    pub total: u64,
    /// Whether at least one further page exists.
    pub has_more: bool,
}

/// One fetched page of records, stamped with fetch metadata.
///
/// `index` is always the page index the fetch was issued for, regardless of
/// what the server echoes back; pages are keyed by it when accumulated.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage<R> {
    /// The page index this page was requested for.
    pub index: u32,
    /// Records in server order.
    pub records: Vec<R>,
    /// Server-reported total for the active filter, if present.
    pub total: Option<u64>,
    /// Whether the server reports further pages past this one.
    pub has_more: bool,
    /// Fetch completion time in microseconds since the Unix epoch.
    pub fetched_at_us: u64,
}

impl<R> RecordPage<R> {
    /// Builds a page stamped with the current time.
    pub fn new(index: u32, records: Vec<R>, has_more: bool) -> Self {
        Self {
            index,
            records,
            total: None,
            has_more,
            fetched_at_us: now_us(),
        }
    }

    /// Attaches the server-reported total.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the page carries no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info_decodes_camel_case() {
        let info: PageInfo = serde_json::from_str(
            r#"{"page":2,"perPage":50,"total":240,"hasMore":true}"#,
        )
        .unwrap();
        assert_eq!(info.page, 2);
        assert_eq!(info.per_page, 50);
        assert_eq!(info.total, 240);
        assert!(info.has_more);
    }

    #[test]
    fn test_page_info_tolerates_missing_fields() {
        let info: PageInfo = serde_json::from_str(r#"{"page":1}"#).unwrap();
        assert_eq!(info.page, 1);
        assert_eq!(info.total, 0);
        assert!(!info.has_more);
    }

    #[test]
    fn test_record_page_construction() {
        let page = RecordPage::new(3, vec!["a", "b"], true).with_total(120);
        assert_eq!(page.index, 3);
        assert_eq!(page.len(), 2);
        assert!(!page.is_empty());
        assert_eq!(page.total, Some(120));
        assert!(page.fetched_at_us > 0);
    }
}
