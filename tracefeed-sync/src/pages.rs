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

//! Accumulation of fetched pages, keyed by page index.

use std::collections::BTreeMap;

use tracefeed_core::{RecordPage, RefetchSemantics};

/// The set of pages fetched so far for one query context.
///
/// Under [`RefetchSemantics::Replace`] there is at most one live page per
/// index and a refetch supersedes the previous content for that index. Under
/// [`RefetchSemantics::Append`] every fetch is retained in arrival order and
/// reconciliation is deferred to projection.
#[derive(Debug)]
pub struct PageSet<R> {
    semantics: RefetchSemantics,
    live: BTreeMap<u32, RecordPage<R>>,
    log: Vec<RecordPage<R>>,
    last_total: Option<u64>,
    last_fetched_at_us: Option<u64>,
}

impl<R> PageSet<R> {
    pub fn new(semantics: RefetchSemantics) -> Self {
        Self {
            semantics,
            live: BTreeMap::new(),
            log: Vec::new(),
            last_total: None,
            last_fetched_at_us: None,
        }
    }

    /// The reconciliation mode this set was built with.
    pub fn semantics(&self) -> RefetchSemantics {
        self.semantics
    }

    /// Absorbs a completed fetch.
    ///
    /// Failed fetches never reach this point; the previously absorbed page
    /// for an index stays current until a successful refetch supersedes it.
    pub fn absorb(&mut self, page: RecordPage<R>) {
        if let Some(total) = page.total {
            self.last_total = Some(total);
        }
        self.last_fetched_at_us = Some(page.fetched_at_us);
        match self.semantics {
            RefetchSemantics::Replace => {
                self.live.insert(page.index, page);
            }
            RefetchSemantics::Append => {
                self.log.push(page);
            }
        }
    }

    /// All held pages in page-index order.
    ///
    /// Under `Append`, pages sharing an index keep their arrival order, so
    /// the earliest fetch of an index contributes its records first.
    pub fn pages(&self) -> Vec<&RecordPage<R>> {
        match self.semantics {
            RefetchSemantics::Replace => self.live.values().collect(),
            RefetchSemantics::Append => {
                let mut refs: Vec<&RecordPage<R>> = self.log.iter().collect();
                refs.sort_by_key(|page| page.index);
                refs
            }
        }
    }

    /// Drops all pages and the remembered total and fetch time.
    pub fn clear(&mut self) {
        self.live.clear();
        self.log.clear();
        self.last_total = None;
        self.last_fetched_at_us = None;
    }

    /// True when no pages are held.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.log.is_empty()
    }

    /// Number of held page entries.
    pub fn page_count(&self) -> usize {
        match self.semantics {
            RefetchSemantics::Replace => self.live.len(),
            RefetchSemantics::Append => self.log.len(),
        }
    }

    /// Highest page index fetched so far.
    pub fn frontier_index(&self) -> Option<u32> {
        match self.semantics {
            RefetchSemantics::Replace => self.live.keys().next_back().copied(),
            RefetchSemantics::Append => self.log.iter().map(|page| page.index).max(),
        }
    }

    /// Whether the most recent fetch of the frontier page reported more data.
    ///
    /// False while no page has been fetched, so pagination never runs ahead
    /// of the initial load.
    pub fn frontier_has_more(&self) -> bool {
        let Some(frontier) = self.frontier_index() else {
            return false;
        };
        match self.semantics {
            RefetchSemantics::Replace => self
                .live
                .get(&frontier)
                .map(|page| page.has_more)
                .unwrap_or(false),
            RefetchSemantics::Append => self
                .log
                .iter()
                .rev()
                .find(|page| page.index == frontier)
                .map(|page| page.has_more)
                .unwrap_or(false),
        }
    }

    /// The page index a forward fetch should request next.
    pub fn next_page_index(&self) -> u32 {
        self.frontier_index().map(|index| index + 1).unwrap_or(0)
    }

    /// Most recently reported server-side total, if any response carried one.
    pub fn latest_total(&self) -> Option<u64> {
        self.last_total
    }

    /// Fetch time of the most recently absorbed page.
    pub fn latest_fetched_at_us(&self) -> Option<u64> {
        self.last_fetched_at_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: u32, records: &[&str], has_more: bool) -> RecordPage<String> {
        RecordPage::new(
            index,
            records.iter().map(|r| r.to_string()).collect(),
            has_more,
        )
    }

    #[test]
    fn test_replace_supersedes_same_index() {
        let mut set = PageSet::new(RefetchSemantics::Replace);
        set.absorb(page(0, &["a", "b"], true));
        set.absorb(page(0, &["b", "c"], true));

        assert_eq!(set.page_count(), 1);
        let pages = set.pages();
        assert_eq!(pages[0].records, vec!["b", "c"]);
    }

    #[test]
    fn test_append_retains_every_fetch() {
        let mut set = PageSet::new(RefetchSemantics::Append);
        set.absorb(page(0, &["a"], true));
        set.absorb(page(0, &["b"], true));

        assert_eq!(set.page_count(), 2);
        // Arrival order within the same index is preserved.
        let pages = set.pages();
        assert_eq!(pages[0].records, vec!["a"]);
        assert_eq!(pages[1].records, vec!["b"]);
    }

    #[test]
    fn test_pages_come_back_in_index_order() {
        let mut set = PageSet::new(RefetchSemantics::Replace);
        set.absorb(page(2, &["e"], false));
        set.absorb(page(0, &["a"], true));
        set.absorb(page(1, &["c"], true));

        let indexes: Vec<u32> = set.pages().iter().map(|p| p.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn test_frontier_tracks_highest_index() {
        let mut set = PageSet::new(RefetchSemantics::Replace);
        assert_eq!(set.frontier_index(), None);
        assert!(!set.frontier_has_more());
        assert_eq!(set.next_page_index(), 0);

        set.absorb(page(0, &["a"], true));
        set.absorb(page(1, &["b"], true));
        assert_eq!(set.frontier_index(), Some(1));
        assert!(set.frontier_has_more());
        assert_eq!(set.next_page_index(), 2);

        // Refetching the frontier with has_more == false ends pagination.
        set.absorb(page(1, &["b"], false));
        assert!(!set.frontier_has_more());
    }

    #[test]
    fn test_append_frontier_uses_latest_fetch() {
        let mut set = PageSet::new(RefetchSemantics::Append);
        set.absorb(page(1, &["x"], true));
        set.absorb(page(1, &["y"], false));
        assert_eq!(set.frontier_index(), Some(1));
        assert!(!set.frontier_has_more());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut set = PageSet::new(RefetchSemantics::Replace);
        set.absorb(page(0, &["a"], true).with_total(40));
        assert_eq!(set.latest_total(), Some(40));
        assert!(!set.is_empty());

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.latest_total(), None);
        assert_eq!(set.latest_fetched_at_us(), None);
        assert_eq!(set.next_page_index(), 0);
    }

    #[test]
    fn test_latest_total_keeps_last_reported() {
        let mut set = PageSet::new(RefetchSemantics::Replace);
        set.absorb(page(0, &["a"], true).with_total(100));
        set.absorb(page(1, &["b"], true));
        assert_eq!(set.latest_total(), Some(100));

        set.absorb(page(0, &["a"], true).with_total(90));
        assert_eq!(set.latest_total(), Some(90));
    }

    #[test]
    fn test_latest_fetch_time_tracks_newest_absorb() {
        let page_at = |index: u32, fetched_at_us: u64| {
            let mut page = page(index, &["r"], true);
            page.fetched_at_us = fetched_at_us;
            page
        };

        let mut set = PageSet::new(RefetchSemantics::Replace);
        assert_eq!(set.latest_fetched_at_us(), None);

        set.absorb(page_at(0, 100));
        set.absorb(page_at(1, 250));
        assert_eq!(set.latest_fetched_at_us(), Some(250));

        // A refetch of an earlier index is still the newest sync point.
        set.absorb(page_at(0, 400));
        assert_eq!(set.latest_fetched_at_us(), Some(400));
    }
}
