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

//! Pure projection of accumulated pages into the merged visible list.

use std::collections::HashSet;

use tracefeed_core::{ListRecord, RecordPage};

/// Flattens pages into the merged, deduplicated list a view renders.
///
/// Pages are visited in the order given (callers pass page-index order) and
/// records keep their within-page order. When the same identifier appears
/// more than once, the first occurrence wins and later ones are dropped.
/// The function reads nothing but its input, so equal inputs always produce
/// equal outputs.
pub fn project<'a, R, I>(pages: I) -> Vec<R>
where
    R: ListRecord + 'a,
    I: IntoIterator<Item = &'a RecordPage<R>>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged: Vec<&R> = Vec::new();
    for page in pages {
        for record in &page.records {
            if seen.insert(record.record_id()) {
                merged.push(record);
            }
        }
    }
    merged.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tracefeed_core::TraceSpan;

    fn span(id: &str, name: &str) -> TraceSpan {
        TraceSpan {
            trace_id: id.to_string(),
            name: name.to_string(),
            created_at_us: 0,
            status: None,
            duration_us: None,
            attributes: serde_json::Map::new(),
        }
    }

    fn page(index: u32, spans: Vec<TraceSpan>) -> RecordPage<TraceSpan> {
        RecordPage::new(index, spans, true)
    }

    fn ids(records: &[TraceSpan]) -> Vec<&str> {
        records.iter().map(|r| r.trace_id.as_str()).collect()
    }

    #[test]
    fn test_duplicates_across_pages_dropped() {
        let pages = vec![
            page(0, vec![span("a", "a0"), span("b", "b0")]),
            page(1, vec![span("b", "b1"), span("c", "c1")]),
        ];
        let merged = project(&pages);
        assert_eq!(ids(&merged), vec!["a", "b", "c"]);
        // The earlier page's copy wins.
        assert_eq!(merged[1].name, "b0");
    }

    #[test]
    fn test_first_seen_wins_within_page() {
        let pages = vec![page(0, vec![span("a", "first"), span("a", "second")])];
        let merged = project(&pages);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "first");
    }

    #[test]
    fn test_within_page_order_preserved() {
        let pages = vec![
            page(0, vec![span("c", ""), span("a", ""), span("b", "")]),
            page(1, vec![span("z", ""), span("a", ""), span("y", "")]),
        ];
        let merged = project(&pages);
        assert_eq!(ids(&merged), vec!["c", "a", "b", "z", "y"]);
    }

    #[test]
    fn test_empty_input_projects_empty() {
        let pages: Vec<RecordPage<TraceSpan>> = Vec::new();
        assert!(project(&pages).is_empty());

        let pages = vec![page(0, Vec::new())];
        assert!(project(&pages).is_empty());
    }

    #[test]
    fn test_projection_is_stable() {
        let pages = vec![
            page(0, vec![span("a", ""), span("b", "")]),
            page(1, vec![span("b", ""), span("c", "")]),
        ];
        assert_eq!(project(&pages), project(&pages));
    }

    fn pages_strategy() -> impl Strategy<Value = Vec<RecordPage<TraceSpan>>> {
        // A small identifier pool forces duplicates within and across pages.
        prop::collection::vec(
            (0u32..4, prop::collection::vec(0usize..10, 0..8)),
            0..6,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .map(|(index, id_picks)| {
                    let spans = id_picks
                        .into_iter()
                        .map(|pick| span(&format!("id-{pick}"), &format!("page-{index}")))
                        .collect();
                    page(index, spans)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_projected_ids_are_unique(pages in pages_strategy()) {
            let merged = project(&pages);
            let mut seen = HashSet::new();
            for record in &merged {
                prop_assert!(seen.insert(record.trace_id.clone()));
            }
        }

        #[test]
        fn test_projection_deterministic(pages in pages_strategy()) {
            prop_assert_eq!(project(&pages), project(&pages));
        }

        #[test]
        fn test_appending_pages_only_extends_the_tail(pages in pages_strategy()) {
            // Records already merged keep their position when more pages
            // arrive behind them.
            for cut in 0..=pages.len() {
                let prefix = project(&pages[..cut]);
                let full = project(&pages);
                prop_assert_eq!(&full[..prefix.len()], &prefix[..]);
            }
        }

        #[test]
        fn test_output_covers_exactly_the_distinct_input_ids(pages in pages_strategy()) {
            let merged = project(&pages);
            let output_ids: HashSet<String> =
                merged.iter().map(|r| r.trace_id.clone()).collect();
            let input_ids: HashSet<String> = pages
                .iter()
                .flat_map(|p| p.records.iter().map(|r| r.trace_id.clone()))
                .collect();
            prop_assert_eq!(merged.len(), input_ids.len());
            prop_assert_eq!(output_ids, input_ids);
        }
    }
}
