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

//! Plain-text rendering of list snapshots.

use tracefeed_core::{ListRecord, RunState, Selection, TraceSpan, WorkflowRun};
use tracefeed_sync::ListSnapshot;

/// Renders a snapshot as a status line, one row per record, and a footer
/// describing the selection.
pub fn render_snapshot<R: ListRecord>(
    snapshot: &ListSnapshot<R>,
    selection: &Selection,
    row: fn(&R) -> String,
) -> String {
    let mut out = String::new();
    out.push_str(&status_line(snapshot));
    out.push('\n');

    if let Some(failure) = &snapshot.last_failure {
        let suffix = if snapshot.is_empty() {
            ""
        } else {
            " (showing last good data)"
        };
        out.push_str(&format!(
            "! page {} fetch failed: {}{suffix}\n",
            failure.page, failure.error
        ));
    }

    for record in snapshot.records.iter() {
        let marker = if selection.is_selected(record.record_id()) {
            '>'
        } else {
            ' '
        };
        out.push_str(&format!("{marker} {}\n", row(record)));
    }

    if let Some(id) = selection.id() {
        match snapshot.selected(selection) {
            Some(record) => out.push_str(&format!(
                "selected: {id} ({}, created {})\n",
                record.display_name(),
                format_timestamp(record.created_at_us())
            )),
            None => out.push_str(&format!("selected: {id} (not in view)\n")),
        }
    }
    out
}

fn status_line<R: ListRecord>(snapshot: &ListSnapshot<R>) -> String {
    let mut parts = vec![format!("{} records", snapshot.len())];
    if let Some(total) = snapshot.total {
        parts.push(format!("of {total}"));
    }
    if snapshot.is_loading() {
        parts.push("loading".to_string());
    }
    if snapshot.refreshing {
        parts.push("refreshing".to_string());
    }
    if snapshot.paginating {
        parts.push("fetching more".to_string());
    } else if snapshot.has_more {
        parts.push("more available".to_string());
    }
    if let Some(fetched_at_us) = snapshot.fetched_at_us {
        parts.push(format!("synced {}", format_time_of_day(fetched_at_us)));
    }
    format!("-- {} --", parts.join(", "))
}

/// One trace list row: identifier, creation time, duration, name.
pub fn trace_row(span: &TraceSpan) -> String {
    let duration = span
        .duration_us
        .map(format_duration)
        .unwrap_or_else(|| "-".to_string());
    let status = span
        .status
        .as_deref()
        .map(|s| format!(" [{s}]"))
        .unwrap_or_default();
    format!(
        "{:<20} {} {:>9} {}{status}",
        short_id(&span.trace_id),
        format_timestamp(span.created_at_us),
        duration,
        span.name,
    )
}

/// One workflow-run list row: identifier, creation time, state, name.
pub fn run_row(run: &WorkflowRun) -> String {
    format!(
        "{:<20} {} {:<10} {}",
        short_id(&run.run_id),
        format_timestamp(run.created_at_us),
        run_state_label(run.state),
        run.name,
    )
}

/// Non-terminal states carry a marker so in-progress runs stand out.
fn run_state_label(state: RunState) -> String {
    if state.is_terminal() {
        state.to_string()
    } else {
        format!("{state}*")
    }
}

fn short_id(id: &str) -> String {
    if id.chars().count() <= 20 {
        id.to_string()
    } else {
        let head: String = id.chars().take(18).collect();
        format!("{head}..")
    }
}

fn format_timestamp(us: u64) -> String {
    chrono::DateTime::from_timestamp_micros(us as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_time_of_day(us: u64) -> String {
    chrono::DateTime::from_timestamp_micros(us as i64)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_duration(us: u64) -> String {
    if us < 1_000 {
        format!("{us}us")
    } else if us < 1_000_000 {
        format!("{:.1}ms", us as f64 / 1_000.0)
    } else {
        format!("{:.2}s", us as f64 / 1_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tracefeed_sync::LoadPhase;

    fn span(id: &str, name: &str) -> TraceSpan {
        TraceSpan {
            trace_id: id.to_string(),
            name: name.to_string(),
            created_at_us: 1_700_000_000_000_000,
            status: Some("completed".to_string()),
            duration_us: Some(2_500),
            attributes: Map::new(),
        }
    }

    #[test]
    fn test_trace_row_formats_fields() {
        let row = trace_row(&span("tr-1", "checkout"));
        assert!(row.starts_with("tr-1"));
        assert!(row.contains("2023-11-14"));
        assert!(row.contains("2.5ms"));
        assert!(row.contains("checkout [completed]"));

        let mut sparse = span("tr-2", "ingest");
        sparse.status = None;
        sparse.duration_us = None;
        let row = trace_row(&sparse);
        assert!(row.contains(" - "));
        assert!(row.trim_end().ends_with("ingest"));
    }

    #[test]
    fn test_run_row_marks_active_states() {
        let mut run = WorkflowRun {
            run_id: "run-1".to_string(),
            name: "nightly-sync".to_string(),
            created_at_us: 1_700_000_000_000_000,
            state: RunState::Running,
            attributes: Map::new(),
        };
        assert!(run_row(&run).contains("running*"));

        run.state = RunState::Succeeded;
        let row = run_row(&run);
        assert!(row.contains("succeeded"));
        assert!(!row.contains("succeeded*"));
    }

    #[test]
    fn test_duration_tiers() {
        assert_eq!(format_duration(450), "450us");
        assert_eq!(format_duration(2_500), "2.5ms");
        assert_eq!(format_duration(1_250_000), "1.25s");
    }

    #[test]
    fn test_short_id_truncates_long_identifiers() {
        assert_eq!(short_id("tr-1"), "tr-1");
        let long = "0123456789abcdef0123456789abcdef";
        let shortened = short_id(long);
        assert_eq!(shortened.chars().count(), 20);
        assert!(shortened.ends_with(".."));
    }

    #[test]
    fn test_render_marks_exactly_one_selected_row() {
        let records = vec![span("a", "alpha"), span("c", "charlie"), span("d", "delta")];
        let snapshot = ListSnapshot {
            records: std::sync::Arc::from(records),
            phase: LoadPhase::Ready,
            refreshing: false,
            paginating: false,
            has_more: false,
            total: Some(3),
            fetched_at_us: None,
            last_failure: None,
            version: 1,
        };
        let mut selection = Selection::none();
        selection.select("c");

        let out = render_snapshot(&snapshot, &selection, trace_row);
        let marked: Vec<&str> = out
            .lines()
            .filter(|line| line.starts_with("> "))
            .collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("charlie"));
        assert!(out.contains("selected: c (charlie,"));
    }

    #[test]
    fn test_render_empty_snapshot() {
        let snapshot = ListSnapshot::<TraceSpan>::empty();
        let mut selection = Selection::none();
        let out = render_snapshot(&snapshot, &selection, trace_row);
        assert!(out.starts_with("-- 0 records, loading --"));
        assert!(!out.contains("selected:"));

        selection.select("tr-9");
        let out = render_snapshot(&snapshot, &selection, trace_row);
        assert!(out.contains("selected: tr-9 (not in view)"));
    }

    #[test]
    fn test_status_line_shows_sync_time_once_fetched() {
        let snapshot = ListSnapshot::<TraceSpan> {
            records: std::sync::Arc::from(Vec::new()),
            phase: LoadPhase::Ready,
            refreshing: false,
            paginating: false,
            has_more: true,
            total: Some(12),
            fetched_at_us: Some(1_700_000_000_000_000),
            last_failure: None,
            version: 2,
        };
        let out = render_snapshot(&snapshot, &Selection::none(), trace_row);
        assert!(out.starts_with("-- 0 records, of 12, more available, synced 22:13:20 --"));
    }
}
