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

//! Record types flowing through a list feed.
//!
//! A feed is generic over its record type. The two concrete records are
//! [`TraceSpan`] for the trace list and [`WorkflowRun`] for the workflow-run
//! list; both expose their identity through [`ListRecord`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record that can appear in a paginated list feed.
///
/// Identifiers must be unique within one backing collection. Records with
/// equal identifiers observed on different pages are treated as the same
/// entity when pages are merged.
pub trait ListRecord: Clone + Send + Sync + 'static {
    /// Stable unique identifier for this record.
    fn record_id(&self) -> &str;

    /// Creation time in microseconds since the Unix epoch.
    fn created_at_us(&self) -> u64;

    /// Human-readable name for list rendering.
    fn display_name(&self) -> &str;
}

/// One row in the trace list: a root span with summary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSpan {
    /// Unique trace identifier.
    pub trace_id: String,
    /// Operation name of the root span.
    pub name: String,
    /// Creation time in microseconds since the Unix epoch.
    #[serde(default)]
    pub created_at_us: u64,
    /// Terminal status reported by the server, if any.
    #[serde(default)]
    pub status: Option<String>,
    /// Wall-clock duration in microseconds, once the trace has finished.
    #[serde(default)]
    pub duration_us: Option<u64>,
    /// Free-form attributes attached by the producer.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ListRecord for TraceSpan {
    fn record_id(&self) -> &str {
        &self.trace_id
    }

    fn created_at_us(&self) -> u64 {
        self.created_at_us
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// One row in the workflow-run list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    /// Unique run identifier.
    pub run_id: String,
    /// Workflow name.
    pub name: String,
    /// Creation time in microseconds since the Unix epoch.
    #[serde(default)]
    pub created_at_us: u64,
    /// Current lifecycle state.
    #[serde(default)]
    pub state: RunState,
    /// Free-form attributes attached by the producer.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ListRecord for WorkflowRun {
    fn record_id(&self) -> &str {
        &self.run_id
    }

    fn created_at_us(&self) -> u64 {
        self.created_at_us
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Lifecycle state of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Accepted but not yet started.
    #[default]
    Queued,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Stopped before completion.
    Cancelled,
}

impl RunState {
    /// True once the run can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Succeeded | RunState::Failed | RunState::Cancelled
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Queued => "queued",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_span_wire_names() {
        let span = TraceSpan {
            trace_id: "tr-1".to_string(),
            name: "checkout".to_string(),
            created_at_us: 1_700_000_000_000_000,
            status: Some("completed".to_string()),
            duration_us: Some(2_500),
            attributes: Map::new(),
        };
        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(json["traceId"], "tr-1");
        assert_eq!(json["createdAtUs"], 1_700_000_000_000_000u64);
        assert_eq!(json["durationUs"], 2_500);
    }

    #[test]
    fn test_trace_span_tolerates_sparse_payload() {
        let span: TraceSpan =
            serde_json::from_str(r#"{"traceId":"tr-2","name":"ingest"}"#).unwrap();
        assert_eq!(span.record_id(), "tr-2");
        assert_eq!(span.created_at_us, 0);
        assert!(span.status.is_none());
        assert!(span.attributes.is_empty());
    }

    #[test]
    fn test_workflow_run_state_wire_values() {
        let run: WorkflowRun = serde_json::from_str(
            r#"{"runId":"run-9","name":"nightly-sync","state":"running"}"#,
        )
        .unwrap();
        assert_eq!(run.state, RunState::Running);
        assert!(!run.state.is_terminal());

        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["state"], "running");
    }

    #[test]
    fn test_run_state_defaults_and_terminal() {
        let run: WorkflowRun =
            serde_json::from_str(r#"{"runId":"run-1","name":"backfill"}"#).unwrap();
        assert_eq!(run.state, RunState::Queued);
        assert!(RunState::Succeeded.is_terminal());
        assert!(RunState::Cancelled.is_terminal());
        assert!(!RunState::Queued.is_terminal());
        assert_eq!(RunState::Failed.to_string(), "failed");
    }
}
