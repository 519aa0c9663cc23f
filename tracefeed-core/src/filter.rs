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

//! Filter criteria applied to a list query.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque set of filter criteria, forwarded to the server verbatim.
///
/// The sync engine never interprets criteria; it only compares filter sets
/// for equality and resets its accumulated pages when the active one changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(Map<String, Value>);

impl FilterSet {
    /// An empty filter, matching all records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion, consuming and returning the set.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a criterion in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Looks up a criterion by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when no criteria are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builder_and_lookup() {
        let filter = FilterSet::new()
            .with("status", "error")
            .with("minDurationUs", 1_000);
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.get("status"), Some(&Value::from("error")));
        assert_eq!(filter.get("minDurationUs"), Some(&Value::from(1_000)));
        assert_eq!(filter.get("missing"), None);
    }

    #[test]
    fn test_filter_serializes_transparently() {
        let filter = FilterSet::new().with("env", "prod");
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, r#"{"env":"prod"}"#);

        let parsed: FilterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, filter);
    }

    #[test]
    fn test_filter_equality_drives_reset_decisions() {
        let a = FilterSet::new().with("env", "prod");
        let b = FilterSet::new().with("env", "prod");
        let c = FilterSet::new().with("env", "staging");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, FilterSet::new());
    }
}
