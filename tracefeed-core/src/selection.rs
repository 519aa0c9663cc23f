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

//! Selection tracking across list refreshes.

use serde::{Deserialize, Serialize};

use crate::record::ListRecord;

/// Identifier-based selection state for a list view.
///
/// Selection is held by record identifier, never by row position, so a
/// refresh that reorders rows or temporarily drops the selected record
/// leaves the selection intact. Resolution against the current merged list
/// happens at render time through [`Selection::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    selected: Option<String>,
}

impl Selection {
    /// No record selected.
    pub fn none() -> Self {
        Self::default()
    }

    /// Selects the record with the given identifier.
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// The selected identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// True when `id` is the selected identifier.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Finds the selected record in the current merged list.
    ///
    /// Returns `None` when nothing is selected or the record is absent from
    /// this snapshot. Absence does not clear the selection; the record may
    /// reappear on a later refresh.
    pub fn resolve<'a, R: ListRecord>(&self, records: &'a [R]) -> Option<&'a R> {
        let id = self.selected.as_deref()?;
        records.iter().find(|record| record.record_id() == id)
    }
}
