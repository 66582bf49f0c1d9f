//! Grid-wide options shared by the store, the row list and every row.

use serde::{Deserialize, Serialize};

use crate::types::CHECKBOX_COLUMN;

/// What to do when a merged cell's owner row is not in the row list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DanglingSpanPolicy {
    /// Drop the update for that column and log it.
    #[default]
    Skip,
    /// Treat the member row as its own owner and update it directly.
    ApplyToSelf,
}

/// Grid configuration.
///
/// Deserializes from camelCase JSON; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Column whose disabled state follows `RowState::is_disabled_check`.
    pub checkbox_column: String,
    /// Initial span toggle of the data store.
    pub row_span_enabled: bool,
    pub dangling_span: DanglingSpanPolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            checkbox_column: CHECKBOX_COLUMN.to_string(),
            row_span_enabled: true,
            dangling_span: DanglingSpanPolicy::default(),
        }
    }
}

impl GridConfig {
    pub fn is_checkbox_column(&self, column_name: &str) -> bool {
        self.checkbox_column == column_name
    }

    pub fn with_dangling_span(mut self, policy: DanglingSpanPolicy) -> Self {
        self.dangling_span = policy;
        self
    }
}
