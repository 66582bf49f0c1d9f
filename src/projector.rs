//! Cold-path projection of a raw row into display cells.

use std::collections::BTreeMap;

use crate::config::GridConfig;
use crate::source::DataSource;
use crate::span::effective_span;
use crate::types::{is_reserved_field, Cell, CellPatch, RawRow, RowKey, RowState};

/// Editability, disabled state and classes of one cell, as the store
/// currently derives them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedState {
    pub is_editable: bool,
    pub is_disabled: bool,
    pub class_names: Vec<String>,
}

impl DerivedState {
    pub fn resolve(
        source: &dyn DataSource,
        config: &GridConfig,
        row_key: RowKey,
        row_state: RowState,
        column_name: &str,
    ) -> Self {
        let is_disabled = if config.is_checkbox_column(column_name) {
            row_state.is_disabled_check
        } else {
            row_state.is_disabled
        };
        Self {
            is_editable: source.is_editable(row_key, column_name),
            is_disabled,
            class_names: source.class_name_list(row_key, column_name),
        }
    }

    /// Patch carrying exactly the derived fields.
    pub fn into_patch(self) -> CellPatch {
        CellPatch {
            is_editable: Some(self.is_editable),
            is_disabled: Some(self.is_disabled),
            class_names: Some(self.class_names),
            ..CellPatch::default()
        }
    }
}

/// Build every cell of `raw`, keyed by column name.
///
/// Projection has no hidden state: the same row and store state always
/// produce identical cells, with empty option lists and change lists.
#[must_use]
pub fn project(raw: &RawRow, source: &dyn DataSource, config: &GridConfig) -> BTreeMap<String, Cell> {
    let row_key = raw.row_key;
    let row_state = source.row_state(row_key);
    let span_enabled = source.is_row_span_enabled();

    raw.columns
        .iter()
        .filter(|(column_name, _)| !is_reserved_field(column_name))
        .map(|(column_name, value)| {
            let span = effective_span(raw, column_name, span_enabled);
            let derived = DerivedState::resolve(source, config, row_key, row_state, column_name);
            let cell = Cell {
                row_key,
                column_name: column_name.clone(),
                value: value.clone(),
                span_length: span.span_length,
                is_owner: span.is_owner,
                owner_row_key: span.owner_row_key,
                is_editable: derived.is_editable,
                is_disabled: derived.is_disabled,
                class_names: derived.class_names,
                option_list: Vec::new(),
                changed_fields: Vec::new(),
            };
            (column_name.clone(), cell)
        })
        .collect()
}
