//! Bridge from backing-store notifications to cell updates.
//!
//! Metadata changes resynchronize the row's derived state; column changes
//! become value patches on the matching cell.
//!
//! A batch is replayed against the store's current record, since an
//! observer notified for an earlier entry may already have rewritten a
//! later one.

use crate::row::RenderRow;
use crate::source::{FieldChange, RowSubscriber};
use crate::types::{CellPatch, CellValue};

impl RowSubscriber for RenderRow {
    fn on_row_changed(&self, changes: &[FieldChange]) {
        for change in changes {
            match change {
                FieldChange::ExtraData => {
                    self.sync_row_state();
                }
                FieldChange::Column { column_name, .. } => {
                    let current = self.current_value(column_name).unwrap_or(CellValue::Null);
                    self.set_cell(column_name, CellPatch::value(current));
                }
            }
        }
    }

    fn on_extra_data_changed(&self) {
        self.sync_row_state();
    }
}
