//! Contract between the view model and its backing store.
//!
//! The store answers per-row queries and pushes row mutations to
//! subscribers. Subscribers are held weakly; a [`Subscription`] guard owned
//! by the subscriber removes the registration when dropped.

use std::rc::{Rc, Weak};

use crate::types::{CellValue, RawRow, RowKey, RowState};

/// Identifier handed out by [`DataSource::subscribe`].
pub type SubscriptionId = u64;

/// One changed field of a backing row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    /// A column value changed (or was restored).
    Column {
        column_name: String,
        value: CellValue,
    },
    /// The `_extraData` block changed.
    ExtraData,
}

impl FieldChange {
    pub fn column(column_name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self::Column {
            column_name: column_name.into(),
            value: value.into(),
        }
    }
}

/// Receiver of backing-row notifications.
pub trait RowSubscriber {
    /// Column values and/or extra data changed ("change" and "restore").
    fn on_row_changed(&self, changes: &[FieldChange]);
    /// Only row metadata changed.
    fn on_extra_data_changed(&self);
}

/// Queries and notifications the view model needs from the backing store.
pub trait DataSource {
    fn row_state(&self, row_key: RowKey) -> RowState;
    fn is_editable(&self, row_key: RowKey, column_name: &str) -> bool;
    /// Ordered class names for one cell.
    fn class_name_list(&self, row_key: RowKey, column_name: &str) -> Vec<String>;
    fn is_row_span_enabled(&self) -> bool;
    fn get(&self, row_key: RowKey) -> Option<RawRow>;
    /// Current value of one column, if the row has it.
    fn value(&self, row_key: RowKey, column_name: &str) -> Option<CellValue>;
    /// Position of the row in the store, if present.
    fn index_of_row_key(&self, row_key: RowKey) -> Option<usize>;

    fn subscribe(&self, row_key: RowKey, subscriber: Weak<dyn RowSubscriber>) -> SubscriptionId;
    fn unsubscribe(&self, row_key: RowKey, id: SubscriptionId);
}

/// Registration of one subscriber for one row. Deregisters on drop.
pub struct Subscription {
    source: Weak<dyn DataSource>,
    row_key: RowKey,
    id: SubscriptionId,
}

impl Subscription {
    pub fn new(
        source: &Rc<dyn DataSource>,
        row_key: RowKey,
        subscriber: Weak<dyn RowSubscriber>,
    ) -> Self {
        let id = source.subscribe(row_key, subscriber);
        Self {
            source: Rc::downgrade(source),
            row_key,
            id,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(source) = self.source.upgrade() {
            source.unsubscribe(self.row_key, self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("row_key", &self.row_key)
            .field("id", &self.id)
            .finish()
    }
}
