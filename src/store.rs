//! In-memory backing store.
//!
//! `DataStore` owns the raw rows and is the source of truth the view model
//! projects from. Every mutation computes its effect under a short borrow,
//! releases it, and only then notifies subscribers, so a subscriber may call
//! back into the store while being notified.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::columns::{ColumnModelList, EditType};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::source::{DataSource, FieldChange, RowSubscriber, SubscriptionId};
use crate::types::{
    is_reserved_field, values_equal, CellValue, ExtraData, RawRow, RowKey, RowState,
    RowStateFlag, SpanDescriptor, ROW_NUMBER_COLUMN,
};

/// Class added to cells that accept edits.
pub const EDITABLE_CLASS: &str = "editable";
/// Class added to disabled cells.
pub const DISABLED_CLASS: &str = "disabled";

type SubscriberList = Vec<(SubscriptionId, Weak<dyn RowSubscriber>)>;

#[derive(Default)]
struct StoreInner {
    rows: Vec<RawRow>,
    index: HashMap<RowKey, usize>,
    /// Rows as loaded, for `restore`.
    originals: HashMap<RowKey, RawRow>,
    row_span_enabled: bool,
    subscribers: HashMap<RowKey, SubscriberList>,
    next_subscription: SubscriptionId,
}

impl StoreInner {
    fn rebuild_index(&mut self) {
        self.index = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.row_key, i))
            .collect();
    }

    fn position(&self, row_key: RowKey) -> Result<usize> {
        self.index
            .get(&row_key)
            .copied()
            .ok_or(GridError::RowNotFound(row_key))
    }

    fn row(&self, row_key: RowKey) -> Option<&RawRow> {
        self.index.get(&row_key).and_then(|&i| self.rows.get(i))
    }

    fn row_mut(&mut self, row_key: RowKey) -> Result<&mut RawRow> {
        let position = self.position(row_key)?;
        self.rows
            .get_mut(position)
            .ok_or(GridError::RowNotFound(row_key))
    }
}

/// The in-memory backing store.
pub struct DataStore {
    columns: Rc<ColumnModelList>,
    checkbox_column: String,
    inner: RefCell<StoreInner>,
}

impl DataStore {
    pub fn new(columns: Rc<ColumnModelList>, config: &GridConfig) -> Self {
        Self {
            columns,
            checkbox_column: config.checkbox_column.clone(),
            inner: RefCell::new(StoreInner {
                row_span_enabled: config.row_span_enabled,
                ..StoreInner::default()
            }),
        }
    }

    /// Replace all rows. The loaded rows become the `restore` baseline.
    ///
    /// # Errors
    /// Returns `DuplicateRowKey` if two rows share a key; the store is left
    /// unchanged in that case.
    pub fn load(&self, rows: Vec<RawRow>) -> Result<()> {
        let mut seen = HashSet::with_capacity(rows.len());
        if let Some(dup) = rows.iter().find(|row| !seen.insert(row.row_key)) {
            return Err(GridError::DuplicateRowKey(dup.row_key));
        }

        let mut inner = self.inner.borrow_mut();
        inner.originals = rows.iter().map(|row| (row.row_key, row.clone())).collect();
        inner.rows = rows;
        inner.rebuild_index();
        log::debug!("loaded {} rows", inner.rows.len());
        Ok(())
    }

    /// Add one row at the end.
    ///
    /// # Errors
    /// Returns `DuplicateRowKey` if the key is already present.
    pub fn append(&self, row: RawRow) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.index.contains_key(&row.row_key) {
            return Err(GridError::DuplicateRowKey(row.row_key));
        }
        let position = inner.rows.len();
        inner.index.insert(row.row_key, position);
        inner.originals.insert(row.row_key, row.clone());
        inner.rows.push(row);
        Ok(())
    }

    /// Remove a row and forget its subscribers.
    ///
    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn remove(&self, row_key: RowKey) -> Result<RawRow> {
        let mut inner = self.inner.borrow_mut();
        let position = inner.position(row_key)?;
        let row = inner.rows.remove(position);
        inner.rebuild_index();
        inner.originals.remove(&row_key);
        inner.subscribers.remove(&row_key);
        Ok(row)
    }

    pub fn row_keys(&self) -> Vec<RowKey> {
        self.inner.borrow().rows.iter().map(|r| r.row_key).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().rows.is_empty()
    }

    /// Set one column value.
    ///
    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn set_value(
        &self,
        row_key: RowKey,
        column_name: &str,
        value: impl Into<CellValue>,
    ) -> Result<()> {
        self.set_values(row_key, [(column_name, value)])
    }

    /// Set several column values and publish one change with the fields that
    /// actually differ.
    ///
    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn set_values<I, K, V>(&self, row_key: RowKey, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let changes = {
            let mut inner = self.inner.borrow_mut();
            let row = inner.row_mut(row_key)?;
            let mut changes = Vec::new();
            for (column_name, value) in values {
                let column_name = column_name.into();
                if is_reserved_field(&column_name) {
                    log::warn!("refusing to overwrite reserved field {column_name} of row {row_key}");
                    continue;
                }
                let value = value.into();
                if row
                    .columns
                    .get(&column_name)
                    .is_some_and(|current| values_equal(current, &value))
                {
                    continue;
                }
                row.columns.insert(column_name.clone(), value.clone());
                changes.push(FieldChange::Column { column_name, value });
            }
            changes
        };

        if !changes.is_empty() {
            self.publish_changes(row_key, &changes);
        }
        Ok(())
    }

    /// Replace the whole extra data block.
    ///
    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn set_extra_data(&self, row_key: RowKey, extra_data: ExtraData) -> Result<()> {
        self.update_extra_data(row_key, |extra| *extra = extra_data)
            .map(|_| ())
    }

    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn set_row_state(&self, row_key: RowKey, state: Option<RowStateFlag>) -> Result<()> {
        self.update_extra_data(row_key, |extra| extra.row_state = state)
            .map(|_| ())
    }

    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn add_row_class_name(&self, row_key: RowKey, class_name: &str) -> Result<()> {
        self.update_extra_data(row_key, |extra| {
            push_unique(&mut extra.class_name.row, class_name);
        })
        .map(|_| ())
    }

    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn remove_row_class_name(&self, row_key: RowKey, class_name: &str) -> Result<()> {
        self.update_extra_data(row_key, |extra| {
            extra.class_name.row.retain(|c| c != class_name);
        })
        .map(|_| ())
    }

    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn add_cell_class_name(
        &self,
        row_key: RowKey,
        column_name: &str,
        class_name: &str,
    ) -> Result<()> {
        self.update_extra_data(row_key, |extra| {
            let list = extra
                .class_name
                .column
                .entry(column_name.to_string())
                .or_default();
            push_unique(list, class_name);
        })
        .map(|_| ())
    }

    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn remove_cell_class_name(
        &self,
        row_key: RowKey,
        column_name: &str,
        class_name: &str,
    ) -> Result<()> {
        self.update_extra_data(row_key, |extra| {
            if let Some(list) = extra.class_name.column.get_mut(column_name) {
                list.retain(|c| c != class_name);
                if list.is_empty() {
                    extra.class_name.column.remove(column_name);
                }
            }
        })
        .map(|_| ())
    }

    /// Merge `span_length` consecutive rows, starting at the owner, over one
    /// column.
    ///
    /// Groups that overlap the new range are dissolved first, so every row
    /// ends up in at most one group. Each row whose descriptor changed gets
    /// an extra-data notification. Rendered span fields only change when the
    /// view re-projects the rows.
    ///
    /// # Errors
    /// Returns `RowNotFound` for an unknown owner and `InvalidSpan` when the
    /// length is below two or runs past the last row.
    pub fn merge_rows(
        &self,
        column_name: &str,
        owner_row_key: RowKey,
        span_length: u32,
    ) -> Result<()> {
        let length = usize::try_from(span_length).unwrap_or(usize::MAX);
        if length < 2 {
            return Err(invalid_span(column_name, "a merge needs at least two rows"));
        }

        let touched = {
            let mut inner = self.inner.borrow_mut();
            let start = inner.position(owner_row_key)?;
            let offsets: HashMap<RowKey, usize> = inner
                .rows
                .iter()
                .skip(start)
                .take(length)
                .enumerate()
                .map(|(offset, row)| (row.row_key, offset))
                .collect();
            if offsets.len() < length {
                return Err(invalid_span(column_name, "span runs past the last row"));
            }

            let mut dissolved: BTreeSet<RowKey> = offsets.keys().copied().collect();
            for row in inner.rows.iter().skip(start).take(length) {
                if let Some(span) = row.extra_data.row_span_data.get(column_name) {
                    dissolved.insert(span.owner_row_key);
                }
            }

            let mut touched = Vec::new();
            for row in &mut inner.rows {
                let current = row.extra_data.row_span_data.get(column_name).copied();
                let next = match offsets.get(&row.row_key) {
                    Some(0) => Some(SpanDescriptor::owner(owner_row_key, span_length)),
                    Some(_) => Some(SpanDescriptor::member(owner_row_key)),
                    None => current.filter(|span| !dissolved.contains(&span.owner_row_key)),
                };
                if current != next {
                    set_span(&mut row.extra_data, column_name, next);
                    touched.push(row.row_key);
                }
            }
            touched
        };

        log::debug!(
            "merged {span_length} rows of {column_name} under {owner_row_key}, {} rows touched",
            touched.len()
        );
        for row_key in touched {
            self.publish_extra_data(row_key);
        }
        Ok(())
    }

    /// Dissolve the group owned by `owner_row_key` over one column.
    ///
    /// # Errors
    /// Returns `RowNotFound` for an unknown owner.
    pub fn unmerge_rows(&self, column_name: &str, owner_row_key: RowKey) -> Result<()> {
        let touched = {
            let mut inner = self.inner.borrow_mut();
            inner.position(owner_row_key)?;
            let mut touched = Vec::new();
            for row in &mut inner.rows {
                let in_group = row
                    .extra_data
                    .row_span_data
                    .get(column_name)
                    .is_some_and(|span| span.owner_row_key == owner_row_key);
                if in_group {
                    set_span(&mut row.extra_data, column_name, None);
                    touched.push(row.row_key);
                }
            }
            touched
        };

        for row_key in touched {
            self.publish_extra_data(row_key);
        }
        Ok(())
    }

    /// Toggle span support. Rows keep their descriptors; the view applies
    /// the new setting on its next projection.
    pub fn set_row_span_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().row_span_enabled = enabled;
    }

    /// Reset a row to its loaded state and publish what that changed.
    ///
    /// Columns that did not exist at load time are removed and published
    /// as `null`.
    ///
    /// # Errors
    /// Returns `RowNotFound` for unknown keys.
    pub fn restore(&self, row_key: RowKey) -> Result<()> {
        let changes = {
            let mut inner = self.inner.borrow_mut();
            let original = inner
                .originals
                .get(&row_key)
                .cloned()
                .ok_or(GridError::RowNotFound(row_key))?;
            let row = inner.row_mut(row_key)?;

            let mut changes: Vec<FieldChange> = original
                .columns
                .iter()
                .filter(|(name, value)| {
                    row.columns
                        .get(*name)
                        .map_or(true, |current| !values_equal(current, value))
                })
                .map(|(name, value)| FieldChange::column(name.as_str(), value.clone()))
                .collect();
            changes.extend(
                row.columns
                    .keys()
                    .filter(|name| !original.columns.contains_key(*name))
                    .map(|name| FieldChange::column(name.as_str(), CellValue::Null)),
            );
            if row.extra_data != original.extra_data {
                changes.push(FieldChange::ExtraData);
            }

            *row = original;
            changes
        };

        if !changes.is_empty() {
            self.publish_changes(row_key, &changes);
        }
        Ok(())
    }

    /// Disabled state of one cell, honouring the checkbox column override.
    pub fn is_disabled(&self, row_key: RowKey, column_name: &str) -> bool {
        let state = self.row_state(row_key);
        if column_name == self.checkbox_column {
            state.is_disabled_check
        } else {
            state.is_disabled
        }
    }

    fn update_extra_data(
        &self,
        row_key: RowKey,
        update: impl FnOnce(&mut ExtraData),
    ) -> Result<bool> {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let row = inner.row_mut(row_key)?;
            let mut extra = row.extra_data.clone();
            update(&mut extra);
            if extra == row.extra_data {
                false
            } else {
                row.extra_data = extra;
                true
            }
        };

        if changed {
            self.publish_extra_data(row_key);
        }
        Ok(changed)
    }

    fn subscribers_of(&self, row_key: RowKey) -> Vec<Rc<dyn RowSubscriber>> {
        self.inner
            .borrow()
            .subscribers
            .get(&row_key)
            .map(|list| list.iter().filter_map(|(_, s)| s.upgrade()).collect())
            .unwrap_or_default()
    }

    fn publish_changes(&self, row_key: RowKey, changes: &[FieldChange]) {
        let subscribers = self.subscribers_of(row_key);
        log::debug!(
            "row {row_key}: {} field change(s) to {} subscriber(s)",
            changes.len(),
            subscribers.len()
        );
        for subscriber in subscribers {
            subscriber.on_row_changed(changes);
        }
    }

    fn publish_extra_data(&self, row_key: RowKey) {
        for subscriber in self.subscribers_of(row_key) {
            subscriber.on_extra_data_changed();
        }
    }
}

impl DataSource for DataStore {
    fn row_state(&self, row_key: RowKey) -> RowState {
        self.inner
            .borrow()
            .row(row_key)
            .map(|row| RowState::from(row.extra_data.row_state))
            .unwrap_or_default()
    }

    fn is_editable(&self, row_key: RowKey, column_name: &str) -> bool {
        if column_name == ROW_NUMBER_COLUMN {
            return false;
        }
        match self.columns.edit_type(column_name) {
            None | Some(EditType::Normal) => false,
            Some(_) => !self.is_disabled(row_key, column_name),
        }
    }

    fn class_name_list(&self, row_key: RowKey, column_name: &str) -> Vec<String> {
        let mut list: Vec<String> = {
            let inner = self.inner.borrow();
            match inner.row(row_key) {
                Some(row) => {
                    let classes = &row.extra_data.class_name;
                    classes
                        .row
                        .iter()
                        .chain(classes.column.get(column_name).into_iter().flatten())
                        .cloned()
                        .collect()
                }
                None => Vec::new(),
            }
        };

        if self.is_editable(row_key, column_name) {
            list.push(EDITABLE_CLASS.to_string());
        }
        if self.is_disabled(row_key, column_name) {
            list.push(DISABLED_CLASS.to_string());
        }

        let mut seen = HashSet::new();
        list.retain(|class| seen.insert(class.clone()));
        list
    }

    fn is_row_span_enabled(&self) -> bool {
        self.inner.borrow().row_span_enabled
    }

    fn get(&self, row_key: RowKey) -> Option<RawRow> {
        self.inner.borrow().row(row_key).cloned()
    }

    fn value(&self, row_key: RowKey, column_name: &str) -> Option<CellValue> {
        self.inner
            .borrow()
            .row(row_key)
            .and_then(|row| row.columns.get(column_name).cloned())
    }

    fn index_of_row_key(&self, row_key: RowKey) -> Option<usize> {
        self.inner.borrow().index.get(&row_key).copied()
    }

    fn subscribe(&self, row_key: RowKey, subscriber: Weak<dyn RowSubscriber>) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_subscription;
        inner.next_subscription += 1;
        inner
            .subscribers
            .entry(row_key)
            .or_default()
            .push((id, subscriber));
        id
    }

    fn unsubscribe(&self, row_key: RowKey, id: SubscriptionId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(list) = inner.subscribers.get_mut(&row_key) {
            list.retain(|(sid, _)| *sid != id);
            if list.is_empty() {
                inner.subscribers.remove(&row_key);
            }
        }
    }
}

fn push_unique(list: &mut Vec<String>, class_name: &str) {
    if !list.iter().any(|c| c == class_name) {
        list.push(class_name.to_string());
    }
}

fn set_span(extra: &mut ExtraData, column_name: &str, span: Option<SpanDescriptor>) {
    match span {
        Some(span) => {
            extra.row_span_data.insert(column_name.to_string(), span);
        }
        None => {
            extra.row_span_data.remove(column_name);
        }
    }
}

fn invalid_span(column_name: &str, reason: &str) -> GridError {
    GridError::InvalidSpan {
        column: column_name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::columns::ColumnModel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl RowSubscriber for Recorder {
        fn on_row_changed(&self, changes: &[FieldChange]) {
            for change in changes {
                let event = match change {
                    FieldChange::Column { column_name, value } => format!("{column_name}={value}"),
                    FieldChange::ExtraData => "extra".to_string(),
                };
                self.events.borrow_mut().push(event);
            }
        }

        fn on_extra_data_changed(&self) {
            self.events.borrow_mut().push("extraDataChanged".to_string());
        }
    }

    fn store() -> DataStore {
        let columns = Rc::new(ColumnModelList::new(vec![
            ColumnModel::new("_button").editable(EditType::Checkbox),
            ColumnModel::new("name").editable(EditType::Text),
            ColumnModel::new("id"),
        ]));
        let store = DataStore::new(columns, &GridConfig::default());
        store
            .load(
                (1..=4)
                    .map(|key| RawRow::new(key).with("name", "a").with("id", key))
                    .collect(),
            )
            .unwrap();
        store
    }

    fn subscribe(store: &DataStore, row_key: RowKey) -> (Rc<Recorder>, SubscriptionId) {
        let recorder = Rc::new(Recorder::default());
        let weak: Weak<dyn RowSubscriber> = Rc::downgrade(&recorder) as Weak<dyn RowSubscriber>;
        let id = store.subscribe(row_key, weak);
        (recorder, id)
    }

    #[test]
    fn test_load_rejects_duplicate_keys() {
        let store = store();
        let err = store
            .load(vec![RawRow::new(1), RawRow::new(1)])
            .unwrap_err();
        assert!(matches!(err, GridError::DuplicateRowKey(1)));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_editable_follows_edit_type_and_disabled_state() {
        let store = store();
        assert!(store.is_editable(1, "name"));
        assert!(!store.is_editable(1, "id"));
        assert!(!store.is_editable(1, "unknown"));

        store
            .set_row_state(1, Some(RowStateFlag::DisabledCheck))
            .unwrap();
        assert!(store.is_editable(1, "name"));
        assert!(!store.is_editable(1, "_button"));

        store.set_row_state(1, Some(RowStateFlag::Disabled)).unwrap();
        assert!(!store.is_editable(1, "name"));
    }

    #[test]
    fn test_row_number_column_is_never_editable() {
        let columns = Rc::new(ColumnModelList::new(vec![
            ColumnModel::new(ROW_NUMBER_COLUMN).editable(EditType::Text),
        ]));
        let store = DataStore::new(columns, &GridConfig::default());
        store
            .load(vec![RawRow::new(1).with(ROW_NUMBER_COLUMN, 1)])
            .unwrap();

        assert!(!store.is_editable(1, ROW_NUMBER_COLUMN));
        assert!(store.class_name_list(1, ROW_NUMBER_COLUMN).is_empty());
    }

    #[test]
    fn test_class_name_list_order_and_dedup() {
        let store = store();
        store.add_row_class_name(2, "highlight").unwrap();
        store.add_cell_class_name(2, "name", "warn").unwrap();
        store.add_cell_class_name(2, "name", "highlight").unwrap();

        assert_eq!(
            store.class_name_list(2, "name"),
            vec!["highlight", "warn", "editable"]
        );

        store.set_row_state(2, Some(RowStateFlag::Disabled)).unwrap();
        assert_eq!(
            store.class_name_list(2, "name"),
            vec!["highlight", "warn", "disabled"]
        );
        assert_eq!(store.class_name_list(2, "id"), vec!["highlight", "disabled"]);

        store.remove_cell_class_name(2, "name", "warn").unwrap();
        store.remove_cell_class_name(2, "name", "highlight").unwrap();
        assert!(store.get(2).unwrap().extra_data.class_name.column.is_empty());
    }

    #[test]
    fn test_set_values_publishes_only_differences() {
        let store = store();
        let (recorder, _) = subscribe(&store, 1);

        store
            .set_values(1, [("name", json!("a")), ("id", json!(10))])
            .unwrap();
        store.set_value(1, "id", 10.0).unwrap();

        assert_eq!(*recorder.events.borrow(), vec!["id=10"]);
        assert_eq!(store.value(1, "id"), Some(json!(10)));
    }

    #[test]
    fn test_reserved_fields_are_not_written() {
        let store = store();
        store.set_value(1, "rowKey", 99).unwrap();
        assert_eq!(store.get(1).unwrap().row_key, 1);
        assert!(store.value(1, "rowKey").is_none());
    }

    #[test]
    fn test_unknown_row() {
        let store = store();
        assert!(matches!(
            store.set_value(9, "name", "x"),
            Err(GridError::RowNotFound(9))
        ));
        assert!(store.get(9).is_none());
        assert_eq!(store.index_of_row_key(9), None);
        assert_eq!(store.row_state(9), RowState::default());
    }

    #[test]
    fn test_extra_data_noop_does_not_publish() {
        let store = store();
        let (recorder, _) = subscribe(&store, 3);

        store.set_row_state(3, None).unwrap();
        assert!(recorder.events.borrow().is_empty());

        store.set_row_state(3, Some(RowStateFlag::Checked)).unwrap();
        assert_eq!(*recorder.events.borrow(), vec!["extraDataChanged"]);
        assert!(store.row_state(3).is_checked);
    }

    #[test]
    fn test_unsubscribe() {
        let store = store();
        let (recorder, id) = subscribe(&store, 1);
        store.unsubscribe(1, id);
        store.set_value(1, "name", "b").unwrap();
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn test_merge_rows_writes_descriptors() {
        let store = store();
        let (member, _) = subscribe(&store, 3);

        store.merge_rows("name", 2, 3).unwrap();

        let spans: Vec<_> = store
            .row_keys()
            .into_iter()
            .map(|key| {
                store
                    .get(key)
                    .unwrap()
                    .extra_data
                    .row_span_data
                    .get("name")
                    .copied()
            })
            .collect();
        assert_eq!(
            spans,
            vec![
                None,
                Some(SpanDescriptor::owner(2, 3)),
                Some(SpanDescriptor::member(2)),
                Some(SpanDescriptor::member(2)),
            ]
        );
        assert_eq!(*member.events.borrow(), vec!["extraDataChanged"]);
    }

    #[test]
    fn test_merge_dissolves_overlapping_group() {
        let store = store();
        store.merge_rows("name", 2, 3).unwrap();
        store.merge_rows("name", 1, 2).unwrap();

        let span = |key| {
            store
                .get(key)
                .unwrap()
                .extra_data
                .row_span_data
                .get("name")
                .copied()
        };
        assert_eq!(span(1), Some(SpanDescriptor::owner(1, 2)));
        assert_eq!(span(2), Some(SpanDescriptor::member(1)));
        assert_eq!(span(3), None);
        assert_eq!(span(4), None);
    }

    #[test]
    fn test_merge_rejects_bad_lengths() {
        let store = store();
        assert!(matches!(
            store.merge_rows("name", 1, 1),
            Err(GridError::InvalidSpan { .. })
        ));
        assert!(matches!(
            store.merge_rows("name", 3, 3),
            Err(GridError::InvalidSpan { .. })
        ));
        assert!(matches!(
            store.merge_rows("name", 8, 2),
            Err(GridError::RowNotFound(8))
        ));
    }

    #[test]
    fn test_unmerge_rows() {
        let store = store();
        store.merge_rows("name", 1, 3).unwrap();
        store.unmerge_rows("name", 1).unwrap();
        assert!(store
            .row_keys()
            .into_iter()
            .all(|key| store.get(key).unwrap().extra_data.is_empty()));
    }

    #[test]
    fn test_restore_publishes_differences() {
        let store = store();
        store.set_value(2, "name", "changed").unwrap();
        store.set_value(2, "note", "new").unwrap();
        store.set_row_state(2, Some(RowStateFlag::Disabled)).unwrap();

        let (recorder, _) = subscribe(&store, 2);
        store.restore(2).unwrap();

        assert_eq!(
            *recorder.events.borrow(),
            vec!["name=\"a\"", "note=null", "extra"]
        );
        assert_eq!(store.get(2).unwrap(), RawRow::new(2).with("name", "a").with("id", 2));
    }

    #[test]
    fn test_remove_reindexes() {
        let store = store();
        let removed = store.remove(2).unwrap();
        assert_eq!(removed.row_key, 2);
        assert_eq!(store.row_keys(), vec![1, 3, 4]);
        assert_eq!(store.index_of_row_key(3), Some(1));
        assert!(store.restore(2).is_err());
    }
}
