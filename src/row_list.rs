//! The collection of view rows currently in the grid.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::columns::ColumnRegistry;
use crate::config::GridConfig;
use crate::row::{RenderRow, RowObserver};
use crate::source::DataSource;
use crate::types::{Cell, RawRow, RowKey};

/// View rows keyed by row key, in display order.
///
/// Rows created here hold a weak reference back to the list so merged cells
/// can be redirected to their owner row.
pub struct RowList {
    this: Weak<RowList>,
    source: Rc<dyn DataSource>,
    columns: Rc<dyn ColumnRegistry>,
    config: Rc<GridConfig>,
    rows: RefCell<HashMap<RowKey, Rc<RenderRow>>>,
    order: RefCell<Vec<RowKey>>,
    observer: RefCell<Option<Rc<dyn RowObserver>>>,
}

impl RowList {
    pub fn new(
        source: Rc<dyn DataSource>,
        columns: Rc<dyn ColumnRegistry>,
        config: GridConfig,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: Weak::clone(this),
            source,
            columns,
            config: Rc::new(config),
            rows: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
            observer: RefCell::new(None),
        })
    }

    /// Observer for every current and future row.
    pub fn set_observer(&self, observer: Option<Rc<dyn RowObserver>>) {
        *self.observer.borrow_mut() = observer.clone();
        for row in self.rows() {
            row.set_observer(observer.clone());
        }
    }

    /// Replace the whole list with rows built from the store.
    ///
    /// Keys the store does not know are skipped, as are repeated keys.
    /// Returns the number of rows built.
    pub fn reset(&self, row_keys: &[RowKey]) -> usize {
        let old = {
            self.order.borrow_mut().clear();
            std::mem::take(&mut *self.rows.borrow_mut())
        };
        for row in old.into_values() {
            row.detach();
        }

        let mut seen = HashSet::new();
        let mut built = Vec::with_capacity(row_keys.len());
        for &row_key in row_keys {
            if !seen.insert(row_key) {
                continue;
            }
            match self.source.get(row_key) {
                Some(raw) => built.push(self.build_row(&raw)),
                None => log::debug!("row {row_key} is not in the store, not adding it"),
            }
        }

        let count = built.len();
        let mut rows = self.rows.borrow_mut();
        let mut order = self.order.borrow_mut();
        for row in built {
            order.push(row.row_key());
            rows.insert(row.row_key(), row);
        }
        log::debug!("row list reset with {count} rows");
        count
    }

    /// Add one row at the end. Returns false if it is already listed or
    /// unknown to the store.
    pub fn append(&self, row_key: RowKey) -> bool {
        if self.contains(row_key) {
            return false;
        }
        let Some(raw) = self.source.get(row_key) else {
            return false;
        };
        let row = self.build_row(&raw);
        self.rows.borrow_mut().insert(row_key, row);
        self.order.borrow_mut().push(row_key);
        true
    }

    /// Take a row out of the list. The row stops listening to the store.
    pub fn remove(&self, row_key: RowKey) -> Option<Rc<RenderRow>> {
        let row = self.rows.borrow_mut().remove(&row_key)?;
        self.order.borrow_mut().retain(|&key| key != row_key);
        row.detach();
        Some(row)
    }

    pub fn get(&self, row_key: RowKey) -> Option<Rc<RenderRow>> {
        self.rows.borrow().get(&row_key).map(Rc::clone)
    }

    /// Cell as it displays: a merged member shows its owner's editable,
    /// disabled and class state, since only the owner's record is written.
    pub fn display_cell(&self, row_key: RowKey, column_name: &str) -> Option<Cell> {
        let mut cell = self.get(row_key)?.cell(column_name)?;
        if cell.is_owner || !self.source.is_row_span_enabled() {
            return Some(cell);
        }
        if let Some(owner) = self
            .get(cell.owner_row_key)
            .and_then(|row| row.cell(column_name))
        {
            cell.is_editable = owner.is_editable;
            cell.is_disabled = owner.is_disabled;
            cell.class_names = owner.class_names;
        }
        Some(cell)
    }

    pub fn contains(&self, row_key: RowKey) -> bool {
        self.rows.borrow().contains_key(&row_key)
    }

    pub fn row_keys(&self) -> Vec<RowKey> {
        self.order.borrow().clone()
    }

    /// Rows in display order.
    pub fn rows(&self) -> Vec<Rc<RenderRow>> {
        let rows = self.rows.borrow();
        self.order
            .borrow()
            .iter()
            .filter_map(|key| rows.get(key).map(Rc::clone))
            .collect()
    }

    /// Re-project one row from the store (cold path).
    pub fn reparse(&self, row_key: RowKey) -> bool {
        self.get(row_key).is_some_and(|row| row.reparse())
    }

    /// Re-project every row, e.g. after spans were regrouped or toggled.
    pub fn reparse_all(&self) {
        for row in self.rows() {
            if !row.reparse() {
                log::debug!("row {} vanished from the store", row.row_key());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    fn build_row(&self, raw: &RawRow) -> Rc<RenderRow> {
        let row = RenderRow::new(
            raw,
            Rc::clone(&self.source),
            Rc::clone(&self.columns),
            Rc::clone(&self.config),
        );
        row.attach(Weak::clone(&self.this));
        row.set_observer(self.observer.borrow().clone());
        row
    }
}

impl std::fmt::Debug for RowList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowList")
            .field("row_keys", &self.order.borrow())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
