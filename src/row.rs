//! View-model row: the projected cells of one backing row.
//!
//! Cells are replaced wholesale by the cold projection path and are
//! otherwise written only through [`RenderRow::set_cell`]. No `RefCell`
//! borrow is held while observers run, so an observer may re-enter any row.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::columns::ColumnRegistry;
use crate::config::{DanglingSpanPolicy, GridConfig};
use crate::projector::{self, DerivedState};
use crate::row_list::RowList;
use crate::source::{DataSource, RowSubscriber, Subscription};
use crate::types::{Cell, CellField, CellPatch, CellValue, RawRow, RowKey};

/// Notification that a committed patch changed a cell's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
    pub row_key: RowKey,
    pub column_name: String,
    /// Position of the row in the backing store at the time of the change.
    pub row_index: Option<usize>,
}

/// Receiver of committed cell changes (renderer, relation engine).
pub trait RowObserver {
    /// Any committed patch; `cell.changed_fields` lists what changed.
    fn cell_changed(&self, _row_key: RowKey, _cell: &Cell) {}
    /// A committed patch that included `value`.
    fn value_changed(&self, _change: &ValueChange) {}
}

/// A merged cell whose owner row is not in the row list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingSpan {
    pub row_key: RowKey,
    pub column_name: String,
    pub owner_row_key: RowKey,
}

/// What one [`RenderRow::sync_row_state`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The row had no live collection and nothing was done.
    pub detached: bool,
    /// Cells whose stored record changed, as `(row_key, column_name)`.
    pub updated: Vec<(RowKey, String)>,
    pub dangling: Vec<DanglingSpan>,
}

pub struct RenderRow {
    row_key: RowKey,
    cells: RefCell<BTreeMap<String, Cell>>,
    source: Rc<dyn DataSource>,
    columns: Rc<dyn ColumnRegistry>,
    config: Rc<GridConfig>,
    collection: RefCell<Weak<RowList>>,
    observer: RefCell<Option<Rc<dyn RowObserver>>>,
    subscription: RefCell<Option<Subscription>>,
}

impl RenderRow {
    /// Project `raw` and subscribe to its backing row.
    ///
    /// The row starts detached; [`RowList`] attaches the rows it creates.
    pub fn new(
        raw: &RawRow,
        source: Rc<dyn DataSource>,
        columns: Rc<dyn ColumnRegistry>,
        config: Rc<GridConfig>,
    ) -> Rc<Self> {
        let cells = projector::project(raw, source.as_ref(), &config);
        Rc::new_cyclic(|weak: &Weak<RenderRow>| {
            let weak_self: Weak<RenderRow> = Weak::clone(weak);
            let subscriber: Weak<dyn RowSubscriber> = weak_self;
            let subscription = Subscription::new(&source, raw.row_key, subscriber);
            Self {
                row_key: raw.row_key,
                cells: RefCell::new(cells),
                source,
                columns,
                config,
                collection: RefCell::new(Weak::new()),
                observer: RefCell::new(None),
                subscription: RefCell::new(Some(subscription)),
            }
        })
    }

    pub fn row_key(&self) -> RowKey {
        self.row_key
    }

    pub fn cell(&self, column_name: &str) -> Option<Cell> {
        self.cells.borrow().get(column_name).cloned()
    }

    pub fn has_cell(&self, column_name: &str) -> bool {
        self.cells.borrow().contains_key(column_name)
    }

    /// All cells, ordered by column name.
    pub fn cells(&self) -> Vec<Cell> {
        self.cells.borrow().values().cloned().collect()
    }

    pub fn is_attached(&self) -> bool {
        self.collection.borrow().strong_count() > 0
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    pub fn set_observer(&self, observer: Option<Rc<dyn RowObserver>>) {
        *self.observer.borrow_mut() = observer;
    }

    pub(crate) fn attach(&self, collection: Weak<RowList>) {
        *self.collection.borrow_mut() = collection;
    }

    /// Leave the collection and stop listening to the store.
    pub(crate) fn detach(&self) {
        *self.collection.borrow_mut() = Weak::new();
        let subscription = self.subscription.borrow_mut().take();
        drop(subscription);
    }

    /// Replace every cell with a fresh projection of `raw`.
    pub fn parse(&self, raw: &RawRow) {
        let cells = projector::project(raw, self.source.as_ref(), &self.config);
        *self.cells.borrow_mut() = cells;
    }

    /// Re-project from the store's current record. Returns false if the
    /// store no longer has the row.
    pub fn reparse(&self) -> bool {
        match self.source.get(self.row_key) {
            Some(raw) => {
                self.parse(&raw);
                true
            }
            None => false,
        }
    }

    /// The store's value for one column of this row.
    pub(crate) fn current_value(&self, column_name: &str) -> Option<CellValue> {
        self.source.value(self.row_key, column_name)
    }

    /// Apply `patch` to one cell and return the fields it changed.
    ///
    /// Unprojected columns are ignored. Nothing is stored and nobody is
    /// notified unless at least one field differs. `changed_fields` on the
    /// stored cell covers this call only.
    pub fn set_cell(&self, column_name: &str, patch: CellPatch) -> Vec<CellField> {
        let committed = {
            let mut cells = self.cells.borrow_mut();
            let Some(current) = cells.get(column_name) else {
                return Vec::new();
            };
            let mut next = current.clone();
            let changed = patch.apply_to(&mut next);
            if changed.is_empty() {
                return Vec::new();
            }
            next.changed_fields = changed;
            cells.insert(column_name.to_string(), next.clone());
            next
        };

        let observer = self.observer.borrow().clone();
        if let Some(observer) = observer {
            observer.cell_changed(self.row_key, &committed);
            if committed.is_changed(CellField::Value) {
                let change = ValueChange {
                    row_key: self.row_key,
                    column_name: column_name.to_string(),
                    row_index: self.source.index_of_row_key(self.row_key),
                };
                observer.value_changed(&change);
            }
        }

        committed.changed_fields
    }

    /// Recompute editability, disabled state and classes of every visible
    /// cell from the store, writing merged cells through their owner row.
    pub fn sync_row_state(&self) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        let Some(collection) = self.collection.borrow().upgrade() else {
            log::debug!("row {} is detached, skipping state sync", self.row_key);
            outcome.detached = true;
            return outcome;
        };

        let span_enabled = self.source.is_row_span_enabled();

        for column in self.columns.visible_columns() {
            let column_name = column.column_name.as_str();
            let Some(span) = self.cells.borrow().get(column_name).map(Cell::span) else {
                continue;
            };

            // Read per column: an observer of an earlier column may have
            // changed the row state already.
            let row_state = self.source.row_state(self.row_key);
            let patch = DerivedState::resolve(
                self.source.as_ref(),
                &self.config,
                self.row_key,
                row_state,
                column_name,
            )
            .into_patch();

            let owner = if span_enabled && !span.is_owner {
                match collection.get(span.owner_row_key) {
                    Some(owner) => Some(owner),
                    None => {
                        log::warn!(
                            "row {} column {column_name}: owner row {} is not in the row list ({:?})",
                            self.row_key,
                            span.owner_row_key,
                            self.config.dangling_span
                        );
                        outcome.dangling.push(DanglingSpan {
                            row_key: self.row_key,
                            column_name: column_name.to_string(),
                            owner_row_key: span.owner_row_key,
                        });
                        match self.config.dangling_span {
                            DanglingSpanPolicy::Skip => continue,
                            DanglingSpanPolicy::ApplyToSelf => None,
                        }
                    }
                }
            } else {
                None
            };

            let (target_key, changed) = match owner {
                Some(owner) => (owner.row_key, owner.set_cell(column_name, patch)),
                None => (self.row_key, self.set_cell(column_name, patch)),
            };
            if !changed.is_empty() {
                outcome.updated.push((target_key, column_name.to_string()));
            }
        }

        outcome
    }
}

impl std::fmt::Debug for RenderRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderRow")
            .field("row_key", &self.row_key)
            .field("cells", &self.cells.borrow())
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}
