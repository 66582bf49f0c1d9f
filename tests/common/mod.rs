//! Shared fixtures for the integration tests.
//!
//! `Grid` wires a column list, a `DataStore` and a `RowList` together with an
//! `EventLog` observer, the way an embedding widget would.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::cell::RefCell;
use std::rc::Rc;

use cellsync::{
    Cell, CellField, ColumnModel, ColumnModelList, DataStore, EditType, GridConfig, RawRow,
    RowKey, RowList, RowObserver, SpanDescriptor, ValueChange,
};

/// Observer recording every committed change.
#[derive(Default)]
pub struct EventLog {
    pub cells: RefCell<Vec<(RowKey, String, Vec<CellField>)>>,
    pub values: RefCell<Vec<ValueChange>>,
}

impl EventLog {
    pub fn cell_events(&self) -> Vec<(RowKey, String, Vec<CellField>)> {
        self.cells.borrow().clone()
    }

    pub fn value_events(&self) -> Vec<ValueChange> {
        self.values.borrow().clone()
    }

    pub fn clear(&self) {
        self.cells.borrow_mut().clear();
        self.values.borrow_mut().clear();
    }
}

impl RowObserver for EventLog {
    fn cell_changed(&self, row_key: RowKey, cell: &Cell) {
        self.cells.borrow_mut().push((
            row_key,
            cell.column_name.clone(),
            cell.changed_fields.clone(),
        ));
    }

    fn value_changed(&self, change: &ValueChange) {
        self.values.borrow_mut().push(change.clone());
    }
}

pub struct Grid {
    pub columns: Rc<ColumnModelList>,
    pub store: Rc<DataStore>,
    pub list: Rc<RowList>,
    pub log: Rc<EventLog>,
}

impl Grid {
    /// Stored cell of a listed row.
    pub fn cell(&self, row_key: RowKey, column_name: &str) -> Cell {
        self.list
            .get(row_key)
            .unwrap_or_else(|| panic!("row {row_key} not listed"))
            .cell(column_name)
            .unwrap_or_else(|| panic!("row {row_key} has no {column_name} cell"))
    }

    pub fn display_cell(&self, row_key: RowKey, column_name: &str) -> Cell {
        self.list.display_cell(row_key, column_name).unwrap()
    }
}

/// `_button` (checkbox), `name` and `price` (text), `id` (read-only).
pub fn default_columns() -> Vec<ColumnModel> {
    vec![
        ColumnModel::new("_button").editable(EditType::Checkbox),
        ColumnModel::new("name").editable(EditType::Text),
        ColumnModel::new("price").editable(EditType::Text),
        ColumnModel::new("id"),
    ]
}

pub fn grid(rows: Vec<RawRow>) -> Grid {
    grid_with(default_columns(), rows, GridConfig::default())
}

pub fn grid_with(columns: Vec<ColumnModel>, rows: Vec<RawRow>, config: GridConfig) -> Grid {
    let columns = Rc::new(ColumnModelList::new(columns));
    let store = Rc::new(DataStore::new(Rc::clone(&columns), &config));
    store.load(rows).unwrap();

    let source = Rc::clone(&store);
    let registry = Rc::clone(&columns);
    let list = RowList::new(source, registry, config);
    let log = Rc::new(EventLog::default());
    list.set_observer(Some(Rc::clone(&log) as Rc<dyn RowObserver>));
    list.reset(&store.row_keys());

    Grid {
        columns,
        store,
        list,
        log,
    }
}

/// Plain row with every default column filled in.
pub fn plain_row(row_key: RowKey) -> RawRow {
    RawRow::new(row_key)
        .with("_button", false)
        .with("name", format!("row{row_key}"))
        .with("price", row_key * 10)
        .with("id", row_key)
}

/// Rows 1..=count with `name` merged over all of them, owned by row 1.
pub fn merged_rows(count: u32) -> Vec<RawRow> {
    (1..=RowKey::from(count))
        .map(|row_key| {
            let span = if row_key == 1 {
                SpanDescriptor::owner(1, count)
            } else {
                SpanDescriptor::member(1)
            };
            plain_row(row_key).with("name", "group").with_span("name", span)
        })
        .collect()
}
