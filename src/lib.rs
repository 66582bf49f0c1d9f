//! cellsync - row-to-cell projection and synchronization for grid widgets
//!
//! Turns column-keyed row records from a backing store into per-cell view
//! records and keeps them in step with the store:
//! - Cold projection of a raw row into cells (value, span, editable, disabled, classes)
//! - Patch-based cell updates with per-call change tracking
//! - Row state sync that writes merged cells through their owner row
//! - Store notifications replayed as cell updates
//!
//! Everything is single-threaded and synchronous. Observers may re-enter the
//! store or any row while being notified.
//!
//! # Usage
//!
//! ```rust
//! use std::rc::Rc;
//! use cellsync::{ColumnModel, ColumnModelList, DataStore, EditType, GridConfig, RawRow, RowList};
//!
//! let columns = Rc::new(ColumnModelList::new(vec![
//!     ColumnModel::new("name").editable(EditType::Text),
//! ]));
//! let config = GridConfig::default();
//! let store = Rc::new(DataStore::new(Rc::clone(&columns), &config));
//! store.load(vec![RawRow::new(1).with("name", "a")]).unwrap();
//!
//! let source = Rc::clone(&store);
//! let list = RowList::new(source, columns, config);
//! list.reset(&store.row_keys());
//!
//! store.set_value(1, "name", "b").unwrap();
//! let cell = list.get(1).and_then(|row| row.cell("name")).unwrap();
//! assert_eq!(cell.value, "b");
//! ```

pub mod columns;
pub mod config;
pub mod error;
pub mod projector;
pub mod propagator;
pub mod row;
pub mod row_list;
pub mod source;
pub mod span;
pub mod store;
pub mod types;

pub use columns::{ColumnModel, ColumnModelList, ColumnRegistry, EditType};
pub use config::{DanglingSpanPolicy, GridConfig};
pub use error::{GridError, Result};
pub use projector::project;
pub use row::{DanglingSpan, RenderRow, RowObserver, SyncOutcome, ValueChange};
pub use row_list::RowList;
pub use source::{DataSource, FieldChange, RowSubscriber, Subscription};
pub use span::resolve_span;
pub use store::DataStore;

pub use types::*;

/// Get the library version
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
