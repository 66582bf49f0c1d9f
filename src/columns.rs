//! Column definitions and the visible-column registry.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

/// Editor kind of a column. `Normal` columns are read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditType {
    #[default]
    Normal,
    Text,
    TextConvertible,
    Select,
    Checkbox,
    Radio,
    Password,
}

/// One column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnModel {
    pub column_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "isHidden")]
    pub hidden: bool,
    #[serde(default)]
    pub edit_type: EditType,
}

impl ColumnModel {
    pub fn new(column_name: impl Into<String>) -> Self {
        let column_name = column_name.into();
        Self {
            title: column_name.clone(),
            column_name,
            hidden: false,
            edit_type: EditType::Normal,
        }
    }

    pub fn editable(mut self, edit_type: EditType) -> Self {
        self.edit_type = edit_type;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Source of the columns currently on screen, in display order.
pub trait ColumnRegistry {
    fn visible_columns(&self) -> Vec<ColumnModel>;
}

/// Ordered column definitions with runtime hide/show.
#[derive(Debug, Default)]
pub struct ColumnModelList {
    columns: RefCell<Vec<ColumnModel>>,
}

impl ColumnModelList {
    pub fn new(columns: Vec<ColumnModel>) -> Self {
        Self {
            columns: RefCell::new(columns),
        }
    }

    pub fn get(&self, column_name: &str) -> Option<ColumnModel> {
        self.columns
            .borrow()
            .iter()
            .find(|c| c.column_name == column_name)
            .cloned()
    }

    pub fn edit_type(&self, column_name: &str) -> Option<EditType> {
        self.get(column_name).map(|c| c.edit_type)
    }

    /// Show or hide a column. Returns false for unknown columns.
    pub fn set_hidden(&self, column_name: &str, hidden: bool) -> bool {
        let mut columns = self.columns.borrow_mut();
        match columns.iter_mut().find(|c| c.column_name == column_name) {
            Some(column) => {
                column.hidden = hidden;
                true
            }
            None => false,
        }
    }
}

impl ColumnRegistry for ColumnModelList {
    fn visible_columns(&self) -> Vec<ColumnModel> {
        self.columns
            .borrow()
            .iter()
            .filter(|c| !c.hidden)
            .cloned()
            .collect()
    }
}
