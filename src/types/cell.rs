use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CellValue, RowKey, SpanDescriptor};

/// A display cell derived from one raw row and one visible column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row_key: RowKey,
    pub column_name: String,
    pub value: CellValue,

    // Rendering properties
    /// Number of merged rows on the owner, 0 otherwise.
    pub span_length: u32,
    pub is_owner: bool,
    pub owner_row_key: RowKey,

    // Change attribute properties
    pub is_editable: bool,
    pub is_disabled: bool,
    /// Ordered and duplicate-free
    pub class_names: Vec<String>,
    pub option_list: Vec<ListItem>,

    /// Fields mutated by the most recent patch on this record.
    pub changed_fields: Vec<CellField>,
}

impl Cell {
    /// Span descriptor this cell was projected with.
    pub fn span(&self) -> SpanDescriptor {
        SpanDescriptor {
            owner_row_key: self.owner_row_key,
            span_length: self.span_length,
            is_owner: self.is_owner,
        }
    }

    /// Class names joined with spaces, as a renderer writes them.
    pub fn class_name(&self) -> String {
        self.class_names.join(" ")
    }

    pub fn is_changed(&self, field: CellField) -> bool {
        self.changed_fields.contains(&field)
    }
}

/// Entry of a cell's option list (select/radio/checkbox editors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    pub value: CellValue,
}

impl ListItem {
    pub fn new(text: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// Patchable cell fields, in the order a patch applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellField {
    Value,
    IsEditable,
    IsDisabled,
    ClassNames,
    OptionList,
}

impl CellField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::IsEditable => "isEditable",
            Self::IsDisabled => "isDisabled",
            Self::ClassNames => "classNames",
            Self::OptionList => "optionList",
        }
    }
}

impl fmt::Display for CellField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
