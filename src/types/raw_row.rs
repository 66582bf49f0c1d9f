use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier of a row in the backing store.
pub type RowKey = u64;

/// Raw cell value as held by the backing store.
pub type CellValue = Value;

/// Reserved key carrying the row identifier.
pub const ROW_KEY_FIELD: &str = "rowKey";
/// Reserved key carrying row metadata (spans, flags, classes).
pub const EXTRA_DATA_FIELD: &str = "_extraData";
/// Reserved checkbox-like column whose disabled state follows `isDisabledCheck`.
pub const CHECKBOX_COLUMN: &str = "_button";
/// Reserved row-number column. Never editable, whatever its edit type.
pub const ROW_NUMBER_COLUMN: &str = "_number";

/// Returns true for keys that never project into a cell.
#[must_use]
pub fn is_reserved_field(name: &str) -> bool {
    name == ROW_KEY_FIELD || name == EXTRA_DATA_FIELD
}

/// A column-keyed row record from the backing store.
///
/// JSON form: `{"rowKey": 1, "name": "a", "_extraData": {...}}`. Every key
/// other than the two reserved ones lands in `columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(rename = "rowKey")]
    pub row_key: RowKey,
    #[serde(
        rename = "_extraData",
        default,
        deserialize_with = "lenient_extra_data",
        skip_serializing_if = "ExtraData::is_empty"
    )]
    pub extra_data: ExtraData,
    #[serde(flatten)]
    pub columns: BTreeMap<String, CellValue>,
}

impl RawRow {
    /// Create a row with no columns and no metadata.
    pub fn new(row_key: RowKey) -> Self {
        Self {
            row_key,
            extra_data: ExtraData::default(),
            columns: BTreeMap::new(),
        }
    }

    /// Builder-style column assignment.
    pub fn with(mut self, column_name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.columns.insert(column_name.into(), value.into());
        self
    }

    /// Builder-style span assignment for one column.
    pub fn with_span(mut self, column_name: impl Into<String>, span: SpanDescriptor) -> Self {
        self.extra_data
            .row_span_data
            .insert(column_name.into(), span);
        self
    }

    /// Parse a JSON array of rows.
    ///
    /// # Errors
    /// Returns an error if the text is not a JSON array of row objects.
    pub fn list_from_json(json: &str) -> crate::error::Result<Vec<RawRow>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn value(&self, column_name: &str) -> Option<&CellValue> {
        self.columns.get(column_name)
    }
}

/// Describes how a row participates in a vertical merge for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanDescriptor {
    #[serde(alias = "mainRowKey")]
    pub owner_row_key: RowKey,
    /// Group size on the owner, 0 on members.
    #[serde(default, alias = "count", deserialize_with = "clamped_span_length")]
    pub span_length: u32,
    #[serde(alias = "isMainRow")]
    pub is_owner: bool,
}

impl SpanDescriptor {
    /// Descriptor of a cell that is not merged with any other row.
    pub fn unmerged(row_key: RowKey) -> Self {
        Self {
            owner_row_key: row_key,
            span_length: 0,
            is_owner: true,
        }
    }

    pub fn owner(row_key: RowKey, span_length: u32) -> Self {
        Self {
            owner_row_key: row_key,
            span_length,
            is_owner: true,
        }
    }

    pub fn member(owner_row_key: RowKey) -> Self {
        Self {
            owner_row_key,
            span_length: 0,
            is_owner: false,
        }
    }
}

/// Row-level state flag stored in the extra data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStateFlag {
    /// Whole row disabled, checkbox included.
    Disabled,
    /// Only the checkbox column is disabled.
    DisabledCheck,
    Checked,
}

/// Class names attached to a row, either row-wide or per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNameData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub row: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub column: BTreeMap<String, Vec<String>>,
}

impl ClassNameData {
    pub fn is_empty(&self) -> bool {
        self.row.is_empty() && self.column.values().all(Vec::is_empty)
    }
}

/// The reserved `_extraData` block of a raw row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtraData {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub row_span_data: BTreeMap<String, SpanDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_state: Option<RowStateFlag>,
    #[serde(skip_serializing_if = "ClassNameData::is_empty")]
    pub class_name: ClassNameData,
}

impl ExtraData {
    pub fn is_empty(&self) -> bool {
        self.row_span_data.is_empty() && self.row_state.is_none() && self.class_name.is_empty()
    }

    /// Build extra data from an arbitrary JSON value.
    ///
    /// Anything that is not an object yields the default. Unreadable entries
    /// are dropped one by one so a single bad span does not discard the rest.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            Value::Null => return Self::default(),
            other => {
                log::debug!("ignoring non-object _extraData: {other}");
                return Self::default();
            }
        };

        let mut extra = Self::default();

        if let Some(Value::Object(spans)) = map.remove("rowSpanData") {
            for (column_name, raw_span) in spans {
                match serde_json::from_value::<SpanDescriptor>(raw_span) {
                    Ok(span) => {
                        extra.row_span_data.insert(column_name, span);
                    }
                    Err(e) => log::debug!("dropping malformed rowSpanData for {column_name}: {e}"),
                }
            }
        }

        if let Some(state) = map.remove("rowState") {
            extra.row_state = serde_json::from_value(state).ok().flatten();
        }

        if let Some(classes) = map.remove("className") {
            extra.class_name = serde_json::from_value(classes).unwrap_or_default();
        }

        extra
    }
}

fn lenient_extra_data<'de, D>(deserializer: D) -> Result<ExtraData, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(ExtraData::from_value(value))
}

// Legacy data stores negative offsets on member rows.
fn clamped_span_length<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
}

/// Derived row-level state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowState {
    pub is_disabled: bool,
    /// Overrides `is_disabled` for the checkbox column.
    pub is_disabled_check: bool,
    pub is_checked: bool,
}

impl From<Option<RowStateFlag>> for RowState {
    fn from(flag: Option<RowStateFlag>) -> Self {
        match flag {
            Some(RowStateFlag::Disabled) => Self {
                is_disabled: true,
                is_disabled_check: true,
                is_checked: false,
            },
            Some(RowStateFlag::DisabledCheck) => Self {
                is_disabled_check: true,
                ..Self::default()
            },
            Some(RowStateFlag::Checked) => Self {
                is_checked: true,
                ..Self::default()
            },
            None => Self::default(),
        }
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
    use serde_json::json;

    #[test]
    fn test_parse_row_with_span_data() {
        let row: RawRow = serde_json::from_value(json!({
            "rowKey": 2,
            "name": "a",
            "_extraData": {
                "rowSpanData": {
                    "name": {"ownerRowKey": 1, "spanLength": 0, "isOwner": false}
                }
            }
        }))
        .unwrap();

        assert_eq!(row.row_key, 2);
        assert_eq!(row.value("name"), Some(&json!("a")));
        assert_eq!(row.columns.len(), 1);
        assert_eq!(
            row.extra_data.row_span_data.get("name"),
            Some(&SpanDescriptor::member(1))
        );
    }

    #[test]
    fn test_legacy_span_field_names() {
        let span: SpanDescriptor =
            serde_json::from_value(json!({"mainRowKey": 3, "count": -2, "isMainRow": false}))
                .unwrap();
        assert_eq!(span, SpanDescriptor::member(3));
    }

    #[test]
    fn test_member_span_length_may_be_omitted() {
        let span: SpanDescriptor =
            serde_json::from_value(json!({"ownerRowKey": 7, "isOwner": false})).unwrap();
        assert_eq!(span.span_length, 0);
    }

    #[test]
    fn test_malformed_extra_data_defaults() {
        for extra in [json!("oops"), json!(42), json!(null), json!([1, 2])] {
            let row: RawRow =
                serde_json::from_value(json!({"rowKey": 1, "c": 1, "_extraData": extra})).unwrap();
            assert!(row.extra_data.is_empty());
        }
    }

    #[test]
    fn test_malformed_span_entry_is_dropped_alone() {
        let row: RawRow = serde_json::from_value(json!({
            "rowKey": 1,
            "_extraData": {
                "rowSpanData": {
                    "a": {"ownerRowKey": "x"},
                    "b": {"ownerRowKey": 1, "spanLength": 3, "isOwner": true}
                },
                "rowState": "DISABLED"
            }
        }))
        .unwrap();

        assert!(!row.extra_data.row_span_data.contains_key("a"));
        assert_eq!(
            row.extra_data.row_span_data.get("b"),
            Some(&SpanDescriptor::owner(1, 3))
        );
        assert_eq!(row.extra_data.row_state, Some(RowStateFlag::Disabled));
    }

    #[test]
    fn test_row_state_from_flag() {
        let disabled = RowState::from(Some(RowStateFlag::Disabled));
        assert!(disabled.is_disabled && disabled.is_disabled_check);

        let check_only = RowState::from(Some(RowStateFlag::DisabledCheck));
        assert!(!check_only.is_disabled && check_only.is_disabled_check);

        assert_eq!(RowState::from(None), RowState::default());
    }

    #[test]
    fn test_serialize_skips_empty_extra_data() {
        let row = RawRow::new(5).with("qty", 3);
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({"rowKey": 5, "qty": 3})
        );
    }
}
