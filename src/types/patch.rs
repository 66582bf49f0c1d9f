use serde_json::Value;

use super::{Cell, CellField, CellValue, ListItem};

/// A partial update to one cell.
///
/// Absent fields are left untouched. Present fields are only applied, and
/// only reported as changed, when they differ from the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellPatch {
    pub value: Option<CellValue>,
    pub is_editable: Option<bool>,
    pub is_disabled: Option<bool>,
    pub class_names: Option<Vec<String>>,
    pub option_list: Option<Vec<ListItem>>,
}

impl CellPatch {
    /// Patch carrying only a new value.
    pub fn value(value: impl Into<CellValue>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn editable(mut self, is_editable: bool) -> Self {
        self.is_editable = Some(is_editable);
        self
    }

    pub fn disabled(mut self, is_disabled: bool) -> Self {
        self.is_disabled = Some(is_disabled);
        self
    }

    pub fn class_names<I, S>(mut self, class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_names = Some(class_names.into_iter().map(Into::into).collect());
        self
    }

    pub fn option_list(mut self, option_list: Vec<ListItem>) -> Self {
        self.option_list = Some(option_list);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.is_editable.is_none()
            && self.is_disabled.is_none()
            && self.class_names.is_none()
            && self.option_list.is_none()
    }

    /// Write every differing field into `cell` and list what changed.
    ///
    /// `cell.changed_fields` is not touched here; the caller decides whether
    /// the result is committed.
    pub(crate) fn apply_to(self, cell: &mut Cell) -> Vec<CellField> {
        let mut changed = Vec::new();

        if let Some(value) = self.value {
            if !values_equal(&cell.value, &value) {
                cell.value = value;
                changed.push(CellField::Value);
            }
        }
        if let Some(is_editable) = self.is_editable {
            if cell.is_editable != is_editable {
                cell.is_editable = is_editable;
                changed.push(CellField::IsEditable);
            }
        }
        if let Some(is_disabled) = self.is_disabled {
            if cell.is_disabled != is_disabled {
                cell.is_disabled = is_disabled;
                changed.push(CellField::IsDisabled);
            }
        }
        if let Some(class_names) = self.class_names {
            if cell.class_names != class_names {
                cell.class_names = class_names;
                changed.push(CellField::ClassNames);
            }
        }
        if let Some(option_list) = self.option_list {
            if cell.option_list.len() != option_list.len()
                || cell
                    .option_list
                    .iter()
                    .zip(&option_list)
                    .any(|(a, b)| a.text != b.text || !values_equal(&a.value, &b.value))
            {
                cell.option_list = option_list;
                changed.push(CellField::OptionList);
            }
        }

        changed
    }
}

/// Structural equality where `1` and `1.0` are the same number, as are
/// `0.0` and `-0.0`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x.is_f64() || y.is_f64() {
                match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                }
            } else {
                x == y
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
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
    use test_case::test_case;

    fn cell() -> Cell {
        Cell {
            row_key: 1,
            column_name: "name".into(),
            value: json!("a"),
            span_length: 0,
            is_owner: true,
            owner_row_key: 1,
            is_editable: true,
            is_disabled: false,
            class_names: vec!["editable".into()],
            option_list: Vec::new(),
            changed_fields: Vec::new(),
        }
    }

    #[test_case(json!(1), json!(1.0), true ; "int equals float")]
    #[test_case(json!(1), json!(2), false ; "different ints")]
    #[test_case(json!("1"), json!(1), false ; "string is not number")]
    #[test_case(json!([1, {"a": 2.0}]), json!([1.0, {"a": 2}]), true ; "nested numbers")]
    #[test_case(json!({"a": 1}), json!({"a": 1, "b": 2}), false ; "extra key")]
    #[test_case(json!(null), json!(null), true ; "nulls")]
    #[test_case(json!(0.0), json!(-0.0), true ; "signed zeros")]
    #[test_case(json!(-0.0), json!(0), true ; "negative zero and int zero")]
    #[test_case(json!(0.5), json!(0.25), false ; "different floats")]
    fn test_values_equal(a: Value, b: Value, expected: bool) {
        assert_eq!(values_equal(&a, &b), expected);
    }

    #[test]
    fn test_apply_reports_only_differing_fields() {
        let mut target = cell();
        let changed = CellPatch::value("b")
            .editable(true)
            .disabled(true)
            .apply_to(&mut target);

        assert_eq!(changed, vec![CellField::Value, CellField::IsDisabled]);
        assert_eq!(target.value, json!("b"));
        assert!(target.is_disabled);
    }

    #[test]
    fn test_apply_same_values_is_noop() {
        let mut target = cell();
        let changed = CellPatch::value("a")
            .class_names(["editable"])
            .apply_to(&mut target);

        assert!(changed.is_empty());
        assert_eq!(target, cell());
    }

    #[test]
    fn test_option_list_compares_by_content() {
        let mut target = cell();
        target.option_list = vec![ListItem::new("One", 1)];

        let same = CellPatch::default()
            .option_list(vec![ListItem::new("One", 1.0)])
            .apply_to(&mut target);
        assert!(same.is_empty());

        let changed = CellPatch::default()
            .option_list(vec![ListItem::new("One", 1), ListItem::new("Two", 2)])
            .apply_to(&mut target);
        assert_eq!(changed, vec![CellField::OptionList]);
        assert_eq!(target.option_list.len(), 2);
    }

    #[test]
    fn test_empty_patch() {
        assert!(CellPatch::default().is_empty());
        assert!(!CellPatch::default().disabled(false).is_empty());
    }
}
