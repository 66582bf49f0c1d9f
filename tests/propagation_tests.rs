//! Tests for store notifications flowing into listed rows.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use std::rc::Rc;

use cellsync::{
    CellField, DataSource, ExtraData, GridError, RawRow, RowStateFlag, SpanDescriptor, ValueChange,
};
use common::{grid, merged_rows, plain_row};
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// COLUMN CHANGES
// ============================================================================

#[test]
fn test_store_value_reaches_cell() {
    let g = grid(vec![plain_row(1), plain_row(2)]);

    g.store.set_value(2, "name", "renamed").unwrap();

    let cell = g.cell(2, "name");
    assert_eq!(cell.value, json!("renamed"));
    assert_eq!(cell.changed_fields, vec![CellField::Value]);
    assert_eq!(g.cell(1, "name").value, json!("row1"));
    assert_eq!(
        g.log.value_events(),
        vec![ValueChange {
            row_key: 2,
            column_name: "name".into(),
            row_index: Some(1),
        }]
    );
}

#[test]
fn test_set_values_publishes_only_differences() {
    let g = grid(vec![plain_row(1)]);

    g.store
        .set_values(1, [("name", json!("row1")), ("price", json!(11))])
        .unwrap();

    let columns: Vec<_> = g
        .log
        .value_events()
        .into_iter()
        .map(|change| change.column_name)
        .collect();
    assert_eq!(columns, ["price"]);
    assert!(g.cell(1, "name").changed_fields.is_empty());
}

#[test]
fn test_unchanged_value_is_silent() {
    let g = grid(vec![plain_row(3)]);
    g.store.set_value(3, "price", 30.0).unwrap();
    assert!(g.log.cell_events().is_empty());
}

#[test]
fn test_reserved_fields_are_not_written() {
    let g = grid(vec![plain_row(1)]);
    g.store.set_value(1, "rowKey", 5).unwrap();
    g.store.set_value(1, "_extraData", json!({})).unwrap();

    assert_eq!(g.store.get(1).unwrap().row_key, 1);
    assert!(g.log.cell_events().is_empty());
}

#[test]
fn test_new_column_appears_after_reparse() {
    let g = grid(vec![plain_row(1)]);
    g.store.set_value(1, "note", "hello").unwrap();

    assert!(!g.list.get(1).unwrap().has_cell("note"));
    assert!(g.list.reparse(1));
    assert_eq!(g.cell(1, "note").value, json!("hello"));
}

#[test]
fn test_unknown_row_is_an_error() {
    let g = grid(vec![plain_row(1)]);
    assert!(matches!(
        g.store.set_value(9, "name", "x"),
        Err(GridError::RowNotFound(9))
    ));
    assert!(matches!(
        g.store.set_row_state(9, None),
        Err(GridError::RowNotFound(9))
    ));
}

// ============================================================================
// METADATA CHANGES
// ============================================================================

#[test]
fn test_extra_data_replacement_resyncs() {
    let g = grid(vec![plain_row(1)]);
    let mut extra = ExtraData {
        row_state: Some(RowStateFlag::Disabled),
        ..ExtraData::default()
    };
    extra.class_name.row.push("muted".into());

    g.store.set_extra_data(1, extra).unwrap();

    let name = g.cell(1, "name");
    assert!(name.is_disabled);
    assert_eq!(name.class_names, ["muted", "disabled"]);
    assert_eq!(g.cell(1, "id").class_names, ["muted", "disabled"]);
    assert!(g.log.value_events().is_empty());
}

#[test]
fn test_row_class_names_round_trip() {
    let g = grid(vec![plain_row(1)]);

    g.store.add_row_class_name(1, "hot").unwrap();
    assert_eq!(g.cell(1, "price").class_names, ["hot", "editable"]);

    g.store.remove_row_class_name(1, "hot").unwrap();
    assert_eq!(g.cell(1, "price").class_names, ["editable"]);
}

#[test]
fn test_cell_class_name_targets_one_column() {
    let g = grid(vec![plain_row(1)]);

    g.store.add_cell_class_name(1, "price", "warn").unwrap();
    assert_eq!(g.cell(1, "price").class_names, ["warn", "editable"]);
    assert_eq!(g.cell(1, "name").class_names, ["editable"]);

    g.store.remove_cell_class_name(1, "price", "warn").unwrap();
    assert_eq!(g.cell(1, "price").class_names, ["editable"]);
    assert!(g.store.get(1).unwrap().extra_data.is_empty());
}

#[test]
fn test_unchanged_extra_data_is_silent() {
    let g = grid(vec![plain_row(1)]);
    g.store.set_row_state(1, None).unwrap();
    g.store.remove_row_class_name(1, "absent").unwrap();
    assert!(g.log.cell_events().is_empty());
}

#[test]
fn test_restore_publishes_the_difference() {
    let g = grid(vec![plain_row(1)]);
    g.store.set_value(1, "name", "edited").unwrap();
    g.store.set_value(1, "note", "added").unwrap();
    g.store
        .set_row_state(1, Some(RowStateFlag::Disabled))
        .unwrap();
    g.log.clear();

    g.store.restore(1).unwrap();

    let name = g.cell(1, "name");
    assert_eq!(name.value, json!("row1"));
    assert!(!name.is_disabled);
    assert!(name.is_editable);
    assert_eq!(g.store.value(1, "note"), None);
    assert!(g
        .log
        .value_events()
        .iter()
        .all(|change| change.column_name == "name"));
}

// ============================================================================
// ROW LIFECYCLE
// ============================================================================

#[test]
fn test_removed_row_stops_updating() {
    let g = grid(vec![plain_row(1)]);
    let row = g.list.remove(1).unwrap();

    g.store.set_value(1, "name", "after").unwrap();

    assert_eq!(row.cell("name").unwrap().value, json!("row1"));
    assert!(g.log.cell_events().is_empty());
}

#[test]
fn test_reset_detaches_previous_rows() {
    let g = grid(vec![plain_row(1), plain_row(2)]);
    let old = g.list.get(1).unwrap();

    assert_eq!(g.list.reset(&[2, 1, 2, 42]), 2);
    assert_eq!(g.list.row_keys(), vec![2, 1]);
    assert!(!old.is_attached());
    assert!(!old.is_subscribed());

    g.store.set_value(1, "name", "fresh").unwrap();
    assert_eq!(old.cell("name").unwrap().value, json!("row1"));
    assert_eq!(g.cell(1, "name").value, json!("fresh"));
}

#[test]
fn test_append_builds_from_store() {
    let g = grid(vec![plain_row(1)]);
    g.store.append(plain_row(2)).unwrap();

    assert!(g.list.append(2));
    assert!(!g.list.append(2));
    assert!(!g.list.append(99));

    g.store.set_value(2, "price", 1).unwrap();
    assert_eq!(g.cell(2, "price").value, json!(1));
}

#[test]
fn test_store_removal_leaves_row_stale() {
    let g = grid(vec![plain_row(1)]);
    let raw = g.store.remove(1).unwrap();

    assert_eq!(raw.row_key, 1);
    assert!(!g.list.reparse(1));
    assert_eq!(g.cell(1, "name").value, json!("row1"));
}

#[test]
fn test_dropped_row_does_not_block_notifications() {
    let g = grid(vec![plain_row(1)]);
    let row = g.list.remove(1).unwrap();
    drop(row);

    g.store.set_value(1, "name", "nobody listens").unwrap();
    assert_eq!(g.store.value(1, "name"), Some(json!("nobody listens")));
}

// ============================================================================
// SPAN REGROUPING
// ============================================================================

#[test]
fn test_merge_rows_then_reparse() {
    let g = grid((1..=4).map(plain_row).collect());

    g.store.merge_rows("name", 2, 3).unwrap();
    // Rendered spans wait for re-projection.
    assert_eq!(g.cell(3, "name").span(), SpanDescriptor::unmerged(3));

    g.list.reparse_all();
    assert_eq!(g.cell(2, "name").span(), SpanDescriptor::owner(2, 3));
    assert_eq!(g.cell(3, "name").span(), SpanDescriptor::member(2));
    assert_eq!(g.cell(4, "name").span(), SpanDescriptor::member(2));
    assert_eq!(g.cell(1, "name").span(), SpanDescriptor::unmerged(1));

    g.store
        .set_row_state(4, Some(RowStateFlag::Disabled))
        .unwrap();
    assert!(g.cell(2, "name").is_disabled);
    assert!(g.display_cell(3, "name").is_disabled);
}

#[test]
fn test_overlapping_merge_dissolves_old_group() {
    let g = grid(merged_rows(3));
    g.store.append(plain_row(4)).unwrap();

    g.store.merge_rows("name", 3, 2).unwrap();

    let spans: Vec<_> = (1..=4)
        .map(|key| g.store.get(key).unwrap().extra_data.row_span_data.get("name").copied())
        .collect();
    assert_eq!(
        spans,
        vec![
            None,
            None,
            Some(SpanDescriptor::owner(3, 2)),
            Some(SpanDescriptor::member(3)),
        ]
    );
}

#[test]
fn test_unmerge_rows_then_reparse() {
    let g = grid(merged_rows(3));

    g.store.unmerge_rows("name", 1).unwrap();
    g.list.reparse_all();

    for key in 1..=3 {
        assert_eq!(g.cell(key, "name").span(), SpanDescriptor::unmerged(key));
    }
}

#[test]
fn test_invalid_merges_are_rejected() {
    let g = grid((1..=3).map(plain_row).collect());

    assert!(matches!(
        g.store.merge_rows("name", 1, 1),
        Err(GridError::InvalidSpan { .. })
    ));
    assert!(matches!(
        g.store.merge_rows("name", 2, 3),
        Err(GridError::InvalidSpan { .. })
    ));
    assert!(matches!(
        g.store.merge_rows("name", 7, 2),
        Err(GridError::RowNotFound(7))
    ));
    assert!(g.store.get(2).unwrap().extra_data.row_span_data.is_empty());
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_json_rows_end_to_end() {
    let rows = RawRow::list_from_json(
        r#"[
            {"rowKey": 10, "_button": false, "name": "Widget", "price": 4.5, "id": "W-1",
             "_extraData": {"rowState": "CHECKED", "className": {"row": ["new"]}}},
            {"rowKey": 11, "_button": true, "name": "Gadget", "price": 12, "id": "G-7",
             "_extraData": {"rowState": "DISABLED_CHECK"}}
        ]"#,
    )
    .unwrap();
    let g = grid(rows);

    assert_eq!(g.list.row_keys(), vec![10, 11]);
    assert_eq!(g.cell(10, "name").class_names, ["new", "editable"]);
    assert!(g.cell(11, "_button").is_disabled);
    assert!(g.cell(11, "name").is_editable);

    g.store.set_row_state(11, None).unwrap();
    g.store.set_value(10, "price", 5).unwrap();

    let rendered = serde_json::to_value(g.list.get(11).unwrap().cell("_button")).unwrap();
    assert_eq!(rendered["isDisabled"], json!(false));
    assert_eq!(rendered["classNames"], json!(["editable"]));
    assert_eq!(
        rendered["changedFields"],
        json!(["isEditable", "isDisabled", "classNames"])
    );
    assert_eq!(g.cell(10, "price").value, json!(5));
    assert_eq!(Rc::strong_count(&g.list), 1);
}
