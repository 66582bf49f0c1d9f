//! Tests for row state sync across merged (row-spanned) cells.
//!
//! Only the owner row's cell is written when a member row's metadata
//! changes; members display the owner's state.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use std::rc::Rc;

use cellsync::{
    Cell, CellField, ColumnRegistry, DanglingSpan, DanglingSpanPolicy, DataSource, DataStore,
    GridConfig, RawRow, RenderRow, RowKey, RowObserver, RowState, RowStateFlag, SyncOutcome,
};
use common::{default_columns, grid, grid_with, merged_rows};
use pretty_assertions::assert_eq;
use test_case::test_case;

// ============================================================================
// OWNER REDIRECTION
// ============================================================================

#[test]
fn test_disabling_member_disables_owner_cell() {
    let rows = RawRow::list_from_json(
        r#"[
            {"rowKey": 1, "name": "a",
             "_extraData": {"rowSpanData": {"name": {"ownerRowKey": 1, "spanLength": 2, "isOwner": true}}}},
            {"rowKey": 2, "name": "a",
             "_extraData": {"rowSpanData": {"name": {"ownerRowKey": 1, "spanLength": 0, "isOwner": false}}}}
        ]"#,
    )
    .unwrap();
    let g = grid(rows);

    g.store
        .set_row_state(2, Some(RowStateFlag::Disabled))
        .unwrap();

    let owner = g.cell(1, "name");
    assert!(owner.is_disabled);
    assert!(!owner.is_editable);
    assert_eq!(owner.class_names, ["disabled"]);

    // The member's own record is untouched.
    let member = g.cell(2, "name");
    assert!(!member.is_disabled);
    assert!(member.changed_fields.is_empty());

    assert!(g.display_cell(2, "name").is_disabled);
    assert_eq!(
        g.log.cell_events(),
        vec![(
            1,
            "name".to_string(),
            vec![
                CellField::IsEditable,
                CellField::IsDisabled,
                CellField::ClassNames
            ]
        )]
    );
}

#[test_case(2 ; "second row")]
#[test_case(3 ; "middle row")]
#[test_case(4 ; "last row")]
fn test_any_member_syncs_through_owner(member: u64) {
    let g = grid(merged_rows(4));

    g.store
        .set_row_state(member, Some(RowStateFlag::Disabled))
        .unwrap();

    let owner = g.cell(1, "name");
    assert!(owner.is_disabled);
    for row_key in 2..=4 {
        let shown = g.display_cell(row_key, "name");
        assert_eq!(shown.is_disabled, owner.is_disabled);
        assert_eq!(shown.is_editable, owner.is_editable);
        assert_eq!(shown.class_names, owner.class_names);
        assert!(!g.cell(row_key, "name").is_disabled);
    }

    // Unmerged columns of the member change on the member itself.
    assert!(g.cell(member, "price").is_disabled);
    assert!(!g.cell(1, "price").is_disabled);
}

#[test]
fn test_owner_row_updates_itself() {
    let g = grid(merged_rows(3));
    g.store
        .set_row_state(1, Some(RowStateFlag::Disabled))
        .unwrap();

    assert!(g.cell(1, "name").is_disabled);
    assert!(g.cell(1, "price").is_disabled);
    assert!(!g.display_cell(2, "price").is_disabled);
    assert!(g.display_cell(2, "name").is_disabled);
}

#[test]
fn test_member_classes_reach_owner() {
    let g = grid(merged_rows(3));
    g.store.add_cell_class_name(3, "name", "warn").unwrap();

    assert_eq!(g.cell(1, "name").class_names, ["warn", "editable"]);
    assert_eq!(g.display_cell(2, "name").class_names, ["warn", "editable"]);
}

#[test]
fn test_last_synced_member_wins() {
    let g = grid(merged_rows(3));
    g.store
        .set_row_state(2, Some(RowStateFlag::Disabled))
        .unwrap();
    g.store.set_row_state(2, None).unwrap();

    let owner = g.cell(1, "name");
    assert!(!owner.is_disabled);
    assert!(owner.is_editable);
    assert_eq!(owner.changed_fields.len(), 3);
}

#[test]
fn test_checkbox_override_in_sync() {
    let g = grid(vec![common::plain_row(1)]);
    g.store
        .set_row_state(1, Some(RowStateFlag::DisabledCheck))
        .unwrap();

    assert!(g.cell(1, "_button").is_disabled);
    assert!(!g.cell(1, "name").is_disabled);
    assert_eq!(g.cell(1, "_button").class_names, ["disabled"]);
}

/// Re-enables a row as soon as its checkbox cell turns disabled.
struct Reenable {
    store: Rc<DataStore>,
}

impl RowObserver for Reenable {
    fn cell_changed(&self, row_key: RowKey, cell: &Cell) {
        if cell.column_name == "_button" && cell.is_disabled {
            self.store.set_row_state(row_key, None).unwrap();
        }
    }
}

#[test]
fn test_state_change_during_sync_keeps_cells_consistent() {
    let g = grid(vec![common::plain_row(1)]);
    let observer = Rc::new(Reenable {
        store: Rc::clone(&g.store),
    });
    g.list
        .set_observer(Some(Rc::clone(&observer) as Rc<dyn RowObserver>));

    g.store
        .set_row_state(1, Some(RowStateFlag::Disabled))
        .unwrap();

    assert_eq!(g.store.row_state(1), RowState::default());
    for column in ["_button", "name", "price"] {
        let cell = g.cell(1, column);
        assert!(!cell.is_disabled, "{column}");
        assert!(cell.is_editable, "{column}");
        assert_eq!(cell.class_names, ["editable"], "{column}");
    }
    assert!(!g.cell(1, "id").is_disabled);
}

// ============================================================================
// SKIPS
// ============================================================================

#[test]
fn test_span_disabled_updates_member_itself() {
    let g = grid(merged_rows(2));
    g.store.set_row_span_enabled(false);

    g.store
        .set_row_state(2, Some(RowStateFlag::Disabled))
        .unwrap();

    assert!(g.cell(2, "name").is_disabled);
    assert!(!g.cell(1, "name").is_disabled);
}

#[test]
fn test_hidden_columns_are_not_synced() {
    let g = grid(vec![common::plain_row(1)]);
    g.columns.set_hidden("price", true);
    assert!(g
        .columns
        .visible_columns()
        .iter()
        .all(|c| c.column_name != "price"));

    g.store
        .set_row_state(1, Some(RowStateFlag::Disabled))
        .unwrap();

    assert!(g.cell(1, "name").is_disabled);
    assert!(!g.cell(1, "price").is_disabled);
}

#[test]
fn test_sync_is_idempotent() {
    let g = grid(merged_rows(2));
    g.store
        .set_row_state(2, Some(RowStateFlag::Disabled))
        .unwrap();
    g.log.clear();

    let outcome = g.list.get(2).unwrap().sync_row_state();

    assert_eq!(outcome, SyncOutcome::default());
    assert!(g.log.cell_events().is_empty());
}

#[test]
fn test_detached_rows_do_not_sync() {
    let g = grid(vec![common::plain_row(1)]);
    let raw = g.store.get(1).unwrap();
    let source = Rc::clone(&g.store);
    let registry = Rc::clone(&g.columns);
    let loose = RenderRow::new(&raw, source, registry, Rc::new(GridConfig::default()));

    g.store
        .set_row_state(1, Some(RowStateFlag::Disabled))
        .unwrap();

    // The listed row synced, the loose one did not.
    assert!(g.cell(1, "name").is_disabled);
    assert!(!loose.cell("name").unwrap().is_disabled);
    assert!(loose.sync_row_state().detached);
}

#[test]
fn test_removed_row_is_detached() {
    let g = grid(merged_rows(2));
    let member = g.list.remove(2).unwrap();

    assert!(!member.is_subscribed());
    let outcome = member.sync_row_state();
    assert!(outcome.detached);
    assert!(outcome.updated.is_empty());
}

// ============================================================================
// DANGLING OWNERS
// ============================================================================

fn orphaned(policy: DanglingSpanPolicy) -> common::Grid {
    let g = grid_with(
        default_columns(),
        merged_rows(3),
        GridConfig::default().with_dangling_span(policy),
    );
    g.list.remove(1);
    g
}

#[test]
fn test_dangling_owner_is_skipped_by_default() {
    let g = orphaned(DanglingSpanPolicy::Skip);
    g.store
        .set_row_state(2, Some(RowStateFlag::Disabled))
        .unwrap();

    assert!(!g.cell(2, "name").is_disabled);
    assert!(g.cell(2, "price").is_disabled);

    let outcome = g.list.get(2).unwrap().sync_row_state();
    assert_eq!(
        outcome.dangling,
        vec![DanglingSpan {
            row_key: 2,
            column_name: "name".into(),
            owner_row_key: 1,
        }]
    );
    assert!(outcome.updated.is_empty());
}

#[test]
fn test_dangling_owner_applies_to_self() {
    let g = orphaned(DanglingSpanPolicy::ApplyToSelf);
    g.store
        .set_row_state(3, Some(RowStateFlag::Disabled))
        .unwrap();

    assert!(g.cell(3, "name").is_disabled);
    assert!(!g.cell(2, "name").is_disabled);

    let outcome = g.list.get(3).unwrap().sync_row_state();
    assert_eq!(outcome.dangling.len(), 1);
}

#[test]
fn test_sync_reports_updated_cells() {
    let g = grid(merged_rows(2));
    // Change the store behind the view's back, then sync by hand.
    let member = g.list.remove(2).unwrap();
    g.store
        .set_row_state(2, Some(RowStateFlag::Disabled))
        .unwrap();
    assert!(g.list.append(2));
    drop(member);

    // A fresh row projects the new state; the owner has not seen it yet.
    assert!(g.cell(2, "price").is_disabled);
    assert!(!g.cell(1, "name").is_disabled);

    let outcome = g.list.get(2).unwrap().sync_row_state();
    assert_eq!(outcome.updated, vec![(1, "name".to_string())]);
    assert!(g.cell(1, "name").is_disabled);
}
