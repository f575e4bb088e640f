//! Property-based tests for the ledger's replay arithmetic.
//!
//! The integration suite drives the real service against a database; these
//! tests hammer the pure invariants across a wide range of mutation sequences.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use stockroom_api::entities::stock_transaction::{self, StockAction};
use stockroom_api::services::stock_ledger::replay_quantity;
use uuid::Uuid;

fn entry(action: StockAction, quantity: i32, new_quantity: i32) -> stock_transaction::Model {
    stock_transaction::Model {
        id: Uuid::new_v4(),
        material_id: Uuid::nil(),
        material_name: "Bearing 6204".to_string(),
        category_id: Uuid::nil(),
        category_name: "Bearings".to_string(),
        action: action.as_str().to_string(),
        quantity,
        new_quantity,
        owner_name: "A. Fitter".to_string(),
        assigned_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        work_type: match action {
            StockAction::Add => "Add New Stock".to_string(),
            StockAction::Remove => "Breakdown Maintainance".to_string(),
        },
        machine_id: None,
        machine_name: None,
        remarks: None,
        recorded_by: Uuid::nil(),
        created_at: Utc::now(),
    }
}

/// Applies the ledger's accept/reject rule to a raw mutation sequence:
/// removals that would overdraw are rejected and leave no trace.
fn simulate(ops: &[(bool, i32)]) -> (Vec<stock_transaction::Model>, i64) {
    let mut committed = Vec::new();
    let mut current = 0i64;
    for &(is_add, quantity) in ops {
        let delta = if is_add {
            i64::from(quantity)
        } else {
            -i64::from(quantity)
        };
        let next = current + delta;
        if next < 0 {
            continue;
        }
        current = next;
        let action = if is_add {
            StockAction::Add
        } else {
            StockAction::Remove
        };
        committed.push(entry(action, quantity, current as i32));
    }
    (committed, current)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn quantity_never_goes_negative(ops in prop::collection::vec((any::<bool>(), 1i32..100), 0..64)) {
        let (committed, current) = simulate(&ops);
        prop_assert!(current >= 0);
        for entry in &committed {
            prop_assert!(entry.new_quantity >= 0);
        }
    }

    #[test]
    fn replay_reproduces_the_final_quantity(ops in prop::collection::vec((any::<bool>(), 1i32..100), 0..64)) {
        let (committed, current) = simulate(&ops);
        prop_assert_eq!(replay_quantity(&committed), current);
        if let Some(last) = committed.last() {
            prop_assert_eq!(i64::from(last.new_quantity), current);
        }
    }

    #[test]
    fn every_snapshot_matches_its_prefix_sum(ops in prop::collection::vec((any::<bool>(), 1i32..100), 0..64)) {
        let (committed, _) = simulate(&ops);
        for i in 0..committed.len() {
            prop_assert_eq!(
                replay_quantity(&committed[..=i]),
                i64::from(committed[i].new_quantity)
            );
        }
    }

    #[test]
    fn rejected_overdraws_leave_no_trace(quantity in 1i32..100, overdraw in 1i32..100) {
        let ops = [(true, quantity), (false, quantity + overdraw)];
        let (committed, current) = simulate(&ops);
        prop_assert_eq!(committed.len(), 1);
        prop_assert_eq!(current, i64::from(quantity));
    }
}
