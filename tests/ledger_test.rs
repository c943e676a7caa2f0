// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Ledger public API integration tests.

use hp_ledger_rs::{ChangeOptions, Entry, Ledger, LedgerError, LedgerOptions, Timestamp, Validation};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TIMESTAMP_1: &str = "2018-01-01T00:00:00.000Z";
const TIMESTAMP_2: &str = "2018-01-01T00:00:00.001Z";
const TIMESTAMP_3: &str = "2018-01-01T00:00:00.002Z";

// === Helper Functions ===

fn make_entry(previous: Decimal, change: Decimal, current: Decimal, timestamp: &str) -> Entry {
    Entry::new(previous, change, current, timestamp).unwrap()
}

fn at(timestamp: &str) -> ChangeOptions {
    ChangeOptions::new().at(timestamp)
}

fn ts(timestamp: &str) -> Timestamp {
    Timestamp::parse(timestamp).unwrap()
}

// === Construction ===

#[test]
fn empty_ledger() {
    let ledger = Ledger::new();
    assert_eq!(ledger.len(), 0);
    assert!(ledger.is_empty());
    assert_eq!(ledger.last_balance(), Decimal::ZERO);
    assert_eq!(ledger.last_change(), Decimal::ZERO);
    assert_eq!(ledger.last_timestamp(), None);
    assert_eq!(ledger.last_entry(), None);
    assert_eq!(ledger.first_entry(), None);
    assert_eq!(ledger.validate(), Validation::Valid);
}

#[test]
fn empty_ledger_reports_initial_state() {
    let ledger = Ledger::builder()
        .initial_balance(dec!(42))
        .initial_timestamp(TIMESTAMP_1)
        .build()
        .unwrap();
    assert_eq!(ledger.last_balance(), dec!(42));
    assert_eq!(ledger.last_change(), Decimal::ZERO);
    assert_eq!(ledger.last_timestamp(), Some(ts(TIMESTAMP_1)));
}

#[test]
fn one_entry_zero_change() {
    let ledger = Ledger::from_entries([make_entry(dec!(0), dec!(0), dec!(0), TIMESTAMP_1)]).unwrap();

    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.last_balance(), dec!(0));
    assert_eq!(ledger.last_change(), dec!(0));
    assert_eq!(ledger.last_timestamp(), Some(ts(TIMESTAMP_1)));
}

#[test]
fn one_entry_five_change() {
    let ledger = Ledger::from_entries([make_entry(dec!(0), dec!(5), dec!(5), TIMESTAMP_1)]).unwrap();

    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.last_balance(), dec!(5));
    assert_eq!(ledger.last_change(), dec!(5));
    assert_eq!(ledger.last_timestamp(), Some(ts(TIMESTAMP_1)));
}

#[test]
fn one_entry_tiny_change_is_exact() {
    let entry = Entry::new(0, 0.00005, 0.00005, TIMESTAMP_1).unwrap();
    let ledger = Ledger::from_entries([entry]).unwrap();

    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.last_balance(), dec!(0.00005));
    assert_eq!(ledger.last_change(), dec!(0.00005));
}

#[test]
fn two_entries_zero_change() {
    let ledger = Ledger::from_entries([
        make_entry(dec!(0), dec!(0), dec!(0), TIMESTAMP_1),
        make_entry(dec!(0), dec!(0), dec!(0), TIMESTAMP_2),
    ])
    .unwrap();

    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.last_balance(), dec!(0));
    assert_eq!(ledger.last_change(), dec!(0));
    assert_eq!(ledger.last_timestamp(), Some(ts(TIMESTAMP_2)));
}

#[test]
fn two_entries_plus_minus_change() {
    let ledger = Ledger::from_entries([
        Entry::new(0, 5.0, 5.0, TIMESTAMP_1).unwrap(),
        Entry::new(5, -2.5, 2.5, TIMESTAMP_2).unwrap(),
    ])
    .unwrap();

    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.last_balance(), dec!(2.5));
    assert_eq!(ledger.last_change(), dec!(-2.5));
    assert_eq!(ledger.last_timestamp(), Some(ts(TIMESTAMP_2)));
    assert_eq!(ledger.first_entry().unwrap().current(), dec!(5));
}

#[test]
fn wrong_previous_balance_fails_construction_at_index() {
    let result = Ledger::from_entries([
        make_entry(dec!(0), dec!(5), dec!(5), TIMESTAMP_1),
        make_entry(dec!(0), dec!(-2.5), dec!(2.5), TIMESTAMP_2),
    ]);

    assert_eq!(result, Err(LedgerError::InconsistentEntry { index: 1 }));
}

#[test]
fn first_entry_must_start_at_initial_balance() {
    let result = Ledger::with_options(
        [make_entry(dec!(0), dec!(5), dec!(5), TIMESTAMP_1)],
        LedgerOptions {
            initial_balance: dec!(10),
            ..LedgerOptions::default()
        },
    );

    assert_eq!(result, Err(LedgerError::InconsistentEntry { index: 0 }));
}

#[test]
fn reversed_timestamps_fail_only_when_verified() {
    let entries = [
        make_entry(dec!(0), dec!(5), dec!(5), TIMESTAMP_2),
        make_entry(dec!(5), dec!(1), dec!(6), TIMESTAMP_1),
    ];

    assert_eq!(
        Ledger::from_entries(entries.clone()),
        Err(LedgerError::InconsistentEntry { index: 1 })
    );

    let ledger = Ledger::builder()
        .entries(entries)
        .verify_timestamp(false)
        .build()
        .unwrap();
    assert_eq!(ledger.last_balance(), dec!(6));
}

#[test]
fn first_entry_checked_against_initial_timestamp() {
    let result = Ledger::builder()
        .initial_timestamp(TIMESTAMP_2)
        .entry(make_entry(dec!(0), dec!(1), dec!(1), TIMESTAMP_1))
        .build();

    assert_eq!(result, Err(LedgerError::InconsistentEntry { index: 0 }));
}

#[test]
fn builder_rejects_unreadable_initial_timestamp() {
    let result = Ledger::builder().initial_timestamp("the dawn of time").build();
    assert_eq!(
        result,
        Err(LedgerError::InvalidTimestamp("the dawn of time".into()))
    );
}

// === Mutation ===

#[test]
fn change_appends_entry_and_keeps_receiver() {
    let ledger = Ledger::new();
    let changed = ledger.change(5, at(TIMESTAMP_1)).unwrap();

    assert_eq!(ledger.len(), 0);
    assert_eq!(changed.len(), 1);

    let entry = changed.last_entry().unwrap();
    assert_eq!(entry.previous(), dec!(0));
    assert_eq!(entry.change(), dec!(5));
    assert_eq!(entry.current(), dec!(5));
    assert_eq!(entry.timestamp(), ts(TIMESTAMP_1));
}

#[test]
fn set_computes_change_from_last_balance() {
    let ledger = Ledger::new()
        .change(5, at(TIMESTAMP_1))
        .unwrap()
        .set("2.5", at(TIMESTAMP_2))
        .unwrap();

    assert_eq!(ledger.last_balance(), dec!(2.5));
    assert_eq!(ledger.last_change(), dec!(-2.5));
    assert_eq!(ledger.last_entry().unwrap().previous(), dec!(5));
}

#[test]
fn change_and_set_converge() {
    let start = Ledger::new().change(dec!(7.25), at(TIMESTAMP_1)).unwrap();
    let delta = dec!(-3.1);

    let by_change = start.change(delta, at(TIMESTAMP_2)).unwrap();
    let by_set = start.set(start.last_balance() + delta, at(TIMESTAMP_2)).unwrap();

    assert_eq!(by_change.last_balance(), by_set.last_balance());
    assert_eq!(by_change, by_set);
}

#[test]
fn negative_change_rejected_by_default() {
    let ledger = Ledger::new().change(5, at(TIMESTAMP_1)).unwrap();

    let result = ledger.change(-10, at(TIMESTAMP_2));

    assert_eq!(result, Err(LedgerError::NegativeBalance(dec!(-5))));
    assert_eq!(ledger.last_balance(), dec!(5));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn negative_set_rejected_by_default() {
    let ledger = Ledger::new().change(5, at(TIMESTAMP_1)).unwrap();
    assert_eq!(
        ledger.set(-1, at(TIMESTAMP_2)),
        Err(LedgerError::NegativeBalance(dec!(-1)))
    );
}

#[test]
fn negative_balance_allowed_on_request() {
    let ledger = Ledger::new().change(5, at(TIMESTAMP_1)).unwrap();

    let changed = ledger
        .change(-10, at(TIMESTAMP_2).allow_negative_balance(true))
        .unwrap();

    assert_eq!(changed.last_balance(), dec!(-5));
    assert_eq!(changed.validate(), Validation::Valid);
}

#[test]
fn non_finite_change_is_invalid_even_when_negatives_allowed() {
    let ledger = Ledger::new();
    let options = ChangeOptions::new().allow_negative_balance(true);

    assert_eq!(ledger.change(f64::NAN, options.clone()), Err(LedgerError::InvalidBalance));
    assert_eq!(ledger.set(f64::INFINITY, options), Err(LedgerError::InvalidBalance));
}

#[test]
fn unreadable_change_amount() {
    assert_eq!(
        Ledger::new().change("five", ChangeOptions::new()),
        Err(LedgerError::InvalidAmount("five".into()))
    );
}

#[test]
fn unreadable_change_timestamp() {
    assert_eq!(
        Ledger::new().change(1, at("tomorrow")),
        Err(LedgerError::InvalidTimestamp("tomorrow".into()))
    );
}

#[test]
fn change_back_in_time_is_inconsistent() {
    let ledger = Ledger::new().change(1, at(TIMESTAMP_2)).unwrap();

    assert_eq!(
        ledger.change(1, at(TIMESTAMP_1)),
        Err(LedgerError::InconsistentEntry { index: 1 })
    );
    assert_eq!(ledger.len(), 1);
}

#[test]
fn change_back_in_time_allowed_without_verification() {
    let ledger = Ledger::builder()
        .verify_timestamp(false)
        .build()
        .unwrap()
        .change(1, at(TIMESTAMP_2))
        .unwrap()
        .change(1, at(TIMESTAMP_1))
        .unwrap();

    assert_eq!(ledger.last_balance(), dec!(2));
}

#[test]
fn change_default_timestamp_is_now() {
    let before = Timestamp::now();
    let ledger = Ledger::new().change(1, ChangeOptions::new()).unwrap();
    assert!(ledger.last_timestamp().unwrap() >= before);
}

#[test]
fn mutations_carry_configuration() {
    let ledger = Ledger::builder()
        .initial_balance(dec!(100))
        .initial_timestamp(TIMESTAMP_1)
        .verify_timestamp(false)
        .build()
        .unwrap();

    let changed = ledger.change(1, at(TIMESTAMP_2)).unwrap().set(50, at(TIMESTAMP_3)).unwrap();

    assert_eq!(changed.initial_balance(), dec!(100));
    assert_eq!(changed.initial_timestamp(), Some(ts(TIMESTAMP_1)));
    assert!(!changed.verify_timestamp());
    assert_eq!(changed.options(), ledger.options());
    assert_eq!(changed.first_entry().unwrap().previous(), dec!(100));
}

#[test]
fn branches_from_same_parent_are_independent() {
    let parent = Ledger::new().change(10, at(TIMESTAMP_1)).unwrap();

    let left = parent.change(1, at(TIMESTAMP_2)).unwrap();
    let right = parent.change(-1, at(TIMESTAMP_2)).unwrap();

    assert_eq!(parent.last_balance(), dec!(10));
    assert_eq!(left.last_balance(), dec!(11));
    assert_eq!(right.last_balance(), dec!(9));
    assert_eq!(left.first_entry(), right.first_entry());
}

#[test]
fn tiny_changes_sum_exactly() {
    let mut ledger = Ledger::new()
        .append(Entry::new(0, 0.00005, 0.00005, TIMESTAMP_1).unwrap())
        .unwrap();
    assert_eq!(ledger.last_balance(), dec!(0.00005));

    for _ in 1..20_000 {
        ledger = ledger.change(0.00005, at(TIMESTAMP_2)).unwrap();
    }

    assert_eq!(ledger.len(), 20_000);
    assert_eq!(ledger.last_balance(), dec!(1));
    assert_eq!(ledger.validate(), Validation::Valid);
}

#[test]
fn change_needing_more_precision_is_invalid() {
    let ledger = Ledger::new()
        .change(dec!(1000000000000000000000000), at(TIMESTAMP_1))
        .unwrap();

    let result = ledger.change(dec!(0.00005), at(TIMESTAMP_2));

    assert_eq!(result.unwrap_err(), LedgerError::InvalidBalance);
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.last_balance(), dec!(1000000000000000000000000));
}

#[test]
fn set_needing_more_precision_is_invalid() {
    let ledger = Ledger::new()
        .change(dec!(1000000000000000000000000), at(TIMESTAMP_1))
        .unwrap();

    let result = ledger.set(dec!(0.00005), at(TIMESTAMP_2));

    assert_eq!(result.unwrap_err(), LedgerError::InvalidBalance);
}

#[test]
fn large_balance_takes_exact_changes() {
    let ledger = Ledger::new()
        .change(dec!(1000000000000000000000000), at(TIMESTAMP_1))
        .unwrap()
        .change(dec!(0.0001), at(TIMESTAMP_2))
        .unwrap();

    assert_eq!(ledger.last_balance(), dec!(1000000000000000000000000.0001));
    assert_eq!(ledger.validate(), Validation::Valid);
}

#[test]
fn rounded_entry_fails_construction() {
    let large = dec!(1000000000000000000000000);
    let entries = vec![
        make_entry(dec!(0), large, large, TIMESTAMP_1),
        make_entry(large, dec!(0.00005), large, TIMESTAMP_2),
    ];

    assert_eq!(
        Ledger::from_entries(entries).unwrap_err(),
        LedgerError::InconsistentEntry { index: 1 }
    );
}

// === Accessors ===

#[test]
fn entries_iterate_oldest_first() {
    let ledger = Ledger::new()
        .change(1, at(TIMESTAMP_1))
        .unwrap()
        .change(2, at(TIMESTAMP_2))
        .unwrap()
        .change(3, at(TIMESTAMP_3))
        .unwrap();

    let changes: Vec<Decimal> = ledger.entries().map(Entry::change).collect();
    assert_eq!(changes, vec![dec!(1), dec!(2), dec!(3)]);

    let balances: Vec<Decimal> = (&ledger).into_iter().map(Entry::current).collect();
    assert_eq!(balances, vec![dec!(1), dec!(3), dec!(6)]);

    assert_eq!(ledger.get(1).unwrap().current(), dec!(3));
    assert_eq!(ledger.get(3), None);
}
