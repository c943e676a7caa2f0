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

//! Consistency checks.
//!
//! Validation is a left-to-right fold over the entry sequence. A cursor carries the
//! running balance and timestamp; each entry must continue from the cursor exactly
//! and, when timestamps are verified, must not be earlier than it.

use crate::entry::Entry;
use crate::timestamp::{Timestamp, TimestampInput};
use crate::LedgerError;
use rust_decimal::Decimal;
use tracing::{debug, trace};

/// Outcome of validating an entry sequence.
///
/// `InvalidAt(0)` is a failure at the first entry, never success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validation {
    /// Every entry is consistent with its predecessor.
    Valid,
    /// The entry at this index is the first that breaks consistency.
    InvalidAt(usize),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The failing index, if any.
    pub fn failed_at(&self) -> Option<usize> {
        match self {
            Self::Valid => None,
            Self::InvalidAt(index) => Some(*index),
        }
    }

    /// Converts a failure into [`LedgerError::InconsistentEntry`].
    pub fn into_result(self) -> Result<(), LedgerError> {
        match self {
            Self::Valid => Ok(()),
            Self::InvalidAt(index) => Err(LedgerError::InconsistentEntry { index }),
        }
    }
}

/// Running `(balance, timestamp)` state threaded through validation.
///
/// A `None` timestamp is unknown and fails any timestamp check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub(crate) balance: Decimal,
    pub(crate) timestamp: Option<Timestamp>,
}

impl Cursor {
    fn advance(entry: &Entry) -> Self {
        Self {
            balance: entry.current(),
            timestamp: Some(entry.timestamp()),
        }
    }
}

/// Checks that `entry` continues from a previous ledger state.
///
/// Returns `Ok(false)` when the entry does not start at `previous_balance`, when its
/// arithmetic does not add up, or, with `verify_timestamp`, when `previous_timestamp`
/// is unreadable or later than the entry's timestamp. Equal timestamps pass.
///
/// # Errors
///
/// Returns [`LedgerError::MissingPreviousTimestamp`] if `previous_timestamp` is `None`
/// while `verify_timestamp` is set.
///
/// # Example
///
/// ```
/// use hp_ledger_rs::{validate_entry, Entry};
/// use rust_decimal_macros::dec;
///
/// let entry = Entry::new(5, -2.5, 2.5, "2018-01-01T00:00:00.001Z").unwrap();
/// let previous = Some("2018-01-01T00:00:00.000Z".into());
/// assert_eq!(validate_entry(&entry, dec!(5), previous, true), Ok(true));
/// ```
pub fn validate_entry(
    entry: &Entry,
    previous_balance: Decimal,
    previous_timestamp: Option<TimestampInput>,
    verify_timestamp: bool,
) -> Result<bool, LedgerError> {
    if previous_timestamp.is_none() && verify_timestamp {
        return Err(LedgerError::MissingPreviousTimestamp);
    }

    let cursor = Cursor {
        balance: previous_balance,
        timestamp: previous_timestamp.and_then(|input| input.resolve().ok()),
    };

    Ok(continues_from(entry, &cursor, verify_timestamp))
}

fn continues_from(entry: &Entry, cursor: &Cursor, verify_timestamp: bool) -> bool {
    if verify_timestamp {
        match cursor.timestamp {
            Some(previous) if previous <= entry.timestamp() => {}
            _ => return false,
        }
    }

    entry.previous() == cursor.balance && entry.is_balanced()
}

/// Folds over `(index, entry)` pairs from `cursor`, stopping at the first failure.
pub(crate) fn fold<'a, I>(entries: I, mut cursor: Cursor, verify_timestamp: bool) -> Validation
where
    I: IntoIterator<Item = (usize, &'a Entry)>,
{
    for (index, entry) in entries {
        if !continues_from(entry, &cursor, verify_timestamp) {
            debug!(
                index,
                expected_previous = %cursor.balance,
                previous = %entry.previous(),
                change = %entry.change(),
                current = %entry.current(),
                timestamp = %entry.timestamp(),
                "entry validation failed"
            );
            return Validation::InvalidAt(index);
        }

        trace!(
            index,
            previous = %entry.previous(),
            change = %entry.change(),
            current = %entry.current(),
            timestamp = %entry.timestamp(),
            "entry ok"
        );
        cursor = Cursor::advance(entry);
    }

    Validation::Valid
}
