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

//! The immutable ledger.
//!
//! A [`Ledger`] is an ordered history of [`Entry`] values plus its baseline
//! configuration. Constructing one validates the whole history, so holding a
//! `Ledger` means holding a consistent balance trail. [`Ledger::change`] and
//! [`Ledger::set`] return a new ledger with one more entry and leave the receiver as
//! it was.
//!
//! # Example
//!
//! ```
//! use hp_ledger_rs::{ChangeOptions, Ledger, LedgerError};
//! use rust_decimal_macros::dec;
//!
//! let ledger = Ledger::new()
//!     .change(5, ChangeOptions::new().at("2018-01-01T00:00:00.000Z"))
//!     .unwrap();
//! let ledger = ledger
//!     .set(2.5, ChangeOptions::new().at("2018-01-01T00:00:00.001Z"))
//!     .unwrap();
//! assert_eq!(ledger.last_balance(), dec!(2.5));
//! assert_eq!(ledger.last_change(), dec!(-2.5));
//!
//! // Rejected mutations leave the ledger untouched.
//! let err = ledger.change(-10, ChangeOptions::new()).unwrap_err();
//! assert_eq!(err, LedgerError::NegativeBalance(dec!(-7.5)));
//! assert_eq!(ledger.len(), 2);
//! ```

use crate::amount::{self, IntoAmount};
use crate::entry::Entry;
use crate::history::{Entries, History};
use crate::options::{ChangeOptions, DEFAULT_VERIFY_TIMESTAMP, LedgerOptions};
use crate::timestamp::{Timestamp, TimestampInput};
use crate::validation::{self, Cursor, Validation};
use crate::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::iter;
use tracing::debug;

/// Rejects balances that are invalid, or negative unless `allow_negative`.
///
/// `None` stands for a result that is not a number, infinite, or outside the decimal
/// range, and is rejected regardless of `allow_negative`.
///
/// # Errors
///
/// - [`LedgerError::InvalidBalance`] - `candidate` is `None`.
/// - [`LedgerError::NegativeBalance`] - `candidate` is below zero and negatives are not allowed.
pub fn check_balance(candidate: Option<Decimal>, allow_negative: bool) -> Result<Decimal, LedgerError> {
    let balance = candidate.ok_or(LedgerError::InvalidBalance)?;
    if !allow_negative && balance.is_sign_negative() && !balance.is_zero() {
        debug!(%balance, "rejected negative balance");
        return Err(LedgerError::NegativeBalance(balance));
    }
    Ok(balance)
}

/// An immutable, self-validating balance history.
///
/// # Invariants
///
/// - Entry `i` starts at the balance entry `i - 1` ended with (the initial balance for
///   the first entry).
/// - Every entry satisfies `current == previous + change` exactly.
/// - With timestamp verification, entries never go back in time. The first entry is
///   compared with the initial timestamp when one is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LedgerSnapshot", into = "LedgerSnapshot")]
pub struct Ledger {
    history: History,
    options: LedgerOptions,
}

impl Ledger {
    /// Creates an empty ledger with default options.
    pub fn new() -> Self {
        Self {
            history: History::new(),
            options: LedgerOptions::default(),
        }
    }

    /// Creates a ledger from existing entries with default options.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InconsistentEntry`] with the first inconsistent index.
    pub fn from_entries<I>(entries: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = Entry>,
    {
        Self::with_options(entries, LedgerOptions::default())
    }

    /// Creates a ledger from existing entries and baseline options.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InconsistentEntry`] with the first inconsistent index.
    pub fn with_options<I>(entries: I, options: LedgerOptions) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = Entry>,
    {
        let ledger = Self {
            history: entries.into_iter().collect(),
            options,
        };
        ledger.validate().into_result()?;
        Ok(ledger)
    }

    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.len() == 0
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> Entries<'_> {
        self.history.iter()
    }

    /// The entry at `index`, walking back from the newest entry.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.history.get(index)
    }

    pub fn first_entry(&self) -> Option<&Entry> {
        self.history.get(0)
    }

    pub fn last_entry(&self) -> Option<&Entry> {
        self.history.last()
    }

    /// The newest balance, or the initial balance when there are no entries.
    pub fn last_balance(&self) -> Decimal {
        self.last_entry()
            .map_or(self.options.initial_balance, Entry::current)
    }

    /// The newest change amount, or zero when there are no entries.
    pub fn last_change(&self) -> Decimal {
        self.last_entry().map_or(Decimal::ZERO, Entry::change)
    }

    /// The newest timestamp, or the initial timestamp when there are no entries.
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.last_entry()
            .map(Entry::timestamp)
            .or(self.options.initial_timestamp)
    }

    pub fn initial_balance(&self) -> Decimal {
        self.options.initial_balance
    }

    pub fn initial_timestamp(&self) -> Option<Timestamp> {
        self.options.initial_timestamp
    }

    pub fn verify_timestamp(&self) -> bool {
        self.options.verify_timestamp
    }

    pub fn options(&self) -> &LedgerOptions {
        &self.options
    }

    /// Adds `delta` to the last balance and returns the ledger with the new entry.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - `delta` is not a decimal number.
    /// - [`LedgerError::InvalidBalance`] - `delta` is not finite, or the sum overflows or
    ///   needs more precision than `Decimal` holds.
    /// - [`LedgerError::NegativeBalance`] - The sum is negative and not allowed.
    /// - [`LedgerError::InvalidTimestamp`] - The entry timestamp is not readable.
    /// - [`LedgerError::InconsistentEntry`] - The entry is earlier than the last one.
    pub fn change(&self, delta: impl IntoAmount, options: ChangeOptions) -> Result<Ledger, LedgerError> {
        let delta = delta.into_amount()?;
        let previous = self.last_balance();
        let current = check_balance(amount::exact_add(previous, delta), options.allow_negative_balance)?;

        self.commit(previous, delta, current, options.timestamp)
    }

    /// Moves the balance to `balance` and returns the ledger with the new entry.
    ///
    /// The entry's change is `balance - last_balance`.
    ///
    /// # Errors
    ///
    /// Same as [`Ledger::change`].
    pub fn set(&self, balance: impl IntoAmount, options: ChangeOptions) -> Result<Ledger, LedgerError> {
        let current = check_balance(Some(balance.into_amount()?), options.allow_negative_balance)?;
        let previous = self.last_balance();
        let delta = amount::exact_sub(current, previous).ok_or(LedgerError::InvalidBalance)?;

        self.commit(previous, delta, current, options.timestamp)
    }

    /// Returns the ledger with `entry` appended, after checking it against the newest
    /// balance and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InconsistentEntry`] if `entry` does not continue the
    /// history.
    pub fn append(&self, entry: Entry) -> Result<Ledger, LedgerError> {
        let index = self.len();
        // The history is already consistent, so only the new tail needs checking.
        let cursor = Cursor {
            balance: self.last_balance(),
            timestamp: self.last_timestamp().or(Some(entry.timestamp())),
        };

        validation::fold(iter::once((index, &entry)), cursor, self.options.verify_timestamp)
            .into_result()?;

        Ok(Self {
            history: self.history.push(entry),
            options: self.options.clone(),
        })
    }

    fn commit(
        &self,
        previous: Decimal,
        change: Decimal,
        current: Decimal,
        timestamp: Option<TimestampInput>,
    ) -> Result<Ledger, LedgerError> {
        let timestamp = match timestamp {
            Some(input) => input.resolve()?,
            None => Timestamp::now(),
        };

        self.append(Entry::from_parts(previous, change, current, timestamp))
    }

    /// Validates the full history against the ledger's own configuration.
    pub fn validate(&self) -> Validation {
        let Some(first) = self.first_entry() else {
            return Validation::Valid;
        };

        let cursor = Cursor {
            balance: self.options.initial_balance,
            timestamp: self.options.initial_timestamp.or(Some(first.timestamp())),
        };

        validation::fold(self.history.iter().enumerate(), cursor, self.options.verify_timestamp)
    }

    /// Validates the entries from `start_at` onwards against an explicit previous state.
    ///
    /// - An empty ledger is always valid.
    /// - `start_at` past the end is treated as 0.
    /// - From index 0 without `previous_timestamp`, the first entry's timestamp is the
    ///   baseline.
    /// - An unreadable `previous_timestamp` fails at `start_at` when verifying.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingPreviousTimestamp`] if `start_at` is past the first
    /// entry, `verify_timestamp` is set and no `previous_timestamp` is given.
    pub fn validate_from(
        &self,
        start_at: usize,
        previous_balance: Decimal,
        previous_timestamp: Option<TimestampInput>,
        verify_timestamp: bool,
    ) -> Result<Validation, LedgerError> {
        let Some(first) = self.first_entry() else {
            return Ok(Validation::Valid);
        };

        let start_at = if start_at < self.len() { start_at } else { 0 };
        let timestamp = match previous_timestamp {
            Some(input) => input.resolve().ok(),
            None if start_at == 0 => Some(first.timestamp()),
            None if verify_timestamp => return Err(LedgerError::MissingPreviousTimestamp),
            None => None,
        };

        let cursor = Cursor {
            balance: previous_balance,
            timestamp,
        };
        let entries = self.history.iter().enumerate().skip(start_at);

        Ok(validation::fold(entries, cursor, verify_timestamp))
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Ledger {
    fn eq(&self, other: &Self) -> bool {
        self.options == other.options
            && self.len() == other.len()
            && self.entries().eq(other.entries())
    }
}

impl Eq for Ledger {}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Entry;
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

/// Fluent construction of a [`Ledger`].
///
/// # Example
///
/// ```
/// use hp_ledger_rs::{Entry, Ledger};
/// use rust_decimal_macros::dec;
///
/// let ledger = Ledger::builder()
///     .initial_balance(dec!(10))
///     .initial_timestamp("2018-01-01T00:00:00.000Z")
///     .entry(Entry::new(10, 5, 15, "2018-01-01T00:00:00.001Z").unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(ledger.last_balance(), dec!(15));
/// ```
#[derive(Debug, Clone)]
pub struct LedgerBuilder {
    entries: Vec<Entry>,
    initial_balance: Decimal,
    initial_timestamp: Option<TimestampInput>,
    verify_timestamp: bool,
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            initial_balance: Decimal::ZERO,
            initial_timestamp: None,
            verify_timestamp: DEFAULT_VERIFY_TIMESTAMP,
        }
    }
}

impl LedgerBuilder {
    pub fn entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        self.entries.extend(entries);
        self
    }

    pub fn initial_balance(mut self, balance: Decimal) -> Self {
        self.initial_balance = balance;
        self
    }

    pub fn initial_timestamp(mut self, timestamp: impl Into<TimestampInput>) -> Self {
        self.initial_timestamp = Some(timestamp.into());
        self
    }

    pub fn verify_timestamp(mut self, verify: bool) -> Self {
        self.verify_timestamp = verify;
        self
    }

    /// Builds and validates the ledger.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidTimestamp`] - The initial timestamp is not readable.
    /// - [`LedgerError::InconsistentEntry`] - The history is inconsistent.
    pub fn build(self) -> Result<Ledger, LedgerError> {
        let initial_timestamp = self
            .initial_timestamp
            .map(|input| input.resolve())
            .transpose()?;

        Ledger::with_options(
            self.entries,
            LedgerOptions {
                initial_balance: self.initial_balance,
                initial_timestamp,
                verify_timestamp: self.verify_timestamp,
            },
        )
    }
}

/// Serialized form of a ledger: its entries plus baseline options.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerSnapshot {
    #[serde(default)]
    entries: Vec<Entry>,
    #[serde(default, serialize_with = "amount::serialize", deserialize_with = "amount::deserialize")]
    initial_balance: Decimal,
    #[serde(default)]
    initial_timestamp: Option<Timestamp>,
    #[serde(default = "default_verify_timestamp")]
    verify_timestamp: bool,
}

fn default_verify_timestamp() -> bool {
    DEFAULT_VERIFY_TIMESTAMP
}

impl From<Ledger> for LedgerSnapshot {
    fn from(ledger: Ledger) -> Self {
        Self {
            entries: ledger.entries().cloned().collect(),
            initial_balance: ledger.options.initial_balance,
            initial_timestamp: ledger.options.initial_timestamp,
            verify_timestamp: ledger.options.verify_timestamp,
        }
    }
}

impl TryFrom<LedgerSnapshot> for Ledger {
    type Error = LedgerError;

    fn try_from(snapshot: LedgerSnapshot) -> Result<Self, Self::Error> {
        Ledger::with_options(
            snapshot.entries,
            LedgerOptions {
                initial_balance: snapshot.initial_balance,
                initial_timestamp: snapshot.initial_timestamp,
                verify_timestamp: snapshot.verify_timestamp,
            },
        )
    }
}
