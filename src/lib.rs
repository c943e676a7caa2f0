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

//! # HP Ledger
//!
//! This library provides an immutable, self-validating append-only ledger: a history
//! of balance changes where every entry records the previous balance, the change,
//! the resulting balance and a timestamp.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Ordered, immutable entry history that validates itself on construction
//! - [`Entry`]: One balance transition with a normalized timestamp
//! - [`validate_entry`]: Checks a single entry against a previous ledger state
//! - [`Validation`]: Result of validating a sequence, with the first failing index
//! - [`LedgerError`]: Error types for construction and mutation failures
//!
//! ## Example
//!
//! ```
//! use hp_ledger_rs::{ChangeOptions, Entry, Ledger, Validation};
//! use rust_decimal_macros::dec;
//!
//! // Load a stored history
//! let ledger = Ledger::from_entries([
//!     Entry::new(0, 5, 5, "2018-01-01T00:00:00.000Z").unwrap(),
//!     Entry::new(5, -2.5, 2.5, "2018-01-01T00:00:00.001Z").unwrap(),
//! ])
//! .unwrap();
//! assert_eq!(ledger.validate(), Validation::Valid);
//!
//! // Derive a new ledger with one more entry
//! let next = ledger.change(dec!(0.00005), ChangeOptions::new()).unwrap();
//! assert_eq!(next.last_balance(), dec!(2.50005));
//! assert_eq!(ledger.last_balance(), dec!(2.5));
//! ```
//!
//! ## Arithmetic
//!
//! Balances are [`rust_decimal::Decimal`] values. Inputs given as floats are read
//! through their shortest decimal text, so `0.00005` stays exactly `0.00005` and
//! repeated changes never drift.
//!
//! ## Thread Safety
//!
//! Ledgers are immutable and share their history through reference counting, so they
//! can be read from and derived from on any number of threads.

mod amount;
mod entry;
pub mod error;
mod history;
mod ledger;
mod options;
mod timestamp;
mod validation;

pub use amount::IntoAmount;
pub use entry::Entry;
pub use error::LedgerError;
pub use history::Entries;
pub use ledger::{Ledger, LedgerBuilder, check_balance};
pub use options::{
    ChangeOptions, DEFAULT_ALLOW_NEGATIVE_BALANCE, DEFAULT_VERIFY_TIMESTAMP, LedgerOptions,
};
pub use timestamp::{Timestamp, TimestampInput};
pub use validation::{Validation, validate_entry};
