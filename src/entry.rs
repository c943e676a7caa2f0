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

//! Ledger entries.
//!
//! An [`Entry`] records one balance transition. It is immutable once built and does
//! not check its own arithmetic; that is the ledger's job.
//!
//! # Example
//!
//! ```
//! use hp_ledger_rs::Entry;
//! use rust_decimal_macros::dec;
//!
//! let entry = Entry::new(0, 0.00005, "0.00005", "2018-01-01T00:00:00Z").unwrap();
//! assert_eq!(entry.current(), dec!(0.00005));
//! assert_eq!(entry.timestamp().to_string(), "2018-01-01T00:00:00.000Z");
//! ```

use crate::amount::{self, IntoAmount};
use crate::timestamp::{Timestamp, TimestampInput};
use crate::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One balance transition: `previous + change = current` at `timestamp`.
///
/// Serializes as `{ timestamp, previous, change, current }` with numeric amounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    timestamp: Timestamp,
    #[serde(serialize_with = "amount::serialize", deserialize_with = "amount::deserialize")]
    previous: Decimal,
    #[serde(serialize_with = "amount::serialize", deserialize_with = "amount::deserialize")]
    change: Decimal,
    #[serde(serialize_with = "amount::serialize", deserialize_with = "amount::deserialize")]
    current: Decimal,
}

impl Entry {
    /// Builds an entry from any numeric input and any timestamp input.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - An amount is not a decimal number.
    /// - [`LedgerError::InvalidBalance`] - An amount is not finite or out of range.
    /// - [`LedgerError::InvalidTimestamp`] - The timestamp is not a valid point in time.
    pub fn new<P, C, R, T>(previous: P, change: C, current: R, timestamp: T) -> Result<Self, LedgerError>
    where
        P: IntoAmount,
        C: IntoAmount,
        R: IntoAmount,
        T: Into<TimestampInput>,
    {
        Ok(Self {
            previous: previous.into_amount()?,
            change: change.into_amount()?,
            current: current.into_amount()?,
            timestamp: timestamp.into().resolve()?,
        })
    }

    /// Builds an entry stamped with the current time.
    pub fn now<P, C, R>(previous: P, change: C, current: R) -> Result<Self, LedgerError>
    where
        P: IntoAmount,
        C: IntoAmount,
        R: IntoAmount,
    {
        Self::new(previous, change, current, Timestamp::now())
    }

    pub(crate) fn from_parts(previous: Decimal, change: Decimal, current: Decimal, timestamp: Timestamp) -> Self {
        Self {
            previous,
            change,
            current,
            timestamp,
        }
    }

    pub fn previous(&self) -> Decimal {
        self.previous
    }

    pub fn change(&self) -> Decimal {
        self.change
    }

    pub fn current(&self) -> Decimal {
        self.current
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Whether `current == previous + change`, exactly.
    ///
    /// A sum that overflows, or that `Decimal` can only hold rounded, never matches.
    pub fn is_balanced(&self) -> bool {
        amount::exact_add(self.previous, self.change) == Some(self.current)
    }
}
