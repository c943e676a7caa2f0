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

//! Error types for ledger construction and mutation.

use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Timestamp input cannot be read as a point in time
    #[error("timestamp is not readable: {0}")]
    InvalidTimestamp(String),

    /// Amount input cannot be read as a decimal number
    #[error("amount is not a readable decimal number: {0}")]
    InvalidAmount(String),

    /// Timestamp verification was requested without a previous timestamp
    #[error("previous timestamp was not provided, and is required")]
    MissingPreviousTimestamp,

    /// Balance is not a number, infinite, or out of the decimal range
    #[error("change produces an invalid balance number")]
    InvalidBalance,

    /// Balance would go below zero and negative balances are not allowed
    #[error("change produces a negative balance ({0}), and this is not allowed")]
    NegativeBalance(Decimal),

    /// Entry history is inconsistent starting at `index`
    #[error("entry validation failed at cursor index ({index})")]
    InconsistentEntry { index: usize },
}

#[cfg(test)]
mod tests {
    use super::LedgerError;
    use rust_decimal_macros::dec;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LedgerError::InvalidTimestamp("yesterday-ish".into()).to_string(),
            "timestamp is not readable: yesterday-ish"
        );
        assert_eq!(
            LedgerError::InvalidAmount("12,5".into()).to_string(),
            "amount is not a readable decimal number: 12,5"
        );
        assert_eq!(
            LedgerError::MissingPreviousTimestamp.to_string(),
            "previous timestamp was not provided, and is required"
        );
        assert_eq!(
            LedgerError::InvalidBalance.to_string(),
            "change produces an invalid balance number"
        );
        assert_eq!(
            LedgerError::NegativeBalance(dec!(-5)).to_string(),
            "change produces a negative balance (-5), and this is not allowed"
        );
        assert_eq!(
            LedgerError::InconsistentEntry { index: 3 }.to_string(),
            "entry validation failed at cursor index (3)"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::InconsistentEntry { index: 0 };
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
