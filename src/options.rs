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

//! Ledger and mutation settings.

use crate::amount;
use crate::timestamp::{Timestamp, TimestampInput};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timestamps are verified unless a ledger opts out.
pub const DEFAULT_VERIFY_TIMESTAMP: bool = true;

/// Mutations reject negative balances unless a caller opts in.
pub const DEFAULT_ALLOW_NEGATIVE_BALANCE: bool = false;

/// Baseline configuration carried by a ledger and every ledger derived from it.
///
/// Deserializes with defaults for missing fields, so `{}` is the default ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerOptions {
    /// Balance assumed before the first entry.
    #[serde(serialize_with = "amount::serialize", deserialize_with = "amount::deserialize")]
    pub initial_balance: Decimal,
    /// Time assumed before the first entry. Without it, the first entry's own
    /// timestamp is the baseline.
    pub initial_timestamp: Option<Timestamp>,
    /// Whether entries must be non-decreasing in time.
    pub verify_timestamp: bool,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::ZERO,
            initial_timestamp: None,
            verify_timestamp: DEFAULT_VERIFY_TIMESTAMP,
        }
    }
}

/// Settings for a single `change` or `set`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOptions {
    /// Allow the resulting balance to go below zero.
    pub allow_negative_balance: bool,
    /// Timestamp for the new entry; the current time when `None`.
    pub timestamp: Option<TimestampInput>,
}

impl ChangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_negative_balance(mut self, allow: bool) -> Self {
        self.allow_negative_balance = allow;
        self
    }

    /// Stamps the new entry with `timestamp`.
    pub fn at(mut self, timestamp: impl Into<TimestampInput>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

impl Default for ChangeOptions {
    fn default() -> Self {
        Self {
            allow_negative_balance: DEFAULT_ALLOW_NEGATIVE_BALANCE,
            timestamp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ledger_defaults() {
        let options = LedgerOptions::default();
        assert_eq!(options.initial_balance, Decimal::ZERO);
        assert_eq!(options.initial_timestamp, None);
        assert!(options.verify_timestamp);
    }

    #[test]
    fn ledger_options_fill_missing_fields() {
        let options: LedgerOptions = serde_json::from_str(r#"{"initial_balance": 12.5}"#).unwrap();
        assert_eq!(options.initial_balance, dec!(12.5));
        assert!(options.verify_timestamp);

        let options: LedgerOptions = serde_json::from_str(
            r#"{"initial_timestamp": "2018-01-01T00:00:00Z", "verify_timestamp": false}"#,
        )
        .unwrap();
        assert_eq!(
            options.initial_timestamp.map(|t| t.to_string()),
            Some("2018-01-01T00:00:00.000Z".to_string())
        );
        assert!(!options.verify_timestamp);
    }

    #[test]
    fn change_options_builder() {
        let options = ChangeOptions::new()
            .allow_negative_balance(true)
            .at("2018-01-01T00:00:00Z");
        assert!(options.allow_negative_balance);
        assert_eq!(
            options.timestamp,
            Some(TimestampInput::Text("2018-01-01T00:00:00Z".into()))
        );
        assert!(!ChangeOptions::default().allow_negative_balance);
    }
}
