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

//! Exact decimal amounts.
//!
//! Every balance quantity passes through [`Decimal`] before it is stored or compared,
//! so values such as `0.00005` never pick up binary floating point drift.
//!
//! # Example
//!
//! ```
//! use hp_ledger_rs::IntoAmount;
//! use rust_decimal_macros::dec;
//!
//! assert_eq!(0.00005_f64.into_amount().unwrap(), dec!(0.00005));
//! assert_eq!("2.50".into_amount().unwrap(), dec!(2.5));
//! assert_eq!(7_i32.into_amount().unwrap(), dec!(7));
//! ```

use crate::LedgerError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serializer;
use serde::de::{self, Deserializer, Visitor};
use std::fmt;
use std::str::FromStr;

/// Conversion of numeric input into an exact [`Decimal`].
///
/// Implemented for integers, floats, decimal strings and [`Decimal`] itself.
pub trait IntoAmount {
    /// Converts the value.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - Text is not a decimal number.
    /// - [`LedgerError::InvalidBalance`] - Value is not a number, infinite, out of range, or
    ///   needs more than 28 decimal places.
    fn into_amount(self) -> Result<Decimal, LedgerError>;
}

impl IntoAmount for Decimal {
    fn into_amount(self) -> Result<Decimal, LedgerError> {
        Ok(self)
    }
}

impl IntoAmount for &Decimal {
    fn into_amount(self) -> Result<Decimal, LedgerError> {
        Ok(*self)
    }
}

macro_rules! impl_integer_amount {
    ($($ty:ty),*) => {
        $(
            impl IntoAmount for $ty {
                fn into_amount(self) -> Result<Decimal, LedgerError> {
                    Ok(Decimal::from(self))
                }
            }
        )*
    };
}

impl_integer_amount!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl IntoAmount for f64 {
    fn into_amount(self) -> Result<Decimal, LedgerError> {
        if !self.is_finite() {
            return Err(LedgerError::InvalidBalance);
        }
        // Display yields the shortest text that round-trips, e.g. "0.00005".
        // Values needing more than 28 fractional digits are refused, not rounded.
        Decimal::from_str_exact(&self.to_string()).map_err(|_| LedgerError::InvalidBalance)
    }
}

impl IntoAmount for f32 {
    fn into_amount(self) -> Result<Decimal, LedgerError> {
        if !self.is_finite() {
            return Err(LedgerError::InvalidBalance);
        }
        Decimal::from_str_exact(&self.to_string()).map_err(|_| LedgerError::InvalidBalance)
    }
}

impl IntoAmount for &str {
    fn into_amount(self) -> Result<Decimal, LedgerError> {
        parse_text(self)
    }
}

impl IntoAmount for String {
    fn into_amount(self) -> Result<Decimal, LedgerError> {
        parse_text(&self)
    }
}

impl IntoAmount for &String {
    fn into_amount(self) -> Result<Decimal, LedgerError> {
        parse_text(self)
    }
}

fn parse_text(text: &str) -> Result<Decimal, LedgerError> {
    let trimmed = text.trim();

    match trimmed.to_ascii_lowercase().trim_start_matches(['+', '-']) {
        "nan" | "inf" | "infinity" => return Err(LedgerError::InvalidBalance),
        _ => {}
    }

    match Decimal::from_str_exact(trimmed) {
        Ok(value) => Ok(value),
        // Readable, but only by rounding away digits.
        Err(_) if Decimal::from_str(trimmed).is_ok() => Err(LedgerError::InvalidBalance),
        Err(_) => Decimal::from_scientific(trimmed).map_err(|_| LedgerError::InvalidAmount(text.to_string())),
    }
}

/// `a + b`, or `None` when the sum overflows or cannot be held without rounding.
///
/// `Decimal` keeps at most 28 significant digits and its checked operations round
/// rather than fail when a result needs more, so the sum is verified by subtracting
/// `a` back out.
pub(crate) fn exact_add(a: Decimal, b: Decimal) -> Option<Decimal> {
    let sum = a.checked_add(b)?;
    (sum.checked_sub(a) == Some(b)).then_some(sum)
}

/// `a - b`, or `None` when `b + (a - b) == a` does not hold exactly.
pub(crate) fn exact_sub(a: Decimal, b: Decimal) -> Option<Decimal> {
    let difference = a.checked_sub(b)?;
    (exact_add(b, difference) == Some(a)).then_some(difference)
}

/// Serializes an amount as a JSON number.
///
/// Integers go out as integers. Fractions go out as floats when the float reads back
/// to the same decimal; anything else falls back to a decimal string, which
/// [`deserialize`] accepts as well.
pub(crate) fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract().is_zero() {
        if let Some(integer) = value.to_i64() {
            return serializer.serialize_i64(integer);
        }
    }
    match value.to_f64() {
        Some(float) if float.into_amount() == Ok(*value) => serializer.serialize_f64(float),
        _ => serializer.collect_str(value),
    }
}

/// Deserializes an amount from a JSON number or a decimal string.
///
/// Persisted histories may carry plain numbers; strings keep full precision.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Decimal, E> {
        value.into_amount().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Decimal, E> {
        value.into_amount().map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Decimal, E> {
        value.into_amount().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Decimal, E> {
        value.into_amount().map_err(E::custom)
    }
}
