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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use hp_ledger_rs::{Entry, Ledger, LedgerError, LedgerOptions, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Ledger Verifier - Check a stored balance history
///
/// Reads ledger entries from a CSV file, validates the whole history and writes a
/// summary of the final state to stdout.
#[derive(Parser, Debug)]
#[command(name = "hp-ledger")]
#[command(about = "Verifies that a CSV balance history is internally consistent", long_about = None)]
struct Args {
    /// Path to CSV file with ledger entries
    ///
    /// Expected format: timestamp,previous,change,current
    /// Example: cargo run -- entries.csv > summary.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Balance assumed before the first entry
    #[arg(long, default_value_t = Decimal::ZERO)]
    initial_balance: Decimal,

    /// Time assumed before the first entry
    #[arg(long, value_parser = parse_timestamp)]
    initial_timestamp: Option<Timestamp>,

    /// Accept entries that go back in time
    #[arg(long)]
    no_verify_timestamp: bool,

    /// Log every validated entry to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> LedgerOptions {
        LedgerOptions {
            initial_balance: self.initial_balance,
            initial_timestamp: self.initial_timestamp,
            verify_timestamp: !self.no_verify_timestamp,
        }
    }
}

fn parse_timestamp(value: &str) -> Result<Timestamp, LedgerError> {
    Timestamp::parse(value)
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(2);
        }
    };

    // Load and validate the history
    let ledger = match load_ledger(BufReader::new(file), args.options()) {
        Ok(ledger) => ledger,
        Err(LoadError::Ledger(e)) => {
            error!(%e, "ledger is inconsistent");
            eprintln!("Invalid ledger: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error reading entries: {}", e);
            process::exit(2);
        }
    };

    info!(entries = ledger.len(), "ledger is consistent");

    // Write summary to stdout
    if let Err(e) = write_summary(&ledger, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(2);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Errors while loading a history from CSV.
#[derive(Debug, Error)]
enum LoadError {
    /// The CSV could not be read or a row has the wrong shape
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A row's values are unreadable
    #[error("row {row}: {source}")]
    Row { row: usize, source: LedgerError },

    /// The rows do not form a consistent history
    #[error(transparent)]
    Ledger(LedgerError),
}

/// Raw CSV record matching the entry shape.
///
/// Fields: `timestamp, previous, change, current`. Amounts are kept as text so they
/// reach the decimal parser without passing through a float.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    timestamp: String,
    previous: String,
    change: String,
    current: String,
}

impl CsvRecord {
    fn into_entry(self) -> Result<Entry, LedgerError> {
        Entry::new(self.previous, self.change, self.current, self.timestamp)
    }
}

/// Load a ledger from a CSV reader.
///
/// Unlike a transaction stream, a history cannot skip rows: a malformed row stops
/// loading, since every later entry depends on it.
///
/// # CSV Format
///
/// ```csv
/// timestamp,previous,change,current
/// 2018-01-01T00:00:00.000Z,0,5,5
/// 2018-01-01T00:00:00.001Z,5,-2.5,2.5
/// ```
///
/// # Errors
///
/// Returns a [`LoadError`] naming the CSV problem, the unreadable row (1-based, after
/// the header) or the first inconsistent entry index.
fn load_ledger<R: Read>(reader: R, options: LedgerOptions) -> Result<Ledger, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " 2.5 "
        .has_headers(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let entry = result?
            .into_entry()
            .map_err(|source| LoadError::Row { row: row + 1, source })?;
        debug!(row = row + 1, timestamp = %entry.timestamp(), "read entry");
        entries.push(entry);
    }

    Ledger::with_options(entries, options).map_err(LoadError::Ledger)
}

/// Summary of a validated ledger.
#[derive(Debug, Serialize)]
struct Summary {
    entries: usize,
    last_balance: Decimal,
    last_timestamp: Option<Timestamp>,
}

/// Write a ledger summary to a CSV writer
///
/// # CSV Format
///
/// Columns: `entries, last_balance, last_timestamp`
///
/// ```csv
/// entries,last_balance,last_timestamp
/// 2,2.5,2018-01-01T00:00:00.001Z
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_summary<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    wtr.serialize(Summary {
        entries: ledger.len(),
        last_balance: ledger.last_balance(),
        last_timestamp: ledger.last_timestamp(),
    })?;

    // Flush to ensure all data is written
    wtr.flush()?;
    Ok(())
}
