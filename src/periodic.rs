use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use lazy_static::lazy_static;
use thiserror::Error;
use tracing::*;

#[derive(Error, Debug)]
pub enum PeriodicTableError {
    #[error("Failed to read periodic table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed periodic table CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Record {record} is missing column '{column}'")]
    MissingColumn { record: usize, column: &'static str },
    #[error("Record {record} has an invalid {column}: '{value}'")]
    InvalidField {
        record: usize,
        column: &'static str,
        value: String,
    },
    #[error("Periodic table header must contain {0}")]
    MissingHeader(&'static str),
}

/// One row of the periodic table.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRecord {
    pub atomic_number: u8,
    pub symbol: String,
    pub name: String,
    pub atomic_mass: f64,
}

/// An immutable lookup from element symbol to its record.
///
/// The SMILES parser only asks whether a symbol exists, to tell two-letter
/// elements (`Cl`) apart from two one-letter atoms (`CO`). The table is
/// passed to the parser explicitly, so tests can use a small synthetic one.
#[derive(Debug, Clone, Default)]
pub struct PeriodicTable {
    elements: BTreeMap<String, ElementRecord>,
}

lazy_static! {
    static ref BUILTIN_TABLE: PeriodicTable = {
        let csv_data = include_str!("periodic-table.csv");
        PeriodicTable::from_csv_str(csv_data).expect("embedded periodic table is well-formed")
    };
}

const SYMBOL: &str = "Symbol";
const NUMBER: &str = "AtomicNumber";
const NAME: &str = "Name";
const MASS: &str = "AtomicMass";

impl PeriodicTable {
    /// The full table of 118 elements shipped with the crate.
    pub fn builtin() -> &'static PeriodicTable {
        &BUILTIN_TABLE
    }

    /// A table containing only the given symbols, with placeholder properties.
    pub fn from_symbols<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Self {
        let elements = symbols
            .into_iter()
            .enumerate()
            .map(|(i, symbol)| {
                let record = ElementRecord {
                    atomic_number: (i + 1).min(u8::MAX as usize) as u8,
                    symbol: symbol.to_string(),
                    name: symbol.to_string(),
                    atomic_mass: 0.0,
                };
                (symbol.to_string(), record)
            })
            .collect();
        Self { elements }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PeriodicTableError> {
        let mut contents = String::new();
        File::open(path.as_ref())?.read_to_string(&mut contents)?;
        Self::from_csv_str(&contents)
    }

    /// Parse a CSV table with the columns `AtomicNumber`, `Symbol`, `Name`
    /// and `AtomicMass`, in any order. Rows with an empty symbol are skipped.
    pub fn from_csv_str(csv_data: &str) -> Result<Self, PeriodicTableError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());

        let headers = rdr.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(PeriodicTableError::MissingHeader(name))
        };
        let symbol_col = column(SYMBOL)?;
        let number_col = column(NUMBER)?;
        let name_col = column(NAME)?;
        let mass_col = column(MASS)?;

        let mut elements = BTreeMap::new();
        for (i, result) in rdr.records().enumerate() {
            let record: StringRecord = result?;
            let field = |col: usize, name: &'static str| {
                record.get(col).ok_or(PeriodicTableError::MissingColumn {
                    record: i,
                    column: name,
                })
            };

            let symbol = field(symbol_col, SYMBOL)?;
            if symbol.is_empty() {
                warn!("Skipping periodic table record {} with an empty symbol: {:?}", i, record);
                continue;
            }
            let number = field(number_col, NUMBER)?;
            let atomic_number = number.parse().map_err(|_| PeriodicTableError::InvalidField {
                record: i,
                column: NUMBER,
                value: number.to_string(),
            })?;
            let mass = field(mass_col, MASS)?;
            let atomic_mass = mass.parse().map_err(|_| PeriodicTableError::InvalidField {
                record: i,
                column: MASS,
                value: mass.to_string(),
            })?;

            elements.insert(
                symbol.to_string(),
                ElementRecord {
                    atomic_number,
                    symbol: symbol.to_string(),
                    name: field(name_col, NAME)?.to_string(),
                    atomic_mass,
                },
            );
        }
        debug!("Loaded periodic table with {} elements", elements.len());
        Ok(Self { elements })
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, symbol: &str) -> bool {
        self.elements.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&ElementRecord> {
        self.elements.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }
}
