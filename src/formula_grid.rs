use crate::common::error::RangeError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Column letters available to generated formulas. Nothing past `M` is ever produced.
pub const ALPHABET: [char; 13] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
];

/// Index of the `0, 1` seed row; written as sheet row 4.
const SEED_ROW_INDEX: usize = 3;

const DEFAULT_RECURRENCE_ROWS: usize = 15;

/// A single cell as written with `USER_ENTERED`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(i64),
    /// Formula text beginning with `=`. Evaluated by the spreadsheet, never here.
    Formula(String),
}

impl CellValue {
    pub fn text(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }

    /// `=<lhs>+<rhs>`
    pub fn sum(lhs: CellAddress, rhs: CellAddress) -> Self {
        CellValue::Formula(format!("={}+{}", lhs, rhs))
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula(_))
    }

    /// Addresses referenced by a formula, in order of appearance.
    pub fn references(&self) -> Vec<CellAddress> {
        match self {
            CellValue::Formula(f) => f
                .trim_start_matches('=')
                .split('+')
                .filter_map(|term| term.trim().parse().ok())
                .collect(),
            _ => vec![],
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Text(s) | CellValue::Formula(s) => Value::String(s.clone()),
            CellValue::Number(n) => Value::from(*n),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CellValue::Text(s) | CellValue::Formula(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A1 style address, 1-indexed row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub column: char,
    pub row: usize,
}

impl CellAddress {
    /// Address of `ALPHABET[column_index]` at sheet row `row`.
    pub fn new(column_index: usize, row: usize) -> Result<Self, RangeError> {
        let column = ALPHABET
            .get(column_index)
            .copied()
            .ok_or(RangeError::AlphabetExhausted {
                index: column_index,
                available: ALPHABET.len(),
            })?;
        Ok(CellAddress { column, row })
    }

    /// Zero based position in the alphabet, `None` for letters outside it.
    pub fn column_index(&self) -> Option<usize> {
        ALPHABET.iter().position(|c| *c == self.column)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAddressError(String);

impl fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid cell address: {}", self.0)
    }
}

impl std::error::Error for ParseAddressError {}

impl FromStr for CellAddress {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let column = chars
            .next()
            .filter(|c| ALPHABET.contains(c))
            .ok_or_else(|| ParseAddressError(s.to_string()))?;
        let row: usize = chars
            .as_str()
            .parse()
            .map_err(|_| ParseAddressError(s.to_string()))?;
        if row == 0 {
            return Err(ParseAddressError(s.to_string()));
        }
        Ok(CellAddress { column, row })
    }
}

/// Rows of cell values, anchored at `A1` of the destination range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormulaGrid {
    rows: Vec<Vec<CellValue>>,
}

impl FormulaGrid {
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, address: &CellAddress) -> Option<&CellValue> {
        self.rows
            .get(address.row.checked_sub(1)?)?
            .get(address.column_index()?)
    }

    pub fn contains(&self, address: &CellAddress) -> bool {
        self.cell(address).is_some()
    }

    /// Values in the shape `ValueRange.values` expects.
    pub fn to_values(&self) -> Vec<Vec<Value>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(CellValue::to_json).collect())
            .collect()
    }
}

/// Builds the Fibonacci example grid.
///
/// Five literal rows are laid down first. The `0, 1` row is then extended across the
/// alphabet with `=A4+B4`, `=B4+C4`, ... and single-cell rows are appended below with
/// `=A4+A5`, `=A5+A6`, ... so the sequence runs both across and down.
#[derive(Clone, Debug)]
pub struct FormulaGridBuilder {
    recurrence_columns: usize,
    recurrence_rows: usize,
}

impl Default for FormulaGridBuilder {
    fn default() -> Self {
        FormulaGridBuilder {
            recurrence_columns: ALPHABET.len() - 1,
            recurrence_rows: DEFAULT_RECURRENCE_ROWS,
        }
    }
}

impl FormulaGridBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Number of formulas appended to the seed row.
    pub fn recurrence_columns(&mut self, n: usize) -> &mut Self {
        self.recurrence_columns = n;
        self
    }

    /// Number of single-formula rows appended below the base rows.
    pub fn recurrence_rows(&mut self, n: usize) -> &mut Self {
        self.recurrence_rows = n;
        self
    }

    fn base_rows() -> Vec<Vec<CellValue>> {
        vec![
            vec![CellValue::text("DMann")],
            vec![CellValue::text("Fibonacci"), CellValue::text("Sequence")],
            vec![
                CellValue::text("Sheets API"),
                CellValue::text("Example"),
                CellValue::text("Writing"),
                CellValue::text("Columns & Rows"),
            ],
            vec![CellValue::Number(0), CellValue::Number(1)],
            vec![CellValue::Number(1)],
        ]
    }

    pub fn build(&self) -> Result<FormulaGrid, RangeError> {
        let mut rows = Self::base_rows();
        let seed_row = SEED_ROW_INDEX + 1;

        for i in 0..self.recurrence_columns {
            let lhs = CellAddress::new(i, seed_row)?;
            let rhs = CellAddress::new(i + 1, seed_row)?;
            rows[SEED_ROW_INDEX].push(CellValue::sum(lhs, rhs));
        }

        for j in 0..self.recurrence_rows {
            let lhs = CellAddress::new(0, j + seed_row)?;
            let rhs = CellAddress::new(0, j + seed_row + 1)?;
            rows.push(vec![CellValue::sum(lhs, rhs)]);
        }

        log::debug!(
            "built formula grid with {} rows, seed row of {} cells",
            rows.len(),
            rows[SEED_ROW_INDEX].len()
        );
        Ok(FormulaGrid { rows })
    }
}

#[cfg(test)]
#[path = "formula_grid_test.rs"]
mod formula_grid_test;
