//! Cell and range references, before and after resolution against a grid

use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell label pair such as `B12`, not yet resolved to grid ordinals
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellReference {
    column: String,
    row: String,
}

impl CellReference {
    /// Build a reference from its column letters and row digits.
    ///
    /// Column letters are uppercased; both parts must be non-empty.
    pub fn new(column: &str, row: &str) -> Result<Self> {
        let column = column.to_ascii_uppercase();
        let valid = !column.is_empty()
            && column.bytes().all(|b| b.is_ascii_uppercase())
            && !row.is_empty()
            && row.bytes().all(|b| b.is_ascii_digit());
        if !valid {
            return Err(SheetError::InvalidReference(format!("{}{}", column, row)));
        }
        Ok(Self {
            column,
            row: row.to_string(),
        })
    }

    /// Parse a reference like "A1" (case-insensitive letters, then digits)
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| SheetError::InvalidReference(text.to_string()))?;
        let (column, row) = text.split_at(split);
        Self::new(column, row).map_err(|_| SheetError::InvalidReference(text.to_string()))
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn row(&self) -> &str {
        &self.row
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// A rectangular range between two cell references; a single cell has `start == end`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeReference {
    pub start: CellReference,
    pub end: CellReference,
}

impl RangeReference {
    pub fn new(start: CellReference, end: CellReference) -> Self {
        Self { start, end }
    }

    pub fn single(cell: CellReference) -> Self {
        Self {
            end: cell.clone(),
            start: cell,
        }
    }

    /// Parse "A1" or "A1:B2"
    pub fn parse(text: &str) -> Result<Self> {
        match text.split_once(':') {
            Some((start, end)) => Ok(Self::new(
                CellReference::parse(start)?,
                CellReference::parse(end)?,
            )),
            None => Ok(Self::single(CellReference::parse(text)?)),
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for RangeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Grid-ordinal bounds after resolution: rows `x1..=x2`, columns `y1..=y2`.
///
/// Always normalized so that `x1 <= x2` and `y1 <= y2`; all ordinals are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedBounds {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
}

impl ResolvedBounds {
    /// Build bounds from two (row, column) corners given in any order
    pub fn new(row_a: u32, col_a: u32, row_b: u32, col_b: u32) -> Result<Self> {
        if row_a == 0 || col_a == 0 || row_b == 0 || col_b == 0 {
            return Err(SheetError::InvalidReference(format!(
                "R{}C{}:R{}C{}",
                row_a, col_a, row_b, col_b
            )));
        }
        Ok(Self {
            x1: row_a.min(row_b),
            y1: col_a.min(col_b),
            x2: row_a.max(row_b),
            y2: col_a.max(col_b),
        })
    }

    pub fn first_row(&self) -> u32 {
        self.x1
    }

    pub fn first_col(&self) -> u32 {
        self.y1
    }

    pub fn last_row(&self) -> u32 {
        self.x2
    }

    pub fn last_col(&self) -> u32 {
        self.y2
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.x1 <= row && row <= self.x2 && self.y1 <= col && col <= self.y2
    }

    /// Number of cells in the occupancy matrix an extraction allocates
    pub fn matrix_cells(&self) -> u64 {
        (u64::from(self.x2) + 1) * (u64::from(self.y2) + 1)
    }
}

/// Resource limits applied before an extraction allocates its occupancy matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractLimits {
    pub max_cells: u64,
}

impl ExtractLimits {
    pub const DEFAULT_MAX_CELLS: u64 = 100_000;

    pub fn check(&self, bounds: &ResolvedBounds) -> Result<()> {
        let cells = bounds.matrix_cells();
        if cells > self.max_cells {
            return Err(SheetError::RangeTooLarge {
                cells,
                limit: self.max_cells,
            });
        }
        Ok(())
    }
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_cells: Self::DEFAULT_MAX_CELLS,
        }
    }
}
