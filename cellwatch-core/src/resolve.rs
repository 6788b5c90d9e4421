//! Resolution of row and column labels to visible grid ordinals

use crate::column;
use crate::error::{Result, SheetError};
use crate::grid;
use crate::reference::{RangeReference, ResolvedBounds};
use crate::tabs::SheetTab;
use log::debug;

/// Resolve a row label ("12") to its 1-based visible ordinal.
///
/// Rows are matched by the label in their header cell; when no visible row
/// carries the label, the label itself is read as the ordinal.
pub fn resolve_row(tab: &SheetTab, label: &str) -> Result<u32> {
    let label = label.trim();
    let table = grid::grid_table(tab)?;
    for (ordinal, row) in (1u32..).zip(grid::visible_rows(&table)) {
        if grid::row_label(&row) == label {
            return Ok(ordinal);
        }
    }

    debug!("Row label {} not in headers, using it as ordinal", label);
    label
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| SheetError::RowNotFound(label.to_string()))
}

/// Resolve a column label ("C") to its 1-based visible ordinal.
///
/// Columns are matched against the visible header cells of the first header
/// row, falling back to the letters' positional value.
pub fn resolve_column(tab: &SheetTab, label: &str) -> Result<u32> {
    let label = label.trim();
    let table = grid::grid_table(tab)?;
    let visible = grid::header_cells(&table)
        .into_iter()
        .filter(grid::is_visible);
    for (ordinal, cell) in (1u32..).zip(visible) {
        if grid::column_label(&cell) == label {
            return Ok(ordinal);
        }
    }

    debug!("Column label {} not in headers, using letter value", label);
    column::to_ordinal(&label.to_ascii_uppercase())
        .ok_or_else(|| SheetError::ColumnNotFound(label.to_string()))
}

/// Resolve both corners of a range and normalize the result
pub fn resolve_range(tab: &SheetTab, range: &RangeReference) -> Result<ResolvedBounds> {
    let x1 = resolve_row(tab, range.start.row())?;
    let y1 = resolve_column(tab, range.start.column())?;
    let x2 = resolve_row(tab, range.end.row())?;
    let y2 = resolve_column(tab, range.end.column())?;
    ResolvedBounds::new(x1, y1, x2, y2)
}
