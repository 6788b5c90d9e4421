//! Row and cell bookkeeping shared by the resolver and the extractor
//!
//! A tab's grid is a `<table>`: the header row lives in `<thead>`, data rows
//! in `<tbody>`. Only lines carrying a non-empty `style` attribute are real
//! grid lines; frozen panes are rendered a second time without one.

use crate::document;
use crate::error::{Result, SheetError};
use crate::tabs::SheetTab;
use markup5ever_rcdom::Handle;

/// Class of the decorative cells separating frozen panes
pub const FREEZEBAR_CLASS: &str = "freezebar-cell";

/// The table holding a tab's grid
pub fn grid_table(tab: &SheetTab) -> Result<Handle> {
    if document::is_element(&tab.grid_root, "table") {
        return Ok(tab.grid_root.clone());
    }
    document::find_descendant(&tab.grid_root, &|node| document::is_element(node, "table"))
        .ok_or_else(|| {
            SheetError::InvalidDocumentStructure(format!(
                "tab {} has no grid table",
                tab.internal_id
            ))
        })
}

/// Data rows of the table in document order, visible or not
pub fn body_rows(table: &Handle) -> Vec<Handle> {
    document::child_elements(table)
        .into_iter()
        .filter(|section| document::is_element(section, "tbody"))
        .flat_map(|section| document::child_elements(&section))
        .filter(|row| document::is_element(row, "tr"))
        .collect()
}

/// Visible data rows only, in document order
pub fn visible_rows(table: &Handle) -> impl Iterator<Item = Handle> {
    body_rows(table).into_iter().filter(is_visible)
}

/// Cells of the first header row, empty when the table has no header
pub fn header_cells(table: &Handle) -> Vec<Handle> {
    document::first_child_element(table, "thead")
        .and_then(|head| document::first_child_element(&head, "tr"))
        .map(|row| document::child_elements(&row))
        .unwrap_or_default()
}

/// Whether a row or header cell is a genuine grid line
pub fn is_visible(node: &Handle) -> bool {
    !document::attr(node, "style").trim().is_empty()
}

/// Whether a row child holds sheet data (not a row header or freeze bar)
pub fn is_data_cell(cell: &Handle) -> bool {
    !document::is_element(cell, "th") && !document::has_class(cell, FREEZEBAR_CLASS)
}

/// Label shown in a row's leading header cell, empty when there is none
pub fn row_label(row: &Handle) -> String {
    document::child_elements(row)
        .first()
        .filter(|cell| document::is_element(cell, "th"))
        .map(|cell| document::text_content(cell).trim().to_string())
        .unwrap_or_default()
}

/// Label of a column header cell
pub fn column_label(cell: &Handle) -> String {
    document::text_content(cell).trim().to_string()
}

/// Value of a `rowspan`/`colspan` attribute; absent or unusable values count as 1
pub fn span(cell: &Handle, key: &str) -> u32 {
    document::attr(cell, key)
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(1)
}
