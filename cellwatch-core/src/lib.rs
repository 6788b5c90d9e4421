//! cellwatch-core: grid reconstruction for published spreadsheet snapshots
//!
//! Given the markup of a published sheet page, this crate discovers its tabs,
//! rebuilds the visible row/column grid (skipping frozen-pane duplicates and
//! honouring merged cells), resolves "A1"-style references against it and
//! extracts the text of the referenced range.
//!
//! Everything here is synchronous and works on an already fetched document.

pub mod column;
pub mod document;
pub mod error;
pub mod extract;
pub mod grid;
pub mod reference;
pub mod resolve;
pub mod tabs;

pub use document::Document;
pub use error::{Result, SheetError};
pub use extract::{FIELD_SEPARATOR, extract, extract_with_limits};
pub use reference::{CellReference, ExtractLimits, RangeReference, ResolvedBounds};
pub use resolve::{resolve_column, resolve_range, resolve_row};
pub use tabs::{SheetTab, format_tab_list, list_tabs};

/// Read the text of `range` from an already parsed document.
///
/// `tab_id` selects the tab; without it the document must have a single tab.
pub fn read_range(
    doc: &Document,
    tab_id: Option<&str>,
    range: &RangeReference,
    limits: &ExtractLimits,
) -> Result<String> {
    let tabs = list_tabs(doc)?;
    let tab = tabs::select(&tabs, tab_id)?;
    let bounds = resolve_range(tab, range)?;
    log::debug!(
        "Reading {} from tab {} as rows {}..={} cols {}..={}",
        range,
        tab.internal_id,
        bounds.first_row(),
        bounds.last_row(),
        bounds.first_col(),
        bounds.last_col()
    );
    extract_with_limits(tab, bounds, limits)
}
