//! Range extraction over a tab's visible grid

use crate::document;
use crate::error::Result;
use crate::grid;
use crate::reference::{ExtractLimits, ResolvedBounds};
use crate::tabs::SheetTab;

/// Separator placed between cell values in an extraction result
pub const FIELD_SEPARATOR: &str = "\t";

/// Grid positions already covered by an earlier merged cell.
///
/// Sized `(last_row + 1) x (last_col + 1)` and indexed by 1-based ordinals.
struct OccupancyMatrix {
    cols: usize,
    cells: Vec<bool>,
}

impl OccupancyMatrix {
    fn new(bounds: &ResolvedBounds) -> Self {
        let rows = bounds.last_row() as usize + 1;
        let cols = bounds.last_col() as usize + 1;
        Self {
            cols,
            cells: vec![false; rows * cols],
        }
    }

    fn is_occupied(&self, row: u32, col: u32) -> bool {
        self.cells[row as usize * self.cols + col as usize]
    }

    /// Mark `row_span x col_span` positions from (row, col), clamped to the bounds
    fn mark(&mut self, row: u32, col: u32, row_span: u32, col_span: u32, bounds: &ResolvedBounds) {
        let last_row = row.saturating_add(row_span - 1).min(bounds.last_row());
        let last_col = col.saturating_add(col_span - 1).min(bounds.last_col());
        for r in row..=last_row {
            for c in col..=last_col {
                self.cells[r as usize * self.cols + c as usize] = true;
            }
        }
    }
}

/// Extract the text of every cell within `bounds`, in row-major order,
/// joined by [`FIELD_SEPARATOR`].
///
/// Bounds larger than [`ExtractLimits::default`] are rejected.
pub fn extract(tab: &SheetTab, bounds: ResolvedBounds) -> Result<String> {
    extract_with_limits(tab, bounds, &ExtractLimits::default())
}

/// [`extract`] with caller-supplied resource limits
pub fn extract_with_limits(
    tab: &SheetTab,
    bounds: ResolvedBounds,
    limits: &ExtractLimits,
) -> Result<String> {
    limits.check(&bounds)?;
    let table = grid::grid_table(tab)?;

    let mut occupied = OccupancyMatrix::new(&bounds);
    let mut values: Vec<String> = Vec::new();

    for (row, tr) in (1u32..).zip(grid::visible_rows(&table)) {
        if row > bounds.last_row() {
            break;
        }

        let mut col = 0u32;
        for cell in document::child_elements(&tr) {
            if !grid::is_data_cell(&cell) {
                continue;
            }

            col += 1;
            while col <= bounds.last_col() && occupied.is_occupied(row, col) {
                col += 1;
            }
            if col > bounds.last_col() {
                break;
            }

            if bounds.contains(row, col) {
                values.push(document::text_content(&cell));
            }

            let row_span = grid::span(&cell, "rowspan");
            let col_span = grid::span(&cell, "colspan");
            if row_span > 1 || col_span > 1 {
                occupied.mark(row, col, row_span, col_span, &bounds);
            }
        }
    }

    Ok(values.join(FIELD_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::tabs::list_tabs;

    fn grid(rows: &[&str]) -> String {
        let body: String = rows
            .iter()
            .map(|cells| format!(r#"<tr style="height: 20px">{}</tr>"#, cells))
            .collect();
        format!(
            r#"<div id="sheets-viewport"><div id="0"><table><tbody>{}</tbody></table></div></div>"#,
            body
        )
    }

    fn run(raw: &str, bounds: ResolvedBounds) -> String {
        let doc = Document::parse(raw).unwrap();
        let tabs = list_tabs(&doc).unwrap();
        extract(&tabs[0], bounds).unwrap()
    }

    #[test]
    fn test_single_cell() {
        let raw = grid(&["<td>a</td><td>b</td>", "<td>c</td><td>d</td>"]);
        assert_eq!(run(&raw, ResolvedBounds::new(2, 2, 2, 2).unwrap()), "d");
        assert_eq!(run(&raw, ResolvedBounds::new(1, 1, 1, 1).unwrap()), "a");
    }

    #[test]
    fn test_rowspan_covers_position_below() {
        let raw = grid(&[r#"<td rowspan="2">merged</td><td>b1</td>"#, "<td>b2</td>"]);
        assert_eq!(run(&raw, ResolvedBounds::new(1, 1, 2, 1).unwrap()), "merged");
        assert_eq!(run(&raw, ResolvedBounds::new(2, 2, 2, 2).unwrap()), "b2");
    }

    #[test]
    fn test_colspan_shifts_following_cells() {
        let raw = grid(&[
            r#"<td colspan="2">wide</td><td>c1</td>"#,
            "<td>a2</td><td>b2</td><td>c2</td>",
        ]);
        assert_eq!(
            run(&raw, ResolvedBounds::new(1, 1, 1, 3).unwrap()),
            "wide\tc1"
        );
        assert_eq!(run(&raw, ResolvedBounds::new(1, 3, 1, 3).unwrap()), "c1");
        assert_eq!(run(&raw, ResolvedBounds::new(1, 2, 2, 2).unwrap()), "b2");
    }

    #[test]
    fn test_block_merge_inside_range() {
        let raw = grid(&[
            r#"<td>a1</td><td rowspan="2" colspan="2">block</td><td>d1</td>"#,
            "<td>a2</td><td>d2</td>",
            "<td>a3</td><td>b3</td><td>c3</td><td>d3</td>",
        ]);
        assert_eq!(
            run(&raw, ResolvedBounds::new(1, 1, 3, 4).unwrap()),
            "a1\tblock\td1\ta2\td2\ta3\tb3\tc3\td3"
        );
        assert_eq!(run(&raw, ResolvedBounds::new(2, 4, 2, 4).unwrap()), "d2");
    }

    #[test]
    fn test_empty_cells_keep_their_slot() {
        let raw = grid(&["<td></td><td>b</td><td></td>"]);
        assert_eq!(run(&raw, ResolvedBounds::new(1, 1, 1, 3).unwrap()), "\tb\t");
    }

    #[test]
    fn test_nested_markup_text() {
        let raw = grid(&[r#"<td><div class="softmerge-inner">long <b>text</b></div></td>"#]);
        assert_eq!(run(&raw, ResolvedBounds::new(1, 1, 1, 1).unwrap()), "long text");
    }

    #[test]
    fn test_frozen_panes_are_not_counted() {
        // Row 1 and column A frozen: the bar row and the unstyled copy of row 1
        // are not visible lines, freeze bar cells are not data cells.
        let raw = r#"<div id="sheets-viewport"><div id="0"><table><tbody>
            <tr style="height: 20px"><th>1</th><td>a1</td><td class="freezebar-cell"></td><td rowspan="3">b1</td><td>c1</td></tr>
            <tr><th class="freezebar-vertical-handle"></th><td class="freezebar-cell"></td><td class="freezebar-cell"></td></tr>
            <tr><th>1</th><td>dup-a1</td><td class="freezebar-cell"></td><td>dup-b1</td></tr>
            <tr style="height: 20px"><th>2</th><td>a2</td><td class="freezebar-cell"></td><td>c2</td></tr>
            <tr style="height: 20px"><th>3</th><td>a3</td><td class="freezebar-cell"></td><td>c3</td></tr>
        </tbody></table></div></div>"#;

        assert_eq!(
            run(raw, ResolvedBounds::new(1, 1, 3, 3).unwrap()),
            "a1\tb1\tc1\ta2\tc2\ta3\tc3"
        );
        assert_eq!(run(raw, ResolvedBounds::new(2, 3, 2, 3).unwrap()), "c2");
        assert_eq!(run(raw, ResolvedBounds::new(2, 2, 3, 2).unwrap()), "");
    }

    #[test]
    fn test_out_of_grid_bounds_yield_empty_text() {
        let raw = grid(&["<td>a</td>"]);
        assert_eq!(run(&raw, ResolvedBounds::new(5, 5, 5, 5).unwrap()), "");
    }

    #[test]
    fn test_limits_checked_before_walking() {
        let raw = grid(&["<td>a</td>"]);
        let doc = Document::parse(&raw).unwrap();
        let tabs = list_tabs(&doc).unwrap();
        let limits = ExtractLimits { max_cells: 10 };
        let bounds = ResolvedBounds::new(1, 1, 10, 10).unwrap();
        assert!(extract_with_limits(&tabs[0], bounds, &limits).is_err());
    }
}
