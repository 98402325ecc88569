//! Worksheet type

use std::collections::{BTreeMap, BTreeSet};

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::style::Style;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
///
/// Holds a sparse grid of cells, the sheet's merged regions, and its
/// explicitly sized rows and columns.
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage
    cells: CellStorage,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    ///
    /// The name is not validated here; [`crate::Workbook`] checks it when the
    /// sheet is added.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(addr.row, addr.col))
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get cell value (convenience method)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Get the style owned by a cell, if any
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        self.cells.get(row, col).and_then(CellData::style)
    }

    /// Get the style owned by a cell by address, if any
    pub fn cell_style(&self, address: &str) -> Result<Option<&Style>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_style_at(addr.row, addr.col))
    }

    /// Mutable access to one cell's style
    ///
    /// The returned style belongs to this cell alone; edits through it are
    /// never visible from any other cell.
    pub fn cell_style_mut_at(&mut self, row: u32, col: u16) -> Option<&mut Style> {
        self.cells
            .get_mut(row, col)
            .and_then(|c| c.style.as_deref_mut())
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a cell formula by address string
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula)
    }

    /// Set a cell formula by row and column indices
    ///
    /// The text is stored as given, with a leading `=` added if missing.
    pub fn set_cell_formula_at(&mut self, row: u32, col: u16, formula: &str) -> Result<()> {
        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        self.set_cell_value_at(row, col, CellValue::formula(formula))
    }

    /// Set a cell style by address string
    pub fn set_cell_style(&mut self, address: &str, style: Style) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Give a cell its own style, replacing any previous one
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: Style) -> Result<()> {
        validate_cell_position(row, col)?;
        self.cells.set_style(row, col, Some(style));
        Ok(())
    }

    /// Remove a cell's style, keeping its value
    pub fn clear_cell_style_at(&mut self, row: u32, col: u16) {
        self.cells.set_style(row, col, None);
    }

    /// Store a complete cell (value and optional style) in one step
    pub fn put_cell_at(&mut self, row: u32, col: u16, data: CellData) -> Result<()> {
        validate_cell_position(row, col)?;
        self.cells.set(row, col, data);
        Ok(())
    }

    /// Clear a cell by indices
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.cells.remove(row, col);
    }

    // === Range Operations ===

    /// Get the used range (bounds of all stored cells)
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    // === Row/Column Dimensions ===

    /// Get row height (the default if none was set)
    pub fn row_height(&self, row: u32) -> f64 {
        self.cells.row_height(row)
    }

    /// Set an explicit row height in points
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.cells.set_row_height(row, height);
    }

    /// Check if row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.cells.is_row_hidden(row)
    }

    /// Set row hidden state
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        self.cells.set_row_hidden(row, hidden);
    }

    /// Get column width (the default if none was set)
    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col)
    }

    /// Set an explicit column width in characters
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    /// Check if column is hidden
    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.cells.is_column_hidden(col)
    }

    /// Set column hidden state
    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) {
        self.cells.set_column_hidden(col, hidden);
    }

    /// Explicit row heights (row index → height in points)
    pub fn row_heights(&self) -> &BTreeMap<u32, f64> {
        self.cells.row_heights()
    }

    /// Hidden rows
    pub fn hidden_rows(&self) -> &BTreeSet<u32> {
        self.cells.hidden_rows()
    }

    /// Explicit column widths (column index → width in characters)
    pub fn column_widths(&self) -> &BTreeMap<u16, f64> {
        self.cells.column_widths()
    }

    /// Hidden columns
    pub fn hidden_columns(&self) -> &BTreeSet<u16> {
        self.cells.hidden_columns()
    }

    /// Height used for rows without an explicit height
    pub fn default_row_height(&self) -> f64 {
        self.cells.default_row_height()
    }

    /// Width used for columns without an explicit width
    pub fn default_column_width(&self) -> f64 {
        self.cells.default_column_width()
    }

    // === Merged Cells ===

    /// Get merged regions, in the order they were added
    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merged_regions()
    }

    /// Merge cells, rejecting ranges that overlap an existing merge
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if let Some(existing) = self
            .cells
            .merged_regions()
            .iter()
            .find(|existing| range.overlaps(existing))
        {
            return Err(Error::MergedCellConflict(format!("{} (with {})", range, existing)));
        }
        self.cells.add_merged_region(*range);
        Ok(())
    }

    /// Record a merged region exactly as given, without overlap checks
    ///
    /// Used when carrying regions over from an existing file, where whatever
    /// the source declared must come through unchanged.
    pub fn add_merged_region(&mut self, range: CellRange) {
        self.cells.add_merged_region(range);
    }

    /// Unmerge cells
    pub fn unmerge_cells(&mut self, range: &CellRange) -> bool {
        let found = self
            .cells
            .merged_regions()
            .iter()
            .position(|existing| existing == range);

        match found {
            Some(i) => self.cells.remove_merged_region(i).is_some(),
            None => false,
        }
    }

    // === Iteration ===

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the worksheet has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Iterate over cells in one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    /// Iterate over row indices that have cells
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.row_indices()
    }

    /// Iterate over all formula cells: (row, col, formula_text)
    pub fn formula_cells(&self) -> impl Iterator<Item = (u32, u16, &str)> {
        self.cells
            .iter()
            .filter_map(|(row, col, cell)| cell.value.formula_text().map(|f| (row, col, f)))
    }
}

fn validate_cell_position(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
    }
    Ok(())
}
