//! Cell storage implementation
//!
//! This module provides sparse storage for spreadsheet cells.
//! Only populated cells are stored, using a row-based BTreeMap structure.

use std::collections::{BTreeMap, BTreeSet};

use super::CellValue;
use crate::style::Style;
use crate::{CellAddress, CellRange};

/// Complete data for a single cell
///
/// The style is owned by the cell. Two cells never point at the same
/// `Style`, so editing one cell's formatting cannot leak into another.
/// Deduplication of identical styles is left to the container writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// The cell's formatting, if any
    pub style: Option<Box<Style>>,
}

impl CellData {
    /// Create a new cell with a value and no style
    pub fn new(value: CellValue) -> Self {
        Self { value, style: None }
    }

    /// Create a new cell with a value and style
    pub fn with_style(value: CellValue, style: Style) -> Self {
        Self {
            value,
            style: Some(Box::new(style)),
        }
    }

    /// Create an empty cell
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the cell's style
    pub fn style(&self) -> Option<&Style> {
        self.style.as_deref()
    }

    /// Check if this cell is effectively empty (no value and no style)
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style.is_none()
    }
}

/// Sparse row-based storage for worksheet cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, CellData>>`.
/// BTreeMap keeps iteration in row-major order, which the writer relies on.
///
/// Row heights and column widths are sparse as well: only explicitly set
/// dimensions are recorded, and every explicit value is kept verbatim
/// (including zero, and including values equal to the default).
#[derive(Debug, Clone)]
pub struct CellStorage {
    /// Row index → column map
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,

    /// Default row height in points (default: 15.0)
    default_row_height: f64,

    /// Default column width in characters (default: 8.43)
    default_column_width: f64,

    /// Explicit row heights
    row_heights: BTreeMap<u32, f64>,

    /// Hidden rows
    hidden_rows: BTreeSet<u32>,

    /// Explicit column widths
    column_widths: BTreeMap<u16, f64>,

    /// Hidden columns
    hidden_columns: BTreeSet<u16>,

    /// Merged cell regions, in insertion order
    merged_regions: Vec<CellRange>,
}

impl CellStorage {
    /// Create a new empty cell storage
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            default_row_height: 15.0,
            default_column_width: 8.43,
            row_heights: BTreeMap::new(),
            hidden_rows: BTreeSet::new(),
            column_widths: BTreeMap::new(),
            hidden_columns: BTreeSet::new(),
            merged_regions: Vec::new(),
        }
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get a mutable cell
    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut CellData> {
        self.rows.get_mut(&row).and_then(|r| r.get_mut(&col))
    }

    /// Set a cell
    ///
    /// If the cell data is empty (no value, no style), the cell is removed.
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_empty() {
            self.remove(row, col);
        } else {
            self.rows.entry(row).or_default().insert(col, data);
        }
    }

    /// Set just the cell value (preserving style)
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        match self.get_mut(row, col) {
            Some(cell) => {
                cell.value = value;
                if cell.is_empty() {
                    self.remove(row, col);
                }
            }
            None if !value.is_empty() => self.set(row, col, CellData::new(value)),
            None => {}
        }
    }

    /// Set just the cell style (preserving value)
    ///
    /// `None` clears the style; an unstyled empty cell is dropped.
    pub fn set_style(&mut self, row: u32, col: u16, style: Option<Style>) {
        match self.get_mut(row, col) {
            Some(cell) => {
                cell.style = style.map(Box::new);
                if cell.is_empty() {
                    self.remove(row, col);
                }
            }
            None => {
                if let Some(style) = style {
                    self.set(row, col, CellData::with_style(CellValue::Empty, style));
                }
            }
        }
    }

    /// Remove a cell
    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellData> {
        let row_map = self.rows.get_mut(&row)?;
        let result = row_map.remove(&col);
        if row_map.is_empty() {
            self.rows.remove(&row);
        }
        result
    }

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the bounds of used cells
    ///
    /// Returns (min_row, min_col, max_row, max_col) or None if empty
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;

        let mut min_col = u16::MAX;
        let mut max_col = 0u16;

        for row_data in self.rows.values() {
            if let Some(&col) = row_data.keys().next() {
                min_col = min_col.min(col);
            }
            if let Some(&col) = row_data.keys().next_back() {
                max_col = max_col.max(col);
            }
        }

        Some((min_row, min_col, max_row, max_col))
    }

    /// Iterate over all cells in row order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, data)| (row, col, data)))
    }

    /// Iterate over cells in a specific row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(&col, data)| (col, data)))
    }

    /// Iterate over row indices that have data
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    /// Get default row height
    pub fn default_row_height(&self) -> f64 {
        self.default_row_height
    }

    /// Get row height (returns default if not set explicitly)
    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights
            .get(&row)
            .copied()
            .unwrap_or(self.default_row_height)
    }

    /// Set an explicit row height
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    /// Check if row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.hidden_rows.contains(&row)
    }

    /// Set row hidden state
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        if hidden {
            self.hidden_rows.insert(row);
        } else {
            self.hidden_rows.remove(&row);
        }
    }

    /// Get default column width
    pub fn default_column_width(&self) -> f64 {
        self.default_column_width
    }

    /// Get column width (returns default if not set explicitly)
    pub fn column_width(&self, col: u16) -> f64 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(self.default_column_width)
    }

    /// Set an explicit column width
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Check if column is hidden
    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.hidden_columns.contains(&col)
    }

    /// Set column hidden state
    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) {
        if hidden {
            self.hidden_columns.insert(col);
        } else {
            self.hidden_columns.remove(&col);
        }
    }

    /// Explicit row heights (row index → height in points).
    pub fn row_heights(&self) -> &BTreeMap<u32, f64> {
        &self.row_heights
    }

    /// Hidden rows.
    pub fn hidden_rows(&self) -> &BTreeSet<u32> {
        &self.hidden_rows
    }

    /// Explicit column widths (column index → width in characters).
    pub fn column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }

    /// Hidden columns.
    pub fn hidden_columns(&self) -> &BTreeSet<u16> {
        &self.hidden_columns
    }

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    /// Add a merged region without any overlap check
    pub fn add_merged_region(&mut self, range: CellRange) {
        self.merged_regions.push(range);
    }

    /// Remove a merged region
    pub fn remove_merged_region(&mut self, index: usize) -> Option<CellRange> {
        if index < self.merged_regions.len() {
            Some(self.merged_regions.remove(index))
        } else {
            None
        }
    }

    /// Check if a cell is part of a merged region
    pub fn is_merged(&self, row: u32, col: u16) -> bool {
        let addr = CellAddress::new(row, col);
        self.merged_regions.iter().any(|r| r.contains(&addr))
    }
}

impl Default for CellStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut storage = CellStorage::new();

        storage.set(0, 0, CellData::new(CellValue::Number(42.0)));
        let cell = storage.get(0, 0).unwrap();
        assert_eq!(cell.value.as_number(), Some(42.0));

        assert!(storage.get(1, 1).is_none());
    }

    #[test]
    fn test_empty_cells_not_stored() {
        let mut storage = CellStorage::new();

        storage.set(0, 0, CellData::new(CellValue::Number(42.0)));
        assert_eq!(storage.cell_count(), 1);

        storage.set(0, 0, CellData::empty());
        assert_eq!(storage.cell_count(), 0);
        assert!(storage.get(0, 0).is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_styled_empty_cell_is_kept() {
        let mut storage = CellStorage::new();

        storage.set_style(3, 2, Some(Style::new().bold(true)));
        assert_eq!(storage.cell_count(), 1);
        assert!(storage.get(3, 2).unwrap().style().unwrap().font.bold);

        storage.set_style(3, 2, None);
        assert_eq!(storage.cell_count(), 0);
    }

    #[test]
    fn test_cells_own_their_styles() {
        let mut storage = CellStorage::new();
        let style = Style::new().bold(true);

        storage.set(0, 0, CellData::with_style(1.0.into(), style.clone()));
        storage.set(0, 1, CellData::with_style(2.0.into(), style));

        storage.get_mut(0, 0).unwrap().style.as_mut().unwrap().font.bold = false;

        assert!(!storage.get(0, 0).unwrap().style().unwrap().font.bold);
        assert!(storage.get(0, 1).unwrap().style().unwrap().font.bold);
    }

    #[test]
    fn test_used_bounds() {
        let mut storage = CellStorage::new();

        assert!(storage.used_bounds().is_none());

        storage.set(5, 3, CellData::new(CellValue::Number(1.0)));
        storage.set(10, 7, CellData::new(CellValue::Number(2.0)));
        storage.set(2, 1, CellData::new(CellValue::Number(3.0)));

        assert_eq!(storage.used_bounds(), Some((2, 1, 10, 7)));
    }

    #[test]
    fn test_row_column_properties() {
        let mut storage = CellStorage::new();

        assert_eq!(storage.row_height(0), 15.0);
        assert_eq!(storage.column_width(0), 8.43);
        assert!(!storage.is_row_hidden(0));
        assert!(!storage.is_column_hidden(0));

        storage.set_row_height(5, 30.0);
        storage.set_column_width(3, 20.0);
        storage.set_row_hidden(10, true);
        storage.set_column_hidden(5, true);

        assert_eq!(storage.row_height(5), 30.0);
        assert_eq!(storage.column_width(3), 20.0);
        assert!(storage.is_row_hidden(10));
        assert!(storage.is_column_hidden(5));
    }

    #[test]
    fn test_explicit_dimensions_are_kept_verbatim() {
        let mut storage = CellStorage::new();

        storage.set_row_height(1, 0.0);
        storage.set_row_height(2, 15.0);
        storage.set_column_width(0, 0.0);
        storage.set_column_width(4, 8.43);

        assert_eq!(storage.row_heights().len(), 2);
        assert_eq!(storage.row_heights().get(&1), Some(&0.0));
        assert_eq!(storage.column_widths().len(), 2);
        assert_eq!(storage.column_widths().get(&0), Some(&0.0));
    }

    #[test]
    fn test_iteration() {
        let mut storage = CellStorage::new();

        storage.set(1, 0, CellData::new(CellValue::Number(3.0)));
        storage.set(0, 1, CellData::new(CellValue::Number(2.0)));
        storage.set(0, 0, CellData::new(CellValue::Number(1.0)));

        let coords: Vec<_> = storage.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0)]);
    }
}
