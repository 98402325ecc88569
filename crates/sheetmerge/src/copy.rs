//! Sheet content copying

use sheetmerge_core::{CellData, Result, Worksheet};

/// Counts from one sheet copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Cells written to the destination
    pub cells: usize,
    /// Cells among them that carry a style
    pub styled_cells: usize,
    /// Merged regions carried over
    pub merged_regions: usize,
    /// Explicit column widths and row heights carried over
    pub dimensions: usize,
}

/// Copies one sheet's grid, merges and dimensions into another
pub struct SheetCopier;

impl SheetCopier {
    /// Copy everything `source` holds into `destination`
    ///
    /// Values go to the same coordinates; formulas keep their text and cached
    /// result untouched. Each styled destination cell gets its own clone of
    /// the source style, even where several source cells had equal styles,
    /// so later edits to one cell's style never show up on another.
    ///
    /// Merged regions are added as declared, without overlap checks. Only
    /// explicitly set column widths and row heights are copied, together with
    /// hidden flags; everything else stays at the destination's default.
    pub fn copy(source: &Worksheet, destination: &mut Worksheet) -> Result<CopyStats> {
        let mut stats = CopyStats::default();

        for (row, col, data) in source.iter_cells() {
            let style = data.style().map(|style| Box::new(style.clone()));
            if style.is_some() {
                stats.styled_cells += 1;
            }
            destination.put_cell_at(
                row,
                col,
                CellData {
                    value: data.value.clone(),
                    style,
                },
            )?;
            stats.cells += 1;
        }

        for range in source.merged_regions() {
            destination.add_merged_region(*range);
            stats.merged_regions += 1;
        }

        for (&col, &width) in source.column_widths() {
            destination.set_column_width(col, width);
            stats.dimensions += 1;
        }
        for &col in source.hidden_columns() {
            destination.set_column_hidden(col, true);
        }

        for (&row, &height) in source.row_heights() {
            destination.set_row_height(row, height);
            stats.dimensions += 1;
        }
        for &row in source.hidden_rows() {
            destination.set_row_hidden(row, true);
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetmerge_core::{CellRange, CellValue, Color, Style};

    fn source_sheet() -> Worksheet {
        let mut ws = Worksheet::new("Source");
        let header = Style::new().bold(true).fill_color(Color::YELLOW);

        ws.set_cell_value("A1", "Name").unwrap();
        ws.set_cell_style("A1", header.clone()).unwrap();
        ws.set_cell_value("B1", "Total").unwrap();
        ws.set_cell_style("B1", header).unwrap();
        ws.set_cell_value("A2", "Widgets").unwrap();
        ws.set_cell_value("B2", 12.0).unwrap();
        ws.set_cell_value(
            "B3",
            CellValue::formula_with_cached("=SUM(B2:B2)", CellValue::Number(12.0)),
        )
        .unwrap();
        ws.set_cell_style("D4", Style::new().italic(true)).unwrap();

        ws.merge_cells(&CellRange::parse("A5:B6").unwrap()).unwrap();
        ws.set_column_width(0, 24.0);
        ws.set_column_width(3, 0.0);
        ws.set_column_hidden(5, true);
        ws.set_row_height(0, 30.0);
        ws.set_row_hidden(7, true);
        ws
    }

    #[test]
    fn test_copy_values_and_styles() {
        let source = source_sheet();
        let mut dest = Worksheet::new("Dest");
        let stats = SheetCopier::copy(&source, &mut dest).unwrap();

        assert_eq!(
            stats,
            CopyStats {
                cells: 6,
                styled_cells: 3,
                merged_regions: 1,
                dimensions: 3,
            }
        );
        for (row, col, data) in source.iter_cells() {
            assert_eq!(dest.cell_at(row, col), Some(data));
        }
        assert_eq!(
            dest.get_value("B3").unwrap(),
            CellValue::formula_with_cached("=SUM(B2:B2)", CellValue::Number(12.0))
        );
    }

    #[test]
    fn test_copied_styles_are_independent() {
        let source = source_sheet();
        let mut dest = Worksheet::new("Dest");
        SheetCopier::copy(&source, &mut dest).unwrap();

        dest.cell_style_mut_at(0, 0).unwrap().font.bold = false;

        assert!(!dest.cell_style("A1").unwrap().unwrap().font.bold);
        assert!(dest.cell_style("B1").unwrap().unwrap().font.bold);
        assert!(source.cell_style("A1").unwrap().unwrap().font.bold);
    }

    #[test]
    fn test_copy_layout() {
        let source = source_sheet();
        let mut dest = Worksheet::new("Dest");
        SheetCopier::copy(&source, &mut dest).unwrap();

        assert_eq!(dest.merged_regions(), source.merged_regions());
        assert_eq!(dest.column_widths(), source.column_widths());
        assert_eq!(dest.hidden_columns(), source.hidden_columns());
        assert_eq!(dest.row_heights(), source.row_heights());
        assert_eq!(dest.hidden_rows(), source.hidden_rows());
        // Zero is an explicit width, not "unset"
        assert_eq!(dest.column_widths().get(&3), Some(&0.0));
        assert!(dest.column_widths().get(&1).is_none());
    }

    #[test]
    fn test_overlapping_merges_pass_through() {
        let mut source = Worksheet::new("Source");
        source.add_merged_region(CellRange::parse("A1:C3").unwrap());
        source.add_merged_region(CellRange::parse("B2:D4").unwrap());

        let mut dest = Worksheet::new("Dest");
        SheetCopier::copy(&source, &mut dest).unwrap();

        assert_eq!(dest.merged_regions().len(), 2);
        assert_eq!(dest.merged_regions(), source.merged_regions());
    }

    #[test]
    fn test_copy_empty_sheet() {
        let source = Worksheet::new("Empty");
        let mut dest = Worksheet::new("Dest");
        let stats = SheetCopier::copy(&source, &mut dest).unwrap();

        assert_eq!(stats, CopyStats::default());
        assert!(dest.is_empty());
    }
}
