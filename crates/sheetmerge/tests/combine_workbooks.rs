//! End-to-end combine tests: build source containers in memory, combine,
//! persist, read back

use pretty_assertions::assert_eq;
use sheetmerge::prelude::*;
use sheetmerge::{BorderLineStyle, BorderStyle, NumberFormat, Protection};
use std::io::{Cursor, Write};

fn to_bytes(wb: &Workbook) -> Vec<u8> {
    let mut buf = Vec::new();
    XlsxWriter::write(wb, Cursor::new(&mut buf)).unwrap();
    buf
}

/// A small monthly report: styled header, numbers, a formula, a merge,
/// explicit dimensions
fn report_workbook(months: &[&str]) -> Workbook {
    let header = Style::new()
        .bold(true)
        .fill_color(Color::rgb(0xDD, 0xEB, 0xF7))
        .horizontal_alignment(sheetmerge::HorizontalAlignment::Center);
    let money = Style {
        number_format: NumberFormat::Custom("#,##0.00".into()),
        border: BorderStyle::all(BorderLineStyle::Thin, Color::BLACK),
        protection: Protection::unlocked(),
        ..Style::default()
    };

    let mut wb = Workbook::empty();
    for (i, month) in months.iter().enumerate() {
        let idx = wb.add_worksheet_with_name(month).unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();

        sheet.set_cell_value("A1", format!("{} report", month)).unwrap();
        sheet.set_cell_style("A1", header.clone()).unwrap();
        sheet
            .merge_cells(&CellRange::parse("A1:C1").unwrap())
            .unwrap();

        sheet.set_cell_value("A2", "Sales").unwrap();
        sheet.set_cell_value("B2", 100.0 + i as f64).unwrap();
        sheet.set_cell_style("B2", money.clone()).unwrap();
        sheet.set_cell_value("A3", "Costs").unwrap();
        sheet.set_cell_value("B3", 40.0).unwrap();
        sheet.set_cell_style("B3", money.clone()).unwrap();
        sheet
            .set_cell_value(
                "B4",
                CellValue::formula_with_cached("=B2-B3", CellValue::Number(60.0 + i as f64)),
            )
            .unwrap();
        sheet.set_cell_style("B4", money.clone()).unwrap();

        sheet.set_column_width(0, 18.5);
        sheet.set_column_width(4, 0.0);
        sheet.set_row_height(0, 28.0);
        sheet.set_row_hidden(9, true);
    }
    wb
}

/// Test the four-sheet case: two files, each with Jan and Feb, all sheets
#[test]
fn test_all_sheets_in_file_then_sheet_order() {
    let files = vec![
        SourceFile::new("20260211_4467 South Acton ESG.xlsx", to_bytes(&report_workbook(&["Jan", "Feb"]))),
        SourceFile::new("Report.xlsx", to_bytes(&report_workbook(&["Jan", "Feb"]))),
    ];

    let outcome = combine(&files, "").unwrap();

    assert!(outcome.warnings.is_empty());
    let names: Vec<&str> = outcome.workbook.worksheets().map(|ws| ws.name()).collect();
    assert_eq!(
        names,
        vec![
            "South Acton ESG - Jan",
            "South Acton ESG - Feb",
            "Report - Jan",
            "Report - Feb",
        ]
    );
}

/// Test that every copied cell matches its source in value and style
#[test]
fn test_copied_content_matches_source() {
    let source = report_workbook(&["Jan"]);
    let files = vec![SourceFile::new("Site.xlsx", to_bytes(&source))];

    let outcome = combine(&files, "Jan").unwrap();
    let src = source.worksheet(0).unwrap();
    let dst = outcome.workbook.worksheet_by_name("Site - Jan").unwrap();

    assert_eq!(dst.cell_count(), src.cell_count());
    for (row, col, data) in src.iter_cells() {
        assert_eq!(
            dst.cell_at(row, col),
            Some(data),
            "cell ({}, {}) should match the source",
            row,
            col
        );
    }
    assert_eq!(dst.merged_regions(), src.merged_regions());
    assert_eq!(dst.column_widths(), src.column_widths());
    assert_eq!(dst.row_heights(), src.row_heights());
    assert_eq!(dst.hidden_rows(), src.hidden_rows());
}

/// Test the aliasing invariant: cells that shared a style in the source can
/// be edited one at a time after combining
#[test]
fn test_style_edits_do_not_leak_between_cells() {
    let files = vec![SourceFile::new("Site.xlsx", to_bytes(&report_workbook(&["Jan"])))];
    let mut outcome = combine(&files, "").unwrap();
    let sheet = outcome.workbook.worksheet_mut(0).unwrap();

    let before_b3 = sheet.cell_style("B3").unwrap().cloned();
    // B2, B3 and B4 were all written with the same money style
    let b2 = sheet.cell_style_mut_at(1, 1).unwrap();
    b2.font.bold = true;
    b2.number_format = NumberFormat::BuiltIn(10);

    assert_eq!(sheet.cell_style("B3").unwrap().cloned(), before_b3);
    assert_eq!(
        sheet.cell_style("B4").unwrap().map(|s| s.number_format.clone()),
        Some(NumberFormat::Custom("#,##0.00".into()))
    );

    // And the edit survives the trip through the container without touching B3
    let bytes = persist(&outcome.workbook).unwrap();
    let back = XlsxReader::from_bytes(&bytes).unwrap();
    let sheet = back.worksheet(0).unwrap();
    assert!(sheet.cell_style("B2").unwrap().unwrap().font.bold);
    assert!(!sheet.cell_style("B3").unwrap().unwrap().font.bold);
}

/// Test that one corrupt file is skipped with exactly one warning naming it
#[test]
fn test_corrupt_file_is_skipped() {
    let files = vec![
        SourceFile::new("good.xlsx", to_bytes(&report_workbook(&["Jan"]))),
        SourceFile::new("corrupt.xlsx", b"PK\x03\x04 truncated".to_vec()),
    ];

    let outcome = combine(&files, "").unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("corrupt.xlsx"));
    assert_eq!(outcome.sheet_count(), 1);
    assert_eq!(outcome.workbook.worksheet(0).unwrap().name(), "good - Jan");

    let bytes = persist(&outcome.workbook).unwrap();
    let back = XlsxReader::from_bytes(&bytes).unwrap();
    assert_eq!(back.sheet_count(), 1);
}

/// Test that asking for a sheet no file has ends in EmptyResult
#[test]
fn test_missing_sheet_everywhere_is_empty_result() {
    let files = vec![
        SourceFile::new("a.xlsx", to_bytes(&report_workbook(&["Jan"]))),
        SourceFile::new("b.xlsx", to_bytes(&report_workbook(&["Feb"]))),
    ];

    let outcome = combine(&files, "Summary").unwrap();

    assert_eq!(
        outcome.warnings,
        vec![
            "Sheet 'Summary' not found in a.xlsx".to_string(),
            "Sheet 'Summary' not found in b.xlsx".to_string(),
        ]
    );
    let err = persist(&outcome.workbook).unwrap_err();
    assert!(matches!(err, PersistError::EmptyResult));
    assert_eq!(err.to_string(), "no matching sheets found across all inputs");
}

/// Test two files whose names normalize to the same label
#[test]
fn test_label_collision_is_numbered() {
    let files = vec![
        SourceFile::new("20260101_1 Acton.xlsx", to_bytes(&report_workbook(&["Jan"]))),
        SourceFile::new("20260201_2 Acton.xlsx", to_bytes(&report_workbook(&["Jan"]))),
    ];

    let outcome = combine(&files, "Jan").unwrap();
    let names: Vec<&str> = outcome.workbook.worksheets().map(|ws| ws.name()).collect();
    assert_eq!(names, vec!["Acton - Jan", "Acton - Jan (2)"]);
}

/// Test that output names stay within the container's rules
#[test]
fn test_long_names_are_legal() {
    let files = vec![SourceFile::new(
        "Northern Regional Operations Center [final].xlsx",
        to_bytes(&report_workbook(&["Quarterly Summary"])),
    )];

    let outcome = combine(&files, "").unwrap();
    let name = outcome.workbook.worksheet(0).unwrap().name().to_string();

    assert!(name.chars().count() <= sheetmerge::MAX_SHEET_NAME_LEN);
    assert!(name.ends_with(" - Quarterly Summary"));
    assert!(!name.contains(['[', ']']));

    let bytes = persist(&outcome.workbook).unwrap();
    let back = XlsxReader::from_bytes(&bytes).unwrap();
    assert_eq!(back.worksheet(0).unwrap().name(), name);
}

/// Test that combining the same inputs twice gives the same cells and styles
#[test]
fn test_combine_is_deterministic() {
    let files = vec![
        SourceFile::new("One.xlsx", to_bytes(&report_workbook(&["Jan", "Feb"]))),
        SourceFile::new("Two.xlsx", to_bytes(&report_workbook(&["Mar"]))),
    ];

    let first = combine(&files, "").unwrap();
    let second = combine(&files, "").unwrap();

    assert_eq!(first.sheet_count(), second.sheet_count());
    for (a, b) in first.workbook.worksheets().zip(second.workbook.worksheets()) {
        assert_eq!(a.name(), b.name());
        let cells_a: Vec<_> = a.iter_cells().collect();
        let cells_b: Vec<_> = b.iter_cells().collect();
        assert_eq!(cells_a, cells_b);
    }
    assert_eq!(
        persist(&first.workbook).unwrap(),
        persist(&second.workbook).unwrap()
    );
}

/// Test that formulas come out with their text, not their cached result
#[test]
fn test_formulas_survive_as_text() {
    let files = vec![SourceFile::new("Site.xlsx", to_bytes(&report_workbook(&["Jan"])))];
    let outcome = combine(&files, "Jan").unwrap();
    let bytes = persist(&outcome.workbook).unwrap();

    let back = XlsxReader::from_bytes(&bytes).unwrap();
    let value = back.worksheet(0).unwrap().get_value("B4").unwrap();
    assert_eq!(value.formula_text(), Some("=B2-B3"));
    assert_eq!(
        value,
        CellValue::formula_with_cached("=B2-B3", CellValue::Number(60.0))
    );
}

/// A container written by another application: one sheet with a
/// filled-down shared formula and an array formula
fn fill_down_container() -> Vec<u8> {
    let parts: &[(&str, &str)] = &[
        ("[Content_Types].xml", r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#),
        ("xl/workbook.xml", r#"<?xml version="1.0"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="Calc" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#),
        ("xl/_rels/workbook.xml.rels", r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#),
        ("xl/worksheets/sheet1.xml", r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="2">
      <c r="A2"><f t="shared" ref="A2:A4" si="0">B2*2</f><v>4</v></c>
      <c r="B2"><v>2</v></c>
      <c r="D2"><f t="array" ref="D2:D4">B2:B4*10</f><v>20</v></c>
    </row>
    <row r="3">
      <c r="A3"><f t="shared" si="0"/><v>6</v></c>
      <c r="B3"><v>3</v></c>
      <c r="D3"><v>30</v></c>
    </row>
    <row r="4">
      <c r="A4"><f t="shared" si="0"/><v>8</v></c>
      <c r="B4"><v>4</v></c>
      <c r="D4"><v>40</v></c>
    </row>
  </sheetData>
</worksheet>"#),
    ];

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        for (name, content) in parts {
            zip.start_file(name.to_string(), zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

/// Test that filled-down and array formulas come out as formulas
#[test]
fn test_shared_and_array_formulas_survive() {
    let files = vec![SourceFile::new("Model.xlsx", fill_down_container())];
    let outcome = combine(&files, "Calc").unwrap();
    assert!(outcome.warnings.is_empty());
    let bytes = persist(&outcome.workbook).unwrap();

    let back = XlsxReader::from_bytes(&bytes).unwrap();
    let sheet = back.worksheet_by_name("Model - Calc").unwrap();
    for (addr, text, cached) in [("A2", "=B2*2", 4.0), ("A3", "=B3*2", 6.0), ("A4", "=B4*2", 8.0)] {
        assert_eq!(
            sheet.get_value(addr).unwrap(),
            CellValue::formula_with_cached(text, CellValue::Number(cached)),
            "{}",
            addr
        );
    }

    let array = sheet.get_value("D2").unwrap();
    assert_eq!(array.formula_text(), Some("=B2:B4*10"));
    assert_eq!(array.array_range(), Some(CellRange::parse("D2:D4").unwrap()));
    assert_eq!(sheet.get_value("D3").unwrap(), CellValue::Number(30.0));
}

/// Test that an empty source workbook contributes nothing and warns about nothing
#[test]
fn test_file_without_sheets() {
    let files = vec![
        SourceFile::new("empty.xlsx", to_bytes(&Workbook::empty())),
        SourceFile::new("full.xlsx", to_bytes(&report_workbook(&["Jan"]))),
    ];

    let outcome = combine(&files, "").unwrap();
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.sheet_count(), 1);
    assert_eq!(
        outcome.reports[0].state,
        FileState::Extracted { sheets: vec![] }
    );
}
