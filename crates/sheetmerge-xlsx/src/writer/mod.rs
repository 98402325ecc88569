//! XLSX writer

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;

use crate::error::XlsxResult;
use crate::styles::{escape_xml_attr, write_styles_xml};
use sheetmerge_core::{CellAddress, CellData, CellValue, StylePool, Workbook, Worksheet};

/// XLSX file writer
///
/// Output depends only on the workbook: parts are written in a fixed order
/// with a fixed timestamp, so equal workbooks encode to equal bytes.
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(workbook, file)
    }

    /// Encode a workbook into an in-memory container
    pub fn to_bytes(workbook: &Workbook) -> XlsxResult<Vec<u8>> {
        let mut buf = Vec::new();
        Self::write(workbook, Cursor::new(&mut buf))?;
        Ok(buf)
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        // Cell styles are interned while rendering sheets, so styles.xml can
        // only be produced once every sheet has been visited.
        let mut pool = StylePool::new();
        let sheets: Vec<String> = workbook
            .worksheets()
            .map(|sheet| render_worksheet(sheet, &mut pool))
            .collect();

        write_part(&mut zip, "[Content_Types].xml", &content_types_xml(sheets.len()))?;
        write_part(&mut zip, "_rels/.rels", ROOT_RELS)?;
        write_part(&mut zip, "xl/workbook.xml", &workbook_xml(workbook))?;
        write_part(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &workbook_rels_xml(sheets.len()),
        )?;
        write_part(&mut zip, "xl/styles.xml", &write_styles_xml(&pool))?;

        for (i, xml) in sheets.iter().enumerate() {
            write_part(&mut zip, &format!("xl/worksheets/sheet{}.xml", i + 1), xml)?;
        }

        zip.finish()?;
        log::debug!(
            "wrote {} sheet(s) with {} distinct style(s)",
            sheets.len(),
            pool.len()
        );
        Ok(())
    }
}

fn write_part<W: Write + Seek>(
    zip: &mut zip::ZipWriter<W>,
    name: &str,
    content: &str,
) -> XlsxResult<()> {
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    zip.start_file(name.to_string(), options)?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

fn content_types_xml(sheet_count: usize) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );

    for i in 0..sheet_count {
        content.push_str(&format!(
            r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i + 1
        ));
    }

    content.push_str("\n</Types>");
    content
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
    );

    for (i, sheet) in workbook.worksheets().enumerate() {
        content.push_str(&format!(
            r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml_attr(sheet.name()),
            i + 1,
            i + 1
        ));
    }

    content.push_str(
        r#"
    </sheets>
</workbook>"#,
    );
    content
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for i in 0..sheet_count {
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }

    content.push_str(&format!(
        r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
        sheet_count + 1
    ));
    content
}

fn render_worksheet(sheet: &Worksheet, pool: &mut StylePool) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    if let Some(range) = sheet.used_range() {
        content.push_str(&format!("\n    <dimension ref=\"{}\"/>", range));
    }

    render_cols(sheet, &mut content);

    content.push_str("\n    <sheetData>");

    // Rows are written if they hold cells or carry their own dimensions
    let rows: BTreeSet<u32> = sheet
        .row_indices()
        .chain(sheet.row_heights().keys().copied())
        .chain(sheet.hidden_rows().iter().copied())
        .collect();

    for row in rows {
        let mut attrs = format!(" r=\"{}\"", row + 1);
        if let Some(height) = sheet.row_heights().get(&row) {
            attrs.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", height));
        }
        if sheet.is_row_hidden(row) {
            attrs.push_str(" hidden=\"1\"");
        }

        let mut cells = String::new();
        for (col, cell) in sheet.iter_row(row) {
            render_cell(&mut cells, CellAddress::new(row, col), cell, pool);
        }

        if cells.is_empty() {
            content.push_str(&format!("\n        <row{}/>", attrs));
        } else {
            content.push_str(&format!("\n        <row{}>{}\n        </row>", attrs, cells));
        }
    }

    content.push_str("\n    </sheetData>");

    let merged_regions = sheet.merged_regions();
    if !merged_regions.is_empty() {
        content.push_str(&format!(
            "\n    <mergeCells count=\"{}\">",
            merged_regions.len()
        ));
        for range in merged_regions {
            content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
        }
        content.push_str("\n    </mergeCells>");
    }

    content.push_str("\n</worksheet>");
    content
}

fn render_cols(sheet: &Worksheet, content: &mut String) {
    let cols: BTreeSet<u16> = sheet
        .column_widths()
        .keys()
        .chain(sheet.hidden_columns().iter())
        .copied()
        .collect();
    if cols.is_empty() {
        return;
    }

    content.push_str("\n    <cols>");
    for col in cols {
        let n = col + 1;
        let mut attrs = match sheet.column_widths().get(&col) {
            Some(width) => format!(" width=\"{}\" customWidth=\"1\"", width),
            None => format!(" width=\"{}\"", sheet.default_column_width()),
        };
        if sheet.is_column_hidden(col) {
            attrs.push_str(" hidden=\"1\"");
        }
        content.push_str(&format!("\n        <col min=\"{n}\" max=\"{n}\"{attrs}/>"));
    }
    content.push_str("\n    </cols>");
}

fn render_cell(out: &mut String, addr: CellAddress, cell: &CellData, pool: &mut StylePool) {
    let xf_id = cell.style().map(|style| pool.intern(style)).unwrap_or(0);
    let style_attr = if xf_id != 0 {
        format!(" s=\"{}\"", xf_id)
    } else {
        String::new()
    };
    let cell_ref = addr.to_a1_string();

    match &cell.value {
        CellValue::Empty => {
            // Preserve style-only cells
            if xf_id != 0 {
                out.push_str(&format!("\n            <c r=\"{}\"{}/>", cell_ref, style_attr));
            }
        }
        CellValue::Number(n) => {
            out.push_str(&format!(
                "\n            <c r=\"{}\"{}><v>{}</v></c>",
                cell_ref, style_attr, n
            ));
        }
        CellValue::String(s) => {
            out.push_str(&format!(
                "\n            <c r=\"{}\"{} t=\"inlineStr\"><is>{}</is></c>",
                cell_ref,
                style_attr,
                text_element(s.as_str())
            ));
        }
        CellValue::Boolean(b) => {
            out.push_str(&format!(
                "\n            <c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                cell_ref,
                style_attr,
                u8::from(*b)
            ));
        }
        CellValue::Error(e) => {
            out.push_str(&format!(
                "\n            <c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
                cell_ref,
                style_attr,
                escape_xml(e.code())
            ));
        }
        CellValue::Formula {
            text,
            cached_value,
            array_range,
        } => {
            let formula_text = text.strip_prefix('=').unwrap_or(text);
            let (type_attr, cached) = match cached_value.as_deref() {
                Some(CellValue::Number(n)) => ("", format!("<v>{}</v>", n)),
                Some(CellValue::String(s)) => (
                    " t=\"str\"",
                    format!("<v>{}</v>", escape_xml(&encode_excel_escapes(s.as_str()))),
                ),
                Some(CellValue::Boolean(b)) => (" t=\"b\"", format!("<v>{}</v>", u8::from(*b))),
                Some(CellValue::Error(e)) => {
                    (" t=\"e\"", format!("<v>{}</v>", escape_xml(e.code())))
                }
                _ => ("", String::new()),
            };
            let formula_attrs = match array_range {
                Some(range) => format!(" t=\"array\" ref=\"{}\"", range.to_a1_string()),
                None => String::new(),
            };
            out.push_str(&format!(
                "\n            <c r=\"{}\"{}{}><f{}>{}</f>{}</c>",
                cell_ref,
                style_attr,
                type_attr,
                formula_attrs,
                escape_xml(formula_text),
                cached
            ));
        }
    }
}

/// `<t>` element for an inline string, preserving edge whitespace
fn text_element(s: &str) -> String {
    let encoded = escape_xml(&encode_excel_escapes(s));
    if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        format!("<t xml:space=\"preserve\">{}</t>", encoded)
    } else {
        format!("<t>{}</t>", encoded)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Encode characters XML cannot carry as Excel's `_xHHHH_` escapes
///
/// A literal `_xHHHH_` in the text gets its leading underscore escaped as
/// `_x005F_` so the reader does not decode it.
fn encode_excel_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '\t' | '\n' => out.push(c),
            c if (c as u32) < 0x20 => out.push_str(&format!("_x{:04X}_", c as u32)),
            '_' if looks_like_escape(&s[i..]) => out.push_str("_x005F_"),
            c => out.push(c),
        }
    }
    out
}

fn looks_like_escape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 7
        && b[1] == b'x'
        && b[2..6].iter().all(u8::is_ascii_hexdigit)
        && b[6] == b'_'
}
