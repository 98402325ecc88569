//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

mod formula;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{attr_flag, attr_value, parse_attr, read_styles_xml};
use sheetmerge_core::cell::SharedString;
use sheetmerge_core::style::Style;
use sheetmerge_core::{
    CellAddress, CellData, CellError, CellRange, CellValue, Workbook, Worksheet,
};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode characters XML cannot carry:
/// - `_x000D_` = CR (carriage return)
/// - `_x0009_` = Tab
/// - `_x005F_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from an in-memory container
    pub fn from_bytes(bytes: &[u8]) -> XlsxResult<Workbook> {
        Self::read(std::io::Cursor::new(bytes))
    }

    /// Read a workbook from a reader
    ///
    /// Formulas are loaded as text together with whatever cached result the
    /// file carries; nothing is evaluated.
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_styles = Self::read_styles(&mut archive);
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();
        let tables = SharedTables {
            strings: &shared_strings,
            styles: &cell_styles,
        };

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet part ({}), skipping", name, r_id);
                continue;
            };

            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(&mut archive, path, &mut worksheet, &tables)?;
            workbook.add_existing_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<SharedString>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs repeat the text's reading, not its content
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(SharedString::new(""));
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(SharedString::new(decode_excel_escapes(&current_string)));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::CData(e)) if in_t => {
                    current_string.push_str(&String::from_utf8_lossy(&e));
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read the `cellXfs` table
    ///
    /// A missing or unreadable styles part is not fatal: the workbook loads
    /// with every cell unstyled.
    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Vec<Style> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };
        match read_styles_xml(file) {
            Ok(styles) => styles,
            Err(e) => {
                log::warn!("unreadable xl/styles.xml, loading cells unstyled: {}", e);
                Vec::new()
            }
        }
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"sheet" =>
                {
                    // The relationship id lives in the r: namespace, whatever its prefix
                    let r_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.local_name().as_ref() == b"id")
                        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()));

                    if let (Some(name), Some(r_id)) = (attr_value(&e, b"name"), r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        tables: &SharedTables<'_>,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        // No trimming: leading/trailing spaces in strings are content
        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut state = SheetState::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => state.open(&e, worksheet),
                Ok(Event::Empty(e)) => {
                    state.open(&e, worksheet);
                    state.close(e.local_name().as_ref(), worksheet, tables)?;
                }
                Ok(Event::End(e)) => state.close(e.local_name().as_ref(), worksheet, tables)?,
                Ok(Event::Text(e)) => {
                    if let Some(target) = state.text_target() {
                        target.push_str(&e.unescape()?);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(target) = state.text_target() {
                        target.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if state.missing_styles > 0 {
            log::warn!(
                "{}: {} cell(s) refer to styles missing from styles.xml, loaded unstyled",
                path,
                state.missing_styles
            );
        }

        Ok(())
    }
}

/// Workbook-level tables that cells refer to by index
struct SharedTables<'a> {
    strings: &'a [SharedString],
    styles: &'a [Style],
}

/// The `<c>` element being read
#[derive(Debug, Default)]
struct PendingCell {
    address: CellAddress,
    cell_type: Option<String>,
    style_index: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
    /// `si` of a `t="shared"` formula
    shared_group: Option<u32>,
    /// `ref` of a `t="array"` formula
    array_range: Option<CellRange>,
    inline: Option<String>,
}

/// Parser position inside one worksheet part
#[derive(Debug, Default)]
struct SheetState {
    /// Row currently open (0-based)
    row: u32,
    /// Whether any `<row>` has been seen yet
    seen_row: bool,
    /// Column the next cell without an `r` attribute goes to
    next_col: u16,
    cell: Option<PendingCell>,
    in_value: bool,
    in_formula: bool,
    in_inline_text: bool,
    in_phonetic: bool,
    missing_styles: usize,
    /// Anchor cell and text of each shared formula, by `si`
    shared_formulas: HashMap<u32, (CellAddress, String)>,
}

impl SheetState {
    fn open(&mut self, e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        match e.local_name().as_ref() {
            b"row" => {
                // Rows without `r` follow the previous one
                let next = if self.seen_row { self.row + 1 } else { 0 };
                self.row = parse_attr::<u32>(e, b"r")
                    .map(|r| r.saturating_sub(1))
                    .unwrap_or(next);
                self.seen_row = true;
                self.next_col = 0;
                read_row_dimensions(e, self.row, worksheet);
            }
            b"col" => read_col_dimensions(e, worksheet),
            b"c" => {
                let address = match attr_value(e, b"r") {
                    Some(r) => CellAddress::parse(&r).unwrap_or_else(|err| {
                        log::warn!("bad cell reference '{}' ({}), placing by position", r, err);
                        CellAddress::new(self.row, self.next_col)
                    }),
                    None => CellAddress::new(self.row, self.next_col),
                };
                self.next_col = address.col.saturating_add(1);
                self.cell = Some(PendingCell {
                    address,
                    cell_type: attr_value(e, b"t"),
                    style_index: parse_attr(e, b"s"),
                    ..PendingCell::default()
                });
            }
            b"v" => self.in_value = self.cell.is_some(),
            b"f" => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.formula.get_or_insert_with(String::new);
                    match attr_value(e, b"t").as_deref() {
                        Some("shared") => cell.shared_group = parse_attr(e, b"si"),
                        Some("array") => {
                            cell.array_range = attr_value(e, b"ref")
                                .and_then(|r| CellRange::parse(&r).ok())
                                .or(Some(CellRange::single(cell.address)));
                        }
                        _ => {}
                    }
                    self.in_formula = true;
                }
            }
            b"rPh" => self.in_phonetic = true,
            b"t" if !self.in_phonetic => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.inline.get_or_insert_with(String::new);
                    self.in_inline_text = true;
                }
            }
            b"mergeCell" => {
                if let Some(reference) = attr_value(e, b"ref") {
                    match CellRange::parse(&reference) {
                        // Carried over as declared, even if it overlaps another region
                        Ok(range) => worksheet.add_merged_region(range),
                        Err(err) => log::warn!("ignoring merged region '{}': {}", reference, err),
                    }
                }
            }
            _ => {}
        }
    }

    fn close(
        &mut self,
        name: &[u8],
        worksheet: &mut Worksheet,
        tables: &SharedTables<'_>,
    ) -> XlsxResult<()> {
        match name {
            b"v" => self.in_value = false,
            b"f" => {
                self.in_formula = false;
                if let Some(cell) = self.cell.as_mut() {
                    let text = cell.formula.take().filter(|f| !f.is_empty());
                    cell.formula = match (text, cell.shared_group) {
                        (Some(text), Some(group)) => {
                            self.shared_formulas
                                .insert(group, (cell.address, text.clone()));
                            Some(text)
                        }
                        // Group member: the anchor's formula, moved to this cell
                        (None, Some(group)) => match self.shared_formulas.get(&group) {
                            Some((anchor, text)) => Some(formula::shift_formula(
                                text,
                                i64::from(cell.address.row) - i64::from(anchor.row),
                                i64::from(cell.address.col) - i64::from(anchor.col),
                            )),
                            None => {
                                log::warn!(
                                    "shared formula {} used at {} before its anchor, keeping the cached value",
                                    group,
                                    cell.address.to_a1_string()
                                );
                                None
                            }
                        },
                        (text, None) => text,
                    };
                }
            }
            b"t" => self.in_inline_text = false,
            b"rPh" => self.in_phonetic = false,
            b"c" => {
                if let Some(cell) = self.cell.take() {
                    self.store_cell(cell, worksheet, tables)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Buffer that character data currently belongs to
    fn text_target(&mut self) -> Option<&mut String> {
        let cell = self.cell.as_mut()?;
        if self.in_value {
            Some(cell.value.get_or_insert_with(String::new))
        } else if self.in_formula {
            cell.formula.as_mut()
        } else if self.in_inline_text {
            cell.inline.as_mut()
        } else {
            None
        }
    }

    fn store_cell(
        &mut self,
        cell: PendingCell,
        worksheet: &mut Worksheet,
        tables: &SharedTables<'_>,
    ) -> XlsxResult<()> {
        let value = cell_value(&cell, tables.strings)?;

        let style = match cell.style_index {
            None => None,
            Some(idx) => match tables.styles.get(idx as usize) {
                Some(style) if style.is_default() => None,
                Some(style) => Some(Box::new(style.clone())),
                None if idx == 0 => None,
                None => {
                    self.missing_styles += 1;
                    None
                }
            },
        };

        let address = cell.address;
        worksheet.put_cell_at(address.row, address.col, CellData { value, style })?;
        Ok(())
    }
}

/// Interpret a finished `<c>` element
fn cell_value(cell: &PendingCell, shared_strings: &[SharedString]) -> XlsxResult<CellValue> {
    let cell_type = cell.cell_type.as_deref();

    let plain = match (&cell.inline, &cell.value) {
        (Some(text), _) if cell_type == Some("inlineStr") || cell.value.is_none() => {
            Some(CellValue::string(decode_excel_escapes(text)))
        }
        (_, Some(raw)) => Some(typed_value(cell_type, raw, shared_strings)?),
        _ => None,
    };

    Ok(match &cell.formula {
        Some(f) => {
            // Ensure formula starts with '='
            let text = if f.starts_with('=') {
                f.clone()
            } else {
                format!("={}", f)
            };
            CellValue::Formula {
                text,
                cached_value: plain.map(Box::new),
                array_range: cell.array_range,
            }
        }
        None => plain.unwrap_or_default(),
    })
}

fn typed_value(
    cell_type: Option<&str>,
    raw: &str,
    shared_strings: &[SharedString],
) -> XlsxResult<CellValue> {
    Ok(match cell_type {
        // Shared string
        Some("s") => {
            let s = raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| shared_strings.get(idx))
                .ok_or_else(|| XlsxError::BadSharedString(raw.to_string()))?;
            CellValue::String(s.clone())
        }

        Some("b") => CellValue::Boolean(raw.trim() == "1" || raw.trim().eq_ignore_ascii_case("true")),

        Some("e") => CellError::from_code(raw.trim())
            .map(CellValue::Error)
            .unwrap_or_else(|| CellValue::string(raw)),

        Some("str") | Some("inlineStr") => CellValue::string(decode_excel_escapes(raw)),

        // Number (default type or explicit "n")
        None | Some("n") => match raw.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::string(raw),
        },

        // ISO dates ("d") and unknown types keep their text
        Some(_) => CellValue::string(raw),
    })
}

fn read_row_dimensions(e: &BytesStart<'_>, row: u32, worksheet: &mut Worksheet) {
    if attr_flag(e, b"customHeight").unwrap_or(false) {
        if let Some(height) = parse_attr::<f64>(e, b"ht") {
            worksheet.set_row_height(row, height);
        }
    }
    if attr_flag(e, b"hidden").unwrap_or(false) {
        worksheet.set_row_hidden(row, true);
    }
}

fn read_col_dimensions(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
    // min/max are 1-based in XLSX
    let (Some(min), Some(max)) = (parse_attr::<u16>(e, b"min"), parse_attr::<u16>(e, b"max"))
    else {
        return;
    };
    // Excel lays columns out by `width` whether or not `customWidth` is set
    let width = parse_attr::<f64>(e, b"width");
    let hidden = attr_flag(e, b"hidden").unwrap_or(false);

    for col in min.max(1)..=max.min(sheetmerge_core::MAX_COLS) {
        let col_idx = col - 1;
        if let Some(w) = width {
            worksheet.set_column_width(col_idx, w);
        }
        if hidden {
            worksheet.set_column_hidden(col_idx, true);
        }
    }
}
