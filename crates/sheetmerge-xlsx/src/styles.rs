//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use sheetmerge_core::style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, DiagonalDirection, FillStyle,
    FontStyle, FontVerticalAlign, GradientStop, GradientType, HorizontalAlignment, NumberFormat,
    PatternType, Protection, ReadingOrder, Style, StylePool, Underline, VerticalAlignment,
};

// === Writing ===

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

/// Render `xl/styles.xml` for every style interned in `pool`
///
/// The pool index of each style is its `cellXfs` index, so cells can be
/// written with `s="{pool index}"`.
pub(crate) fn write_styles_xml(pool: &StylePool) -> String {
    let mut fonts: Vec<FontStyle> = vec![FontStyle::default()];
    let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
    font_ids.insert(FontStyle::default(), 0);

    // Excel requires the first two fills to be: none and gray125
    let mut fills: Vec<FillStyle> = vec![
        FillStyle::None,
        FillStyle::pattern(PatternType::Gray125, Color::Auto, Color::Auto),
    ];
    let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();
    fill_ids.insert(fills[0].clone(), 0);
    fill_ids.insert(fills[1].clone(), 1);

    let mut borders: Vec<BorderStyle> = vec![BorderStyle::default()];
    let mut border_ids: HashMap<BorderStyle, u32> = HashMap::new();
    border_ids.insert(BorderStyle::default(), 0);

    let mut numfmts: Vec<(u32, String)> = Vec::new();
    let mut numfmt_ids: HashMap<String, u32> = HashMap::new();
    let mut next_numfmt_id = NumberFormat::FIRST_CUSTOM_ID;

    let mut resolved: Vec<(&Style, ResolvedXfIds)> = Vec::with_capacity(pool.len());

    for (_, style) in pool.iter() {
        let font_id = intern(&mut fonts, &mut font_ids, &style.font);
        let fill_id = intern(&mut fills, &mut fill_ids, &style.fill);
        let border_id = intern(&mut borders, &mut border_ids, &style.border);

        let num_fmt_id = match &style.number_format {
            NumberFormat::General => 0,
            NumberFormat::BuiltIn(id) => *id,
            NumberFormat::Custom(code) => *numfmt_ids.entry(code.clone()).or_insert_with(|| {
                let id = next_numfmt_id;
                next_numfmt_id += 1;
                numfmts.push((id, code.clone()));
                id
            }),
        };

        resolved.push((
            style,
            ResolvedXfIds {
                font_id,
                fill_id,
                border_id,
                num_fmt_id,
            },
        ));
    }

    let mut xml = String::new();
    xml.push_str(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    if !numfmts.is_empty() {
        xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
        for (id, code) in &numfmts {
            xml.push_str(&format!(
                "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                id,
                escape_xml_attr(code)
            ));
        }
        xml.push_str("\n  </numFmts>");
    }

    xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
    for font in &fonts {
        xml.push_str("\n    ");
        xml.push_str(&write_font(font));
    }
    xml.push_str("\n  </fonts>");

    xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len()));
    for fill in &fills {
        xml.push_str("\n    ");
        xml.push_str(&write_fill(fill));
    }
    xml.push_str("\n  </fills>");

    xml.push_str(&format!("\n  <borders count=\"{}\">", borders.len()));
    for border in &borders {
        xml.push_str("\n    ");
        xml.push_str(&write_border(border));
    }
    xml.push_str("\n  </borders>");

    xml.push_str(
        r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
    );

    xml.push_str(&format!("\n  <cellXfs count=\"{}\">", resolved.len()));
    for (style, ids) in &resolved {
        xml.push_str("\n    ");
        xml.push_str(&write_xf(style, *ids));
    }
    xml.push_str("\n  </cellXfs>");

    xml.push_str(
        r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
    );
    xml
}

/// Index of `item` in `table`, appending it if new
fn intern<T: Clone + Eq + std::hash::Hash>(
    table: &mut Vec<T>,
    ids: &mut HashMap<T, u32>,
    item: &T,
) -> u32 {
    if let Some(&id) = ids.get(item) {
        return id;
    }
    let id = table.len() as u32;
    table.push(item.clone());
    ids.insert(item.clone(), id);
    id
}

pub(crate) fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn color_attrs(color: &Color) -> String {
    match color {
        Color::Auto => " auto=\"1\"".to_string(),
        Color::Rgb { .. } | Color::Argb { .. } => {
            format!(" rgb=\"{}\"", color.to_argb_hex().unwrap_or_default())
        }
        Color::Indexed(i) => format!(" indexed=\"{}\"", i),
        Color::Theme { index, tint } => {
            if *tint == 0.0 {
                format!(" theme=\"{}\"", index)
            } else {
                format!(" theme=\"{}\" tint=\"{}\"", index, tint)
            }
        }
    }
}

fn write_color(tag: &str, color: &Color) -> String {
    format!("<{tag}{}/>", color_attrs(color))
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    match font.underline {
        Underline::None => {}
        Underline::Single => s.push_str("<u/>"),
        other => s.push_str(&format!("<u val=\"{}\"/>", other.as_str())),
    }
    if font.vertical_align != FontVerticalAlign::Baseline {
        s.push_str(&format!(
            "<vertAlign val=\"{}\"/>",
            font.vertical_align.as_str()
        ));
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml_attr(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => format!(
            "<fill><patternFill patternType=\"{}\">{}{}</patternFill></fill>",
            pattern.as_str(),
            write_color("fgColor", foreground),
            write_color("bgColor", background)
        ),
        FillStyle::Gradient {
            gradient_type,
            angle,
            stops,
        } => {
            let mut s = match gradient_type {
                GradientType::Linear => format!("<fill><gradientFill degree=\"{}\">", angle),
                GradientType::Path => "<fill><gradientFill type=\"path\">".to_string(),
            };
            for stop in stops {
                s.push_str(&format!(
                    "<stop position=\"{}\">{}</stop>",
                    stop.position,
                    write_color("color", &stop.color)
                ));
            }
            s.push_str("</gradientFill></fill>");
            s
        }
    }
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge {
        Some(e) if e.style != BorderLineStyle::None => format!(
            "<{tag} style=\"{}\">{}</{tag}>",
            e.style.as_str(),
            write_color("color", &e.color)
        ),
        _ => format!("<{tag}/>"),
    }
}

fn write_border(border: &BorderStyle) -> String {
    let mut attrs = String::new();
    let (up, down) = border.diagonal_direction.flags();
    if up {
        attrs.push_str(" diagonalUp=\"1\"");
    }
    if down {
        attrs.push_str(" diagonalDown=\"1\"");
    }

    let mut s = format!("<border{}>", attrs);
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str(&write_border_edge("diagonal", &border.diagonal));
    s.push_str("</border>");
    s
}

fn write_alignment(al: &Alignment) -> String {
    let default = Alignment::default();
    if al == &default {
        return String::new();
    }

    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.as_str()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.as_str()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if al.shrink_to_fit {
        s.push_str(" shrinkToFit=\"1\"");
    }
    if al.indent != 0 {
        s.push_str(&format!(" indent=\"{}\"", al.indent));
    }
    if al.rotation != 0 {
        s.push_str(&format!(" textRotation=\"{}\"", al.rotation));
    }
    if al.reading_order != ReadingOrder::ContextDependent {
        s.push_str(&format!(" readingOrder=\"{}\"", al.reading_order.code()));
    }
    s.push_str("/>");
    s
}

fn write_protection(p: &Protection) -> String {
    if p == &Protection::default() {
        return String::new();
    }
    format!(
        "<protection locked=\"{}\" hidden=\"{}\"/>",
        u8::from(p.locked),
        u8::from(p.hidden)
    )
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if ids.font_id != 0 {
        attrs.push_str(" applyFont=\"1\"");
    }
    if ids.fill_id != 0 {
        attrs.push_str(" applyFill=\"1\"");
    }
    if ids.border_id != 0 {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if style.alignment != Alignment::default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }
    if style.protection != Protection::default() {
        attrs.push_str(" applyProtection=\"1\"");
    }

    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );

    let children = write_alignment(&style.alignment) + &write_protection(&style.protection);
    if children.is_empty() {
        s.push_str("/>");
    } else {
        s.push('>');
        s.push_str(&children);
        s.push_str("</xf>");
    }
    s
}

// === Reading ===

/// Which top-level styleSheet collection the parser is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    #[default]
    Other,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

/// A `<fill>` under construction
#[derive(Debug)]
enum PendingFill {
    Pattern {
        pattern: Option<PatternType>,
        foreground: Color,
        background: Color,
    },
    Gradient {
        gradient_type: GradientType,
        angle: f64,
        stops: Vec<GradientStop>,
    },
}

impl PendingFill {
    fn finish(self) -> FillStyle {
        match self {
            PendingFill::Pattern {
                pattern: None | Some(PatternType::None),
                ..
            } => FillStyle::None,
            PendingFill::Pattern {
                pattern: Some(PatternType::Solid),
                foreground,
                ..
            } => FillStyle::Solid { color: foreground },
            PendingFill::Pattern {
                pattern: Some(pattern),
                foreground,
                background,
            } => FillStyle::Pattern {
                pattern,
                foreground,
                background,
            },
            PendingFill::Gradient {
                gradient_type,
                angle,
                stops,
            } => FillStyle::Gradient {
                gradient_type,
                angle,
                stops,
            },
        }
    }
}

/// One `cellXfs` record, still holding component ids
#[derive(Debug, Default)]
struct XfRecord {
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    alignment: Alignment,
    protection: Protection,
}

/// Accumulates the component tables of a styles part
#[derive(Debug, Default)]
struct StylesParser {
    section: Section,
    numfmts: HashMap<u32, String>,
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<BorderStyle>,
    xfs: Vec<XfRecord>,

    font: Option<FontStyle>,
    fill: Option<PendingFill>,
    stop_position: Option<f64>,
    border: Option<BorderStyle>,
    edge: Option<String>,
    xf: Option<XfRecord>,
}

impl StylesParser {
    /// Handle an opening tag (also called for self-closing tags)
    fn open(&mut self, e: &BytesStart<'_>) {
        let name = e.local_name();
        match (self.section, name.as_ref()) {
            (_, b"numFmt") => {
                let id = attr_value(e, b"numFmtId").and_then(|v| v.parse().ok());
                if let (Some(id), Some(code)) = (id, attr_value(e, b"formatCode")) {
                    self.numfmts.insert(id, code);
                }
            }
            (_, b"fonts") => self.section = Section::Fonts,
            (_, b"fills") => self.section = Section::Fills,
            (_, b"borders") => self.section = Section::Borders,
            (_, b"cellXfs") => self.section = Section::CellXfs,

            (Section::Fonts, b"font") => self.font = Some(FontStyle::default()),
            (Section::Fonts, tag) => {
                if let Some(font) = self.font.as_mut() {
                    apply_font_child(font, tag, e);
                }
            }

            (Section::Fills, b"patternFill") => {
                self.fill = Some(PendingFill::Pattern {
                    pattern: attr_value(e, b"patternType").and_then(|v| PatternType::from_str(&v)),
                    foreground: Color::Auto,
                    background: Color::Auto,
                });
            }
            (Section::Fills, b"gradientFill") => {
                let gradient_type = match attr_value(e, b"type").as_deref() {
                    Some("path") => GradientType::Path,
                    _ => GradientType::Linear,
                };
                self.fill = Some(PendingFill::Gradient {
                    gradient_type,
                    angle: parse_attr(e, b"degree").unwrap_or(0.0),
                    stops: Vec::new(),
                });
            }
            (Section::Fills, b"stop") => self.stop_position = parse_attr(e, b"position"),
            (Section::Fills, tag @ (b"fgColor" | b"bgColor" | b"color")) => {
                let color = parse_color_attrs(e);
                match (self.fill.as_mut(), tag) {
                    (Some(PendingFill::Pattern { foreground, .. }), b"fgColor") => {
                        *foreground = color
                    }
                    (Some(PendingFill::Pattern { background, .. }), b"bgColor") => {
                        *background = color
                    }
                    (Some(PendingFill::Gradient { stops, .. }), b"color") => {
                        if let Some(position) = self.stop_position {
                            stops.push(GradientStop::new(position, color));
                        }
                    }
                    _ => {}
                }
            }

            (Section::Borders, b"border") => {
                let up = attr_flag(e, b"diagonalUp").unwrap_or(false);
                let down = attr_flag(e, b"diagonalDown").unwrap_or(false);
                self.border = Some(BorderStyle {
                    diagonal_direction: DiagonalDirection::from_flags(up, down),
                    ..BorderStyle::default()
                });
            }
            (Section::Borders, b"color") => {
                let color = parse_color_attrs(e);
                if let (Some(border), Some(edge)) = (self.border.as_mut(), self.edge.as_deref()) {
                    if let Some(Some(edge)) = border.edge_mut(edge) {
                        edge.color = color;
                    }
                }
            }
            (Section::Borders, tag) => {
                let Some(border) = self.border.as_mut() else {
                    return;
                };
                let edge_name = String::from_utf8_lossy(tag).into_owned();
                if let Some(slot) = border.edge_mut(&edge_name) {
                    let style = attr_value(e, b"style")
                        .and_then(|v| BorderLineStyle::from_str(&v))
                        .filter(|s| *s != BorderLineStyle::None);
                    *slot = style.map(|s| BorderEdge::new(s, Color::Auto));
                    self.edge = Some(edge_name);
                }
            }

            (Section::CellXfs, b"xf") => {
                self.xf = Some(XfRecord {
                    num_fmt_id: parse_attr(e, b"numFmtId").unwrap_or(0),
                    font_id: parse_attr(e, b"fontId").unwrap_or(0),
                    fill_id: parse_attr(e, b"fillId").unwrap_or(0),
                    border_id: parse_attr(e, b"borderId").unwrap_or(0),
                    ..XfRecord::default()
                });
            }
            (Section::CellXfs, b"alignment") => {
                if let Some(xf) = self.xf.as_mut() {
                    read_alignment(&mut xf.alignment, e);
                }
            }
            (Section::CellXfs, b"protection") => {
                if let Some(xf) = self.xf.as_mut() {
                    if let Some(locked) = attr_flag(e, b"locked") {
                        xf.protection.locked = locked;
                    }
                    if let Some(hidden) = attr_flag(e, b"hidden") {
                        xf.protection.hidden = hidden;
                    }
                }
            }
            _ => {}
        }
    }

    /// Handle a closing tag (also called right after self-closing tags)
    fn close(&mut self, name: &[u8]) {
        match name {
            b"fonts" | b"fills" | b"borders" | b"cellXfs" => self.section = Section::Other,
            b"font" if self.section == Section::Fonts => {
                if let Some(font) = self.font.take() {
                    self.fonts.push(font);
                }
            }
            b"fill" if self.section == Section::Fills => {
                let fill = self.fill.take().map(PendingFill::finish);
                self.fills.push(fill.unwrap_or_default());
            }
            b"stop" => self.stop_position = None,
            b"border" if self.section == Section::Borders => {
                if let Some(border) = self.border.take() {
                    self.borders.push(border);
                }
                self.edge = None;
            }
            b"xf" if self.section == Section::CellXfs => {
                if let Some(xf) = self.xf.take() {
                    self.xfs.push(xf);
                }
            }
            _ => {}
        }
    }

    /// Turn every `cellXfs` record into a complete [`Style`]
    fn finish(self) -> Vec<Style> {
        self.xfs
            .iter()
            .enumerate()
            .map(|(i, xf)| Style {
                font: component(&self.fonts, xf.font_id, "font", i),
                fill: component(&self.fills, xf.fill_id, "fill", i),
                border: component(&self.borders, xf.border_id, "border", i),
                alignment: xf.alignment.clone(),
                number_format: NumberFormat::from_id(
                    xf.num_fmt_id,
                    self.numfmts.get(&xf.num_fmt_id).map(String::as_str),
                ),
                protection: xf.protection,
            })
            .collect()
    }
}

fn component<T: Clone + Default>(table: &[T], id: u32, kind: &str, xf: usize) -> T {
    match table.get(id as usize) {
        Some(item) => item.clone(),
        None => {
            log::warn!("cellXfs[{}] refers to missing {} {}, using default", xf, kind, id);
            T::default()
        }
    }
}

fn apply_font_child(font: &mut FontStyle, tag: &[u8], e: &BytesStart<'_>) {
    match tag {
        b"b" => font.bold = attr_flag(e, b"val").unwrap_or(true),
        b"i" => font.italic = attr_flag(e, b"val").unwrap_or(true),
        b"strike" => font.strikethrough = attr_flag(e, b"val").unwrap_or(true),
        b"u" => {
            font.underline = attr_value(e, b"val")
                .map(|v| Underline::from_str(&v))
                .unwrap_or(Underline::Single)
        }
        b"vertAlign" => {
            if let Some(v) = attr_value(e, b"val") {
                font.vertical_align = FontVerticalAlign::from_str(&v);
            }
        }
        b"sz" => {
            if let Some(size) = parse_attr(e, b"val") {
                font.size = size;
            }
        }
        b"name" => {
            if let Some(name) = attr_value(e, b"val") {
                font.name = name;
            }
        }
        b"color" => font.color = parse_color_attrs(e),
        _ => {}
    }
}

fn read_alignment(align: &mut Alignment, e: &BytesStart<'_>) {
    if let Some(h) = attr_value(e, b"horizontal").and_then(|v| HorizontalAlignment::from_str(&v)) {
        align.horizontal = h;
    }
    if let Some(v) = attr_value(e, b"vertical").and_then(|v| VerticalAlignment::from_str(&v)) {
        align.vertical = v;
    }
    if let Some(wrap) = attr_flag(e, b"wrapText") {
        align.wrap_text = wrap;
    }
    if let Some(shrink) = attr_flag(e, b"shrinkToFit") {
        align.shrink_to_fit = shrink;
    }
    if let Some(indent) = parse_attr(e, b"indent") {
        align.indent = indent;
    }
    if let Some(rotation) = parse_attr(e, b"textRotation") {
        align.rotation = rotation;
    }
    if let Some(order) = parse_attr(e, b"readingOrder") {
        align.reading_order = ReadingOrder::from_code(order);
    }
}

/// Unescaped value of attribute `key`
pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Attribute `key` parsed as `T`
pub(crate) fn parse_attr<T: std::str::FromStr>(e: &BytesStart<'_>, key: &[u8]) -> Option<T> {
    attr_value(e, key).and_then(|v| v.trim().parse().ok())
}

/// Boolean attribute (`1`/`true` or `0`/`false`)
pub(crate) fn attr_flag(e: &BytesStart<'_>, key: &[u8]) -> Option<bool> {
    attr_value(e, key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    // Priority: rgb > theme > indexed > auto
    if let Some(rgb) = attr_value(e, b"rgb") {
        match Color::from_hex(&rgb) {
            // Opaque ARGB is plain RGB
            Some(Color::Argb { a: 0xFF, r, g, b }) => return Color::Rgb { r, g, b },
            Some(color) => return color,
            None => log::debug!("ignoring malformed rgb color '{}'", rgb),
        }
    }
    if let Some(index) = parse_attr::<u8>(e, b"theme") {
        return Color::Theme {
            index,
            tint: parse_attr(e, b"tint").unwrap_or(0.0),
        };
    }
    if let Some(i) = parse_attr::<u8>(e, b"indexed") {
        return Color::Indexed(i);
    }
    Color::Auto
}

/// Parse `xl/styles.xml` into one [`Style`] per `cellXfs` record
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut parser = StylesParser::default();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.open(&e),
            Ok(Event::Empty(e)) => {
                parser.open(&e);
                parser.close(e.local_name().as_ref());
            }
            Ok(Event::End(e)) => parser.close(e.local_name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetmerge_core::style::BorderStyle;

    fn roundtrip(styles: &[Style]) -> Vec<Style> {
        let mut pool = StylePool::new();
        for style in styles {
            pool.intern(style);
        }
        let xml = write_styles_xml(&pool);
        read_styles_xml(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_default_pool_has_one_xf() {
        let parsed = roundtrip(&[]);
        assert_eq!(parsed, vec![Style::default()]);
    }

    #[test]
    fn test_style_components_roundtrip() {
        let mut style = Style::new()
            .bold(true)
            .italic(true)
            .font_name("Arial & Sons")
            .font_size(14.5)
            .font_color(Color::theme(4, -0.25))
            .fill_color(Color::rgb(0xDD, 0xEE, 0xFF))
            .number_format("0.000%")
            .horizontal_alignment(HorizontalAlignment::Center)
            .wrap_text(true);
        style.font.underline = Underline::Double;
        style.font.vertical_align = FontVerticalAlign::Superscript;
        style.border = BorderStyle::all(BorderLineStyle::Thin, Color::Indexed(10))
            .with_bottom(BorderLineStyle::Double, Color::argb(0x80, 1, 2, 3));
        style.border.diagonal = Some(BorderEdge::new(BorderLineStyle::Thin, Color::BLACK));
        style.border.diagonal_direction = DiagonalDirection::Both;
        style.alignment.rotation = 45;
        style.alignment.indent = 2;
        style.protection = Protection::unlocked();

        let parsed = roundtrip(&[style.clone()]);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1], style);
    }

    #[test]
    fn test_pattern_and_gradient_fills() {
        let pattern = Style {
            fill: FillStyle::pattern(PatternType::DarkTrellis, Color::RED, Color::Indexed(9)),
            ..Style::default()
        };
        let gradient = Style {
            fill: FillStyle::Gradient {
                gradient_type: GradientType::Linear,
                angle: 90.0,
                stops: vec![
                    GradientStop::new(0.0, Color::WHITE),
                    GradientStop::new(1.0, Color::theme(5, 0.5)),
                ],
            },
            ..Style::default()
        };

        let parsed = roundtrip(&[pattern.clone(), gradient.clone()]);
        assert_eq!(parsed[1], pattern);
        assert_eq!(parsed[2], gradient);
    }

    #[test]
    fn test_builtin_and_custom_number_formats() {
        let builtin = Style {
            number_format: NumberFormat::BuiltIn(14),
            ..Style::default()
        };
        let custom = Style::new().number_format("yyyy-mm-dd \"at\" hh:mm");

        let parsed = roundtrip(&[builtin.clone(), custom.clone()]);
        assert_eq!(parsed[1].number_format, NumberFormat::BuiltIn(14));
        assert_eq!(parsed[2].number_format, custom.number_format);
    }

    #[test]
    fn test_reads_excel_written_styles() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="165" formatCode="&quot;$&quot;#,##0"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font>
    <font><b/><sz val="12"/><color rgb="FFFF0000"/><name val="Calibri"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor theme="4" tint="0.59999389629810485"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/><diagonal/></border>
    <border><left style="thin"><color indexed="64"/></left><right/><top/><bottom style="medium"/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="165" fontId="1" fillId="2" borderId="1" xfId="0" applyFont="1"><alignment vertical="top"/><protection locked="0"/></xf>
  </cellXfs>
</styleSheet>"#;

        let styles = read_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(styles.len(), 2);

        let s = &styles[1];
        assert!(s.font.bold);
        assert_eq!(s.font.size, 12.0);
        assert_eq!(s.font.color, Color::RED);
        assert_eq!(s.fill, FillStyle::solid(Color::theme(4, 0.59999389629810485)));
        assert_eq!(
            s.border.left,
            Some(BorderEdge::new(BorderLineStyle::Thin, Color::Indexed(64)))
        );
        assert_eq!(
            s.border.bottom,
            Some(BorderEdge::new(BorderLineStyle::Medium, Color::Auto))
        );
        assert_eq!(s.number_format, NumberFormat::Custom("\"$\"#,##0".into()));
        assert_eq!(s.alignment.vertical, VerticalAlignment::Top);
        assert!(!s.protection.locked);
        assert_eq!(styles[0].font.color, Color::theme(1, 0.0));
    }

    #[test]
    fn test_missing_component_falls_back_to_default() {
        let xml = r#"<styleSheet>
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <cellXfs count="1"><xf numFmtId="0" fontId="7" fillId="0" borderId="0"/></cellXfs>
</styleSheet>"#;
        let styles = read_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(styles, vec![Style::default()]);
    }
}
