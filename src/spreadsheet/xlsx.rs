use crate::error::ResultMessage;
use crate::error::TimetableError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::grid::Grid;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::styles::read_styles;
use crate::spreadsheet::styles::Styles;
use crate::spreadsheet::WorkbookError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Read;
use std::io::Seek;
use tracing::debug;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_RELATIONSHIP: &[u8] = b"Relationship";        // Relationship entry in .rels parts
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");     // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");         // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                    // Text content within strings
const TAG_WORKBOOK_VIEW: QName = QName(b"workbookView"); // Window settings, holds the active tab
const TAG_SHEET: QName = QName(b"sheet");               // Worksheet definition
const TAG_ROW: QName = QName(b"row");                   // Row in worksheet
const TAG_CELL: QName = QName(b"c");                    // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");          // Inline string value
const TAG_VALUE: QName = QName(b"v");                   // Cell value content

/// How the `<v>` content of a cell is decoded, from the `t` attribute
#[derive(Copy, Clone, Debug, Default, PartialEq)]
enum ValueKind {
    #[default]
    Number,
    SharedString,
    InlineString,
    Boolean,
    Error,
}

impl ValueKind {
    fn parse(kind: Option<&str>) -> Self {
        match kind {
            Some("s") => ValueKind::SharedString,
            Some("inlineStr") | Some("str") => ValueKind::InlineString,
            Some("b") => ValueKind::Boolean,
            Some("e") => ValueKind::Error,
            _ => ValueKind::Number,
        }
    }
}

/// An opened `.xlsx` workbook with its shared tables loaded.
pub struct Workbook<R: Read + Seek = UnifiedReader> {
    /// File name or URL of the workbook
    pub name: String,
    zip: ZipArchive<R>,
    /// Worksheets as (name, zip_path) pairs in tab order
    sheets: Vec<(String, String)>,
    /// Tab index of the sheet that was active when the workbook was saved
    active_tab: usize,
    shared_strings: Vec<String>,
    styles: Styles,
}

impl<R: Read + Seek> Workbook<R> {
    /// Opens a workbook and loads its sheet list, shared strings and styles
    ///
    /// # Arguments
    /// * `name` - File name or URL, used in logs and errors
    /// * `reader` - Seekable reader over the workbook bytes
    ///
    /// # Returns
    /// Result containing the opened workbook or an error
    pub fn open(name: &str, reader: R) -> Result<Workbook<R>, TimetableError> {
        let mut zip = ZipArchive::new(reader).map_err(TimetableError::from).with_prefix(name)?;
        let (sheets, active_tab) = load_workbook(&mut zip).with_prefix(name)?;
        if sheets.is_empty() {
            Err(WorkbookError::WorkbookEmptyError(name.to_owned()))?
        }
        let shared_strings = load_shared_strings(&mut zip).with_prefix(name)?;
        let styles = match zip.xml_reader("xl/styles.xml")? {
            Some(mut reader) => read_styles(&mut reader).with_prefix(name)?,
            None => Styles::default(),
        };
        debug!(workbook = name, sheets = sheets.len(), shared_strings = shared_strings.len(), "opened workbook");
        Ok(Workbook {
            name: name.to_owned(),
            zip,
            sheets,
            active_tab,
            shared_strings,
            styles,
        })
    }

    /// Names of the worksheets in tab order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Name of the active worksheet
    pub fn active_sheet_name(&self) -> &str {
        let index = self.active_index();
        self.sheets[index].0.as_str()
    }

    fn active_index(&self) -> usize {
        if self.active_tab < self.sheets.len() { self.active_tab } else { 0 }
    }

    /// Reads the active worksheet into a grid
    pub fn read_active_sheet(&mut self) -> Result<Grid, TimetableError> {
        self.read_sheet(self.active_index())
    }

    /// Reads the worksheet at a tab index into a grid
    ///
    /// Cells of type error are kept as empty cells; shared-string indexes outside
    /// the table are reported as errors.
    pub fn read_sheet(&mut self, index: usize) -> Result<Grid, TimetableError> {
        let (sheet_name, zip_path) = self.sheets
            .get(index)
            .cloned()
            .ok_or_else(|| WorkbookError::SheetNotFoundError(self.name.to_owned(), index))?;
        let mut grid = Grid::new(&self.name, &sheet_name, self.styles.clone());

        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut style = None::<usize>;
        let mut kind = ValueKind::default();
        let mut value = None::<String>;
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| WorkbookError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                row_count = event.parse_attribute_value::<usize>("r")?.unwrap_or(row_count + 1);
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count.max(1), col_count + 1));
                col_count = col;
                style = event.parse_attribute_value::<usize>("s")?;
                kind = ValueKind::parse(event.get_attribute_value("t")?.as_deref());
                value = None;
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = Some(read_string_value(&mut reader, TAG_INLINE_STRING, false)?);
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = Some(read_string_value(&mut reader, TAG_VALUE, true)?);
            }
            Event::End(event) if event.name() == TAG_CELL => {
                let cell_value = decode(&self.shared_strings, kind, value.take(), row, col)?;
                if cell_value != CellValue::Empty || style.is_some() {
                    grid.push(Cell::new(row, col, cell_value, style));
                }
            }
        });
        debug!(workbook = %self.name, sheet = %sheet_name, rows = grid.max_row(), columns = grid.max_column(), "read worksheet");
        Ok(grid)
    }
}

/// Decodes the raw content of a cell according to its `t` attribute
fn decode(shared_strings: &[String], kind: ValueKind, value: Option<String>, row: usize, col: usize) -> Result<CellValue, TimetableError> {
    let Some(value) = value else {
        return Ok(CellValue::Empty);
    };
    let decoded = match kind {
        ValueKind::Number => CellValue::from_number(&value),
        ValueKind::InlineString => CellValue::Text(value),
        ValueKind::Boolean => CellValue::Boolean(value.trim() == "1"),
        ValueKind::Error => CellValue::Empty,
        ValueKind::SharedString => {
            let index = value.trim().parse::<usize>()?;
            let text = shared_strings
                .get(index)
                .ok_or_else(|| WorkbookError::SharedStringError(index_to_reference(row, col), index))?;
            CellValue::Text(text.to_owned())
        }
    };
    Ok(decoded)
}

/// Loads worksheet relationships: relationship id → zip path of the worksheet
fn load_relationships<R: Read + Seek>(zip: &mut ZipArchive<R>, path: &str) -> Result<HashMap<String, String>, TimetableError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| WorkbookError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Loads the worksheet list and the active tab index from workbook.xml
fn load_workbook<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<(Vec<(String, String)>, usize), TimetableError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| WorkbookError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut active_tab = 0usize;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_VIEW => {
            active_tab = event.parse_attribute_value::<usize>("activeTab")?.unwrap_or(0);
        }
    });
    Ok((sheets, active_tab))
}

/// Loads the whole shared string table
fn load_shared_strings<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<String>, TimetableError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

/// Normalizes a relationship target to a path inside the zip archive
fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Reads string value from XML content up to `end_tag`
///
/// Rich-text runs are concatenated and phonetic annotations are skipped.
/// With `is_text_content` the content is text from the start (`<v>`); otherwise
/// only `<t>` elements count (`<si>`, `<is>`).
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, TimetableError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Builds small `.xlsx` files in memory for tests.

    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Worksheet cell content in fixtures
    pub(crate) enum FixtureValue<'a> {
        Shared(&'a str),
        Inline(&'a str),
        Number(f64),
        Blank,
    }

    pub(crate) struct FixtureCell<'a> {
        pub(crate) reference: &'a str,
        pub(crate) value: FixtureValue<'a>,
        pub(crate) style: Option<usize>,
    }

    pub(crate) fn shared<'a>(reference: &'a str, text: &'a str) -> FixtureCell<'a> {
        FixtureCell { reference, value: FixtureValue::Shared(text), style: None }
    }

    pub(crate) fn styled<'a>(reference: &'a str, text: &'a str, style: usize) -> FixtureCell<'a> {
        FixtureCell { reference, value: FixtureValue::Shared(text), style: Some(style) }
    }

    pub(crate) fn number(reference: &str, value: f64) -> FixtureCell<'_> {
        FixtureCell { reference, value: FixtureValue::Number(value), style: None }
    }

    /// Styles with fills: 0 none, 1 gray125, 2 theme 9, 3 rgb FFC5D9F1;
    /// cell formats: 0 → fill 0, 1 → fill 2 (distant), 2 → fill 3 (self-study)
    pub(crate) const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fills count="4"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor theme="9" tint="0.3999755851924192"/><bgColor indexed="64"/></patternFill></fill><fill><patternFill patternType="solid"><fgColor rgb="FFC5D9F1"/><bgColor indexed="64"/></patternFill></fill></fills>
<cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" xfId="0"/><xf numFmtId="0" fontId="0" fillId="2" xfId="0" applyFill="1"/><xf numFmtId="0" fontId="0" fillId="3" xfId="0" applyFill="1"/></cellXfs>
</styleSheet>"#;

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    }

    /// Writes a workbook whose sheets are given as (name, cells); `active_tab` selects the active sheet.
    pub(crate) fn workbook(sheets: &[(&str, Vec<FixtureCell<'_>>)], active_tab: usize) -> Vec<u8> {
        let mut strings = Vec::<String>::new();
        let mut sheet_xml = Vec::<String>::new();
        for (_, cells) in sheets {
            let mut rows = std::collections::BTreeMap::<usize, Vec<String>>::new();
            for cell in cells {
                let row = cell.reference
                    .trim_start_matches(|character: char| character.is_ascii_alphabetic())
                    .parse::<usize>()
                    .unwrap();
                let style = cell.style.map(|style| format!(r#" s="{style}""#)).unwrap_or_default();
                let xml = match &cell.value {
                    FixtureValue::Shared(text) => {
                        let index = strings.iter().position(|it| it == text).unwrap_or_else(|| {
                            strings.push(text.to_string());
                            strings.len() - 1
                        });
                        format!(r#"<c r="{}"{style} t="s"><v>{index}</v></c>"#, cell.reference)
                    }
                    FixtureValue::Inline(text) => {
                        format!(r#"<c r="{}"{style} t="inlineStr"><is><t>{}</t></is></c>"#, cell.reference, escape(text))
                    }
                    FixtureValue::Number(value) => format!(r#"<c r="{}"{style}><v>{value}</v></c>"#, cell.reference),
                    FixtureValue::Blank => format!(r#"<c r="{}"{style}/>"#, cell.reference),
                };
                rows.entry(row).or_default().push(xml);
            }
            let rows: String = rows
                .into_iter()
                .map(|(row, cells)| format!(r#"<row r="{row}">{}</row>"#, cells.concat()))
                .collect();
            sheet_xml.push(format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{rows}</sheetData></worksheet>"#
            ));
        }

        let sheet_entries: String = sheets
            .iter()
            .enumerate()
            .map(|(index, (name, _))| format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, escape(name), index + 1, index + 1))
            .collect();
        let workbook = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><bookViews><workbookView activeTab="{active_tab}"/></bookViews><sheets>{sheet_entries}</sheets></workbook>"#
        );
        let relationships: String = (1..=sheets.len())
            .map(|index| format!(r#"<Relationship Id="rId{index}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{index}.xml"/>"#))
            .chain(std::iter::once(r#"<Relationship Id="rIdS" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#.to_owned()))
            .collect();
        let relationships = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
        );
        let shared_strings: String = strings.iter().map(|text| format!("<si><t>{}</t></si>", escape(text))).collect();
        let shared_strings = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{shared_strings}</sst>"#,
            strings.len()
        );

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut parts = vec![
            ("xl/workbook.xml".to_owned(), workbook),
            ("xl/_rels/workbook.xml.rels".to_owned(), relationships),
            ("xl/sharedStrings.xml".to_owned(), shared_strings),
            ("xl/styles.xml".to_owned(), STYLES.to_owned()),
        ];
        for (index, xml) in sheet_xml.into_iter().enumerate() {
            parts.push((format!("xl/worksheets/sheet{}.xml", index + 1), xml));
        }
        for (name, content) in parts {
            writer.start_file(name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}
