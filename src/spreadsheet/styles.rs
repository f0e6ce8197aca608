use crate::error::TimetableError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::match_xml_events;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::io::BufRead;

// XML tag names for the fill-related parts of styles.xml
const TAG_FILLS: QName = QName(b"fills");                // Fill definitions container
const TAG_FILL: QName = QName(b"fill");                  // Individual fill definition
const TAG_PATTERN_FILL: QName = QName(b"patternFill");   // Pattern fill with colours
const TAG_GRADIENT_FILL: QName = QName(b"gradientFill"); // Gradient fill
const TAG_FOREGROUND: QName = QName(b"fgColor");         // Pattern foreground colour
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");     // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");            // Individual cell format index

/// Colour reference used by a fill.
#[derive(Clone, Debug, PartialEq)]
pub enum FillColor {
    /// ARGB hex string, upper-cased (e.g. "FFE26B0A")
    Rgb(String),
    /// Index into the workbook theme palette
    Theme(u32),
    /// Index into the legacy indexed palette
    Indexed(u32),
    /// System automatic colour
    Auto,
}

impl FillColor {
    /// Reads a colour from `rgb`, `theme`, `indexed` or `auto` attributes.
    /// Unparseable values yield `None`.
    fn from_element(event: &BytesStart<'_>) -> Result<Option<FillColor>, TimetableError> {
        if let Some(rgb) = event.get_attribute_value("rgb")? {
            return Ok(Some(FillColor::Rgb(rgb.trim().to_ascii_uppercase())));
        }
        if let Some(theme) = event.get_attribute_value("theme")? {
            return Ok(theme.trim().parse().ok().map(FillColor::Theme));
        }
        if let Some(indexed) = event.get_attribute_value("indexed")? {
            return Ok(indexed.trim().parse().ok().map(FillColor::Indexed));
        }
        let auto = event.get_attribute_value("auto")?
            .map(|value| value == "1" || value == "true")
            .unwrap_or(false);
        Ok(auto.then_some(FillColor::Auto))
    }
}

/// Background fill of a cell format.
#[derive(Clone, Debug, PartialEq)]
pub struct Fill {
    /// `patternType` of the fill ("none", "solid", "gray125", ...; "gradient" for gradient fills)
    pub pattern: String,
    pub foreground: Option<FillColor>,
}

impl Default for Fill {
    fn default() -> Self {
        Fill { pattern: "none".to_owned(), foreground: None }
    }
}

impl Fill {
    /// A solid fill of the given colour.
    pub fn solid(color: FillColor) -> Self {
        Fill { pattern: "solid".to_owned(), foreground: Some(color) }
    }

    /// Returns false for `none` pattern fills, which paint nothing.
    pub fn is_painted(&self) -> bool {
        !self.pattern.eq_ignore_ascii_case("none")
    }
}

/// Fill lookup table of a workbook: cell format index → fill.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Styles {
    fills: Vec<Fill>,
    /// `fillId` of every `cellXfs/xf`, in order
    cell_fills: Vec<usize>,
}

impl Styles {
    pub fn new(fills: Vec<Fill>, cell_fills: Vec<usize>) -> Self {
        Styles { fills, cell_fills }
    }

    /// Resolves the fill of a cell style index; `None` when either index is out of range.
    pub fn fill(&self, style: usize) -> Option<&Fill> {
        self.cell_fills
            .get(style)
            .and_then(|fill_id| self.fills.get(*fill_id))
    }
}

/// Reads the `fills` and `cellXfs` tables from styles.xml.
///
/// Fills nested in `dxfs` (conditional formats) are ignored, as are `xf`
/// entries of `cellStyleXfs`. An `xf` without a valid `fillId` points at fill 0.
pub(crate) fn read_styles<R: BufRead>(reader: &mut XmlReader<R>) -> Result<Styles, TimetableError> {
    let mut styles = Styles::default();
    let mut fills_context = false;
    let mut format_indexes_context = false;
    let mut fill = None::<Fill>;
    let mut pattern_context = false;

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_FILLS => fills_context = true,
        Event::End(event) if event.name() == TAG_FILLS => fills_context = false,
        Event::Start(event) if fills_context && event.name() == TAG_FILL => fill = Some(Fill::default()),
        Event::End(event) if fills_context && event.name() == TAG_FILL => {
            if let Some(fill) = fill.take() {
                styles.fills.push(fill);
            }
        }
        Event::Start(event) if fill.is_some() && event.name() == TAG_PATTERN_FILL => {
            pattern_context = true;
            if let Some(fill) = fill.as_mut() {
                if let Some(pattern) = event.get_attribute_value("patternType")? {
                    fill.pattern = pattern.to_string();
                }
            }
        }
        Event::End(event) if event.name() == TAG_PATTERN_FILL => pattern_context = false,
        Event::Start(event) if fill.is_some() && event.name() == TAG_GRADIENT_FILL => {
            if let Some(fill) = fill.as_mut() {
                fill.pattern = "gradient".to_owned();
            }
        }
        Event::Start(event) if pattern_context && event.name() == TAG_FOREGROUND => {
            let color = FillColor::from_element(&event)?;
            if let Some(fill) = fill.as_mut() {
                fill.foreground = color;
            }
        }

        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = false,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let fill_id = event.parse_attribute_value::<usize>("fillId").ok().flatten().unwrap_or(0);
            styles.cell_fills.push(fill_id);
        }
    });

    Ok(styles)
}
