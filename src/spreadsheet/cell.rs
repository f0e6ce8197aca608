use std::fmt::Display;

/// Decoded value of a worksheet cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    /// Shared, inline and formula strings
    Text(String),
    /// Numeric values, dates included
    Number(f64),
    /// Boolean values (true/false)
    Boolean(bool),
}

impl CellValue {
    /// Decodes the raw `<v>` content of a numeric cell, falling back to text.
    pub(crate) fn from_number(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(number) => CellValue::Number(number),
            Err(_) => CellValue::Text(raw.to_owned()),
        }
    }

    /// Returns true for empty cells and for text that is blank after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual form, `None` for blank cells.
    pub fn text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string().trim().to_owned())
        }
    }

    /// Integer form: integral numbers, or text holding a plain integer.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            CellValue::Number(number) if number.fract() == 0.0 && number.is_finite() => Some(*number as i64),
            CellValue::Text(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => write!(f, "{}", text),
            CellValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => write!(f, "{}", *number as i64),
            CellValue::Number(number) => write!(f, "{}", number),
            CellValue::Boolean(value) => write!(f, "{}", if *value { "TRUE" } else { "FALSE" }),
        }
    }
}

/// A single worksheet cell with position, value and style index.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (1-based)
    pub row: usize,
    /// Column index (1-based)
    pub col: usize,
    pub value: CellValue,
    /// Index into the workbook's `cellXfs` table
    pub style: Option<usize>,
}

impl Cell {
    pub fn new(row: usize, col: usize, value: CellValue, style: Option<usize>) -> Self {
        Cell { row, col, value, style }
    }

    /// Shorthand for an unstyled text cell.
    pub fn text(row: usize, col: usize, text: &str) -> Self {
        Cell::new(row, col, CellValue::Text(text.to_owned()), None)
    }
}
