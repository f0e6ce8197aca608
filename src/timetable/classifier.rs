use crate::spreadsheet::Fill;
use crate::spreadsheet::FillColor;
use crate::timetable::DeliveryMode;
use serde::Deserialize;
use serde::Serialize;

/// A configured fill colour, written in config as `{"theme": 9}`, `{"indexed": 9}` or `{"rgb": "FFE26B0A"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMatch {
    Rgb(String),
    Theme(u32),
    Indexed(u32),
}

impl ColorMatch {
    pub fn matches(&self, color: &FillColor) -> bool {
        match (self, color) {
            (ColorMatch::Rgb(expected), FillColor::Rgb(actual)) => normalize_argb(expected) == normalize_argb(actual),
            (ColorMatch::Theme(expected), FillColor::Theme(actual)) => expected == actual,
            (ColorMatch::Indexed(expected), FillColor::Indexed(actual)) => expected == actual,
            _ => false,
        }
    }
}

// "#c5d9f1" and "FFC5D9F1" name the same opaque colour
fn normalize_argb(value: &str) -> String {
    let hex = value.trim().trim_start_matches('#').to_ascii_uppercase();
    if hex.len() == 6 {
        format!("FF{hex}")
    } else {
        hex
    }
}

/// Maps lesson cell fills to delivery modes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillPalette {
    pub distant: Vec<ColorMatch>,
    pub self_study: Vec<ColorMatch>,
    /// Lower-case fragments marking a plainly filled cell as self-study
    pub self_study_markers: Vec<String>,
}

impl Default for FillPalette {
    fn default() -> Self {
        FillPalette {
            distant: vec![
                ColorMatch::Theme(9),
                ColorMatch::Indexed(9),
                ColorMatch::Rgb("FFE26B0A".to_owned()),
                ColorMatch::Rgb("FFFFC000".to_owned()),
            ],
            self_study: vec![ColorMatch::Rgb("FFC5D9F1".to_owned())],
            self_study_markers: vec!["самостоятельн".to_owned(), "с/р".to_owned()],
        }
    }
}

impl FillPalette {
    /// Delivery mode signalled by a fill alone. Missing, empty and unknown fills are `Normal`.
    pub fn classify(&self, fill: Option<&Fill>) -> DeliveryMode {
        let Some(color) = fill.filter(|fill| fill.is_painted()).and_then(|fill| fill.foreground.as_ref()) else {
            return DeliveryMode::Normal;
        };
        if self.distant.iter().any(|expected| expected.matches(color)) {
            DeliveryMode::Distant
        } else if self.self_study.iter().any(|expected| expected.matches(color)) {
            DeliveryMode::SelfStudy
        } else {
            DeliveryMode::Normal
        }
    }

    /// Like [`classify`](Self::classify), but a `Normal` cell whose text carries a
    /// self-study marker is reported as `SelfStudy`.
    pub fn classify_lesson(&self, fill: Option<&Fill>, text: &str) -> DeliveryMode {
        match self.classify(fill) {
            DeliveryMode::Normal if self.has_self_study_marker(text) => DeliveryMode::SelfStudy,
            mode => mode,
        }
    }

    fn has_self_study_marker(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.self_study_markers
            .iter()
            .any(|marker| !marker.is_empty() && text.contains(&marker.to_lowercase()))
    }
}
