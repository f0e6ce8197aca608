//! # Timetable Extraction Module
//!
//! Turns the grid of a college timetable sheet into a per-group schedule:
//!
//! - [`locator`] finds group columns in the header row
//! - [`classifier`] maps a lesson cell's fill colour to a [`DeliveryMode`]
//! - [`lesson`] splits free-text lesson cells into subject, teacher, room and subgroup
//! - [`extractor`] walks the day/time/slot rows of one group column
//! - [`formatter`] renders the result as chat text
//! - [`cohort`] maps an education base and course to a workbook
use chrono::Weekday;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

pub mod classifier;
pub mod cohort;
pub mod extractor;
pub mod formatter;
pub mod lesson;
pub mod locator;

/// Subject shown for a slot without a lesson.
pub const NO_CLASS: &str = "Нет пары";

/// Weekday labels as they appear in the day column, Monday first.
pub const WEEKDAY_NAMES: [(&str, Weekday); 6] = [
    ("Понедельник", Weekday::Mon),
    ("Вторник", Weekday::Tue),
    ("Среда", Weekday::Wed),
    ("Четверг", Weekday::Thu),
    ("Пятница", Weekday::Fri),
    ("Суббота", Weekday::Sat),
];

/// Resolves a day label ("Среда", "СРЕДА") to a weekday.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    let name = name.trim().to_lowercase();
    WEEKDAY_NAMES
        .iter()
        .find(|(label, _)| label.to_lowercase() == name)
        .map(|(_, weekday)| *weekday)
}

/// How a lesson is delivered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// In person
    #[default]
    Normal,
    /// Remote
    Distant,
    /// Independent study
    SelfStudy,
}

/// Lesson counters of one extraction run.
///
/// `total` counts non-empty lesson cells; every counted cell lands in exactly
/// one of `normal`, `distant` and `self_study`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub distant: usize,
    pub self_study: usize,
    pub normal: usize,
}

impl Stats {
    pub fn record(&mut self, mode: DeliveryMode) {
        self.total += 1;
        match mode {
            DeliveryMode::Normal => self.normal += 1,
            DeliveryMode::Distant => self.distant += 1,
            DeliveryMode::SelfStudy => self.self_study += 1,
        }
    }
}

/// One lesson slot of a group's schedule.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub slot: u32,
    /// Day label from the sheet ("Понедельник")
    pub day: String,
    /// Time range, from the sheet or the lesson-time table
    pub time: String,
    /// Subject prefixed with the delivery-mode marker when not in person
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub subgroup: String,
    pub mode: DeliveryMode,
    /// True for "no class" placeholders
    pub vacant: bool,
}

impl ScheduleEntry {
    /// Placeholder for a slot whose lesson cell is empty.
    pub fn vacant(slot: u32, day: &str, time: &str) -> Self {
        ScheduleEntry {
            slot,
            day: day.to_owned(),
            time: time.to_owned(),
            subject: NO_CLASS.to_owned(),
            teacher: String::new(),
            room: String::new(),
            subgroup: String::new(),
            mode: DeliveryMode::Normal,
            vacant: true,
        }
    }
}

/// A group's schedule keyed by slot number, with the counters of the run that built it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Schedule {
    pub entries: BTreeMap<u32, ScheduleEntry>,
    pub stats: Stats,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts an entry, returning the entry it replaced.
    pub fn insert(&mut self, entry: ScheduleEntry) -> Option<ScheduleEntry> {
        self.entries.insert(entry.slot, entry)
    }

    pub fn get(&self, slot: u32) -> Option<&ScheduleEntry> {
        self.entries.get(&slot)
    }
}
