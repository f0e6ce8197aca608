//! # Rusty Timetable
//!
//! Extracts per-group class schedules from a college's `.xlsx` timetable
//! workbooks and renders them as chat messages.
//!
//! ## Features
//!
//! - **Workbook reading**: Pure Rust `.xlsx` decoding (zip + SpreadsheetML) of the active sheet,
//!   including cell fills, from local files or http(s) URLs
//! - **Group lookup**: Finds a cohort's groups in the loosely structured header row
//! - **Lesson parsing**: Splits free-text lesson cells into subject, teacher, room and subgroup
//! - **Delivery modes**: Tells in-person, remote and self-study lessons apart by fill colour
//! - **Chat output**: Formats schedules by weekday and splits them into size-limited messages
//!
//! ## Example
//!
//! ```no_run
//! use rusty_timetable::config::Config;
//! use rusty_timetable::service::TimetableService;
//!
//! let service = TimetableService::new(Config::default());
//! for group in service.find_groups("1 курс") {
//!     if let Ok(schedule) = service.group_schedule("1 курс", &group) {
//!         for message in service.render(&schedule, &group) {
//!             println!("{message}");
//!         }
//!     }
//! }
//! ```
pub mod config;
pub mod error;
mod helpers;
pub mod service;
pub mod spreadsheet;
pub mod timetable;

pub use error::TimetableError;
pub use helpers::reader::UnifiedReader;
pub use helpers::reader::UnifiedReaderError;
pub use helpers::xml::XmlError;
