use crate::spreadsheet::Grid;
use crate::timetable::classifier::FillPalette;
use crate::timetable::lesson::LessonParser;
use crate::timetable::locator::SheetLayout;
use crate::timetable::DeliveryMode;
use crate::timetable::Schedule;
use crate::timetable::ScheduleEntry;
use std::collections::BTreeMap;
use tracing::info;
use tracing::warn;

/// Day assumed until the first day cell is seen.
const FIRST_DAY: &str = "Понедельник";

/// Time shown when neither the sheet nor the lesson-time table knows it.
const UNKNOWN_TIME: &str = "?";

/// Subject as shown to the user: remote and self-study lessons carry a marker.
pub fn display_subject(subject: &str, mode: DeliveryMode) -> String {
    match mode {
        DeliveryMode::Normal => subject.to_owned(),
        DeliveryMode::Distant => format!("💻 {subject} (дистант)"),
        DeliveryMode::SelfStudy => format!("📚 {subject} (самостоятельная)"),
    }
}

/// Walks the lesson rows of one group column.
pub struct Extractor<'a> {
    layout: SheetLayout,
    lesson_times: &'a BTreeMap<u32, String>,
    palette: &'a FillPalette,
    parser: &'a LessonParser,
}

impl<'a> Extractor<'a> {
    pub fn new(
        layout: SheetLayout,
        lesson_times: &'a BTreeMap<u32, String>,
        palette: &'a FillPalette,
        parser: &'a LessonParser,
    ) -> Self {
        Extractor { layout, lesson_times, palette, parser }
    }

    /// Builds the schedule of the group in `column`.
    ///
    /// Rows run from below the header to the last populated row. A row counts
    /// only when its slot cell holds a positive integer; the day carries forward
    /// from the last non-empty day cell. Empty lesson cells become "no class"
    /// placeholders and are not counted.
    pub fn extract(&self, grid: &Grid, column: usize) -> Schedule {
        let layout = &self.layout;
        let mut schedule = Schedule::default();
        let mut day = FIRST_DAY.to_owned();

        for row in layout.header_row + 1..=grid.max_row() {
            // "Среда 8 октября" → "Среда"
            if let Some(label) = grid.text(row, layout.day_column) {
                if let Some(first) = label.split_whitespace().next() {
                    day = first.to_owned();
                }
            }

            let Some(slot) = grid
                .value(row, layout.slot_column)
                .to_integer()
                .and_then(|slot| u32::try_from(slot).ok())
                .filter(|slot| *slot > 0)
            else {
                continue;
            };

            let time = grid
                .text(row, layout.time_column)
                .or_else(|| self.lesson_times.get(&slot).cloned())
                .unwrap_or_else(|| UNKNOWN_TIME.to_owned());

            let entry = match grid.text(row, column) {
                None => ScheduleEntry::vacant(slot, &day, &time),
                Some(text) => {
                    let mode = self.palette.classify_lesson(grid.fill(row, column), &text);
                    let lesson = self.parser.parse(&text);
                    schedule.stats.record(mode);
                    ScheduleEntry {
                        slot,
                        day: day.clone(),
                        time,
                        subject: display_subject(&lesson.subject, mode),
                        teacher: lesson.teacher,
                        room: lesson.room,
                        subgroup: lesson.subgroup,
                        mode,
                        vacant: false,
                    }
                }
            };

            if let Some(previous) = schedule.insert(entry) {
                warn!(row, slot, replaced_day = %previous.day, "slot number repeats, keeping the later row");
            }
        }

        info!(
            sheet = %grid.name,
            column,
            entries = schedule.len(),
            total = schedule.stats.total,
            distant = schedule.stats.distant,
            self_study = schedule.stats.self_study,
            "extracted schedule"
        );
        schedule
    }
}
