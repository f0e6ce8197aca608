//! Entry points used by the chat front end: list a cohort's groups, build a
//! group's schedule and render it as messages.
use crate::config::Cohort;
use crate::config::Config;
use crate::error::TimetableError;
use crate::spreadsheet;
use crate::spreadsheet::Grid;
use crate::timetable::cohort::course_key;
use crate::timetable::cohort::EducationBase;
use crate::timetable::extractor::Extractor;
use crate::timetable::formatter::format_schedule;
use crate::timetable::formatter::split_message;
use crate::timetable::lesson::LessonParser;
use crate::timetable::locator::find_group_column;
use crate::timetable::locator::find_groups;
use crate::timetable::Schedule;
use thiserror::Error;
use tracing::info;
use tracing::warn;

/// Why a group's schedule could not be produced.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("No timetable is configured for '{0}'")]
    UnknownCohort(String),

    #[error("Failed to load timetable '{0}': {1}")]
    LoadFailed(String, #[source] TimetableError),

    #[error("Group '{0}' not found in timetable '{1}'")]
    GroupNotFound(String, String),
}

/// Timetable lookups over the configured cohorts.
///
/// Holds only configuration and compiled patterns; every call loads its own
/// workbook, so one service can be shared between threads.
#[derive(Debug, Clone)]
pub struct TimetableService {
    config: Config,
    parser: LessonParser,
}

impl TimetableService {
    pub fn new(config: Config) -> Self {
        let parser = LessonParser::new(&config.lessons);
        TimetableService { config, parser }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn cohort(&self, key: &str) -> Result<&Cohort, LookupError> {
        self.config
            .cohorts
            .get(key)
            .ok_or_else(|| LookupError::UnknownCohort(key.to_owned()))
    }

    fn load(&self, cohort: &Cohort) -> Result<Grid, TimetableError> {
        spreadsheet::load_active_grid(&cohort.source, self.config.download_timeout())
    }

    /// Groups listed in a cohort's workbook. Unknown cohorts and unreadable workbooks yield no groups.
    pub fn find_groups(&self, cohort_key: &str) -> Vec<String> {
        let cohort = match self.cohort(cohort_key) {
            Ok(cohort) => cohort,
            Err(error) => {
                warn!(%error, "cannot list groups");
                return Vec::new();
            }
        };
        match self.load(cohort) {
            Ok(grid) => find_groups(&grid, &cohort.layout, &cohort.track_codes),
            Err(error) => {
                warn!(cohort = cohort_key, source = %cohort.source, %error, "failed to load timetable");
                Vec::new()
            }
        }
    }

    /// Groups a student of `base` in `course` can pick from.
    ///
    /// 11th-grade entrants are listed in the next course's workbook and carry the "с" suffix.
    pub fn groups_for(&self, base: EducationBase, course: u32) -> Vec<String> {
        let key = course_key(base.workbook_course(course));
        let groups = base.filter_groups(self.find_groups(&key));
        info!(%base, course, workbook = %key, count = groups.len(), "groups for course");
        groups
    }

    /// Schedule of `group` in a cohort's workbook.
    pub fn group_schedule(&self, cohort_key: &str, group: &str) -> Result<Schedule, LookupError> {
        let cohort = self.cohort(cohort_key)?;
        let grid = self
            .load(cohort)
            .map_err(|error| LookupError::LoadFailed(cohort.source.clone(), error))?;
        let column = find_group_column(&grid, &cohort.layout, group)
            .ok_or_else(|| LookupError::GroupNotFound(group.to_owned(), cohort_key.to_owned()))?;
        info!(group, column, "found group column");

        let extractor = Extractor::new(cohort.layout, &self.config.lesson_times, &self.config.palette, &self.parser);
        Ok(extractor.extract(&grid, column))
    }

    /// Schedule of `group` for a student of `base` in `course`.
    pub fn schedule_for(&self, base: EducationBase, course: u32, group: &str) -> Result<Schedule, LookupError> {
        self.group_schedule(&course_key(base.workbook_course(course)), group)
    }

    /// Formats a schedule and splits it into chat messages.
    pub fn render(&self, schedule: &Schedule, group: &str) -> Vec<String> {
        split_message(&format_schedule(schedule, group), self.config.message_limit)
    }
}
