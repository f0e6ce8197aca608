use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// Suffix of group names enrolled after 11th grade ("ИС24с").
const ELEVEN_GRADE_SUFFIX: char = 'с';

const LAST_COURSE: u32 = 4;

#[derive(Error, Debug, PartialEq)]
#[error("Unknown education base '{0}', expected 9 or 11")]
pub struct EducationBaseError(String);

/// School grade a student entered the college after.
///
/// Students admitted after 11th grade skip a year, so their groups are listed
/// in the workbook of the next course.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EducationBase {
    #[default]
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "11")]
    Eleven,
}

impl FromStr for EducationBase {
    type Err = EducationBaseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "9" => Ok(EducationBase::Nine),
            "11" => Ok(EducationBase::Eleven),
            other => Err(EducationBaseError(other.to_owned())),
        }
    }
}

impl Display for EducationBase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EducationBase::Nine => write!(f, "9"),
            EducationBase::Eleven => write!(f, "11"),
        }
    }
}

impl EducationBase {
    /// Courses a student of this base can be in.
    pub fn courses(&self) -> RangeInclusive<u32> {
        match self {
            EducationBase::Nine => 1..=LAST_COURSE,
            EducationBase::Eleven => 1..=LAST_COURSE - 1,
        }
    }

    /// Course whose workbook lists the groups of `course`.
    pub fn workbook_course(&self, course: u32) -> u32 {
        match self {
            EducationBase::Nine => course,
            EducationBase::Eleven => course.saturating_add(1).min(LAST_COURSE),
        }
    }

    /// Returns true if the group name marks a group of this base.
    pub fn admits(&self, group: &str) -> bool {
        let eleven = group.trim().to_lowercase().ends_with(ELEVEN_GRADE_SUFFIX);
        match self {
            EducationBase::Nine => !eleven,
            EducationBase::Eleven => eleven,
        }
    }

    /// Keeps the groups of this base, preserving order.
    pub fn filter_groups(&self, groups: Vec<String>) -> Vec<String> {
        groups.into_iter().filter(|group| self.admits(group)).collect()
    }
}

/// Cohort key of a course number ("2 курс").
pub fn course_key(course: u32) -> String {
    format!("{course} курс")
}

/// Course number of a cohort key or bare number ("2 курс", "2").
pub fn parse_course(text: &str) -> Option<u32> {
    text.split_whitespace().next()?.parse().ok().filter(|course| *course > 0)
}
