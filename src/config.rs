use crate::timetable::classifier::FillPalette;
use crate::timetable::cohort::course_key;
use crate::timetable::lesson::LessonVocabulary;
use crate::timetable::locator::SheetLayout;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "TIMETABLE_CONFIG";

const TRACK_CODES: [&str; 9] = ["ИС", "МД", "Э", "ЛС", "СТ", "МЭ", "ТД", "МС", "БП"];

/// One course's timetable workbook and the track codes of its groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub track_codes: Vec<String>,
    /// Local path or http(s) URL of the workbook
    pub source: String,
    #[serde(default)]
    pub layout: SheetLayout,
}

/// Engine configuration. Every field falls back to the college's defaults when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cohort key ("1 курс") → workbook
    pub cohorts: BTreeMap<String, Cohort>,
    /// Slot number → time range, used when the sheet leaves the time cell empty
    pub lesson_times: BTreeMap<u32, String>,
    pub lessons: LessonVocabulary,
    pub palette: FillPalette,
    pub download_timeout_secs: u64,
    /// Maximum characters per chat message
    pub message_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        let cohorts = (1..=4)
            .map(|course| {
                let cohort = Cohort {
                    track_codes: TRACK_CODES.iter().map(|code| code.to_string()).collect(),
                    source: format!("data/schedule_{course}course.xlsx"),
                    layout: SheetLayout::default(),
                };
                (course_key(course), cohort)
            })
            .collect();
        let lesson_times = [
            (1, "8:00-9:30"),
            (2, "9:40-11:10"),
            (3, "11:20-12:50"),
            (4, "13:30-15:00"),
            (5, "15:10-16:40"),
            (6, "16:50-18:20"),
        ]
        .into_iter()
        .map(|(slot, time)| (slot, time.to_owned()))
        .collect();

        Config {
            cohorts,
            lesson_times,
            lessons: LessonVocabulary::default(),
            palette: FillPalette::default(),
            download_timeout_secs: 30,
            message_limit: 4096,
        }
    }
}

impl Config {
    /// Reads a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the file named by `TIMETABLE_CONFIG`, or returns the defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        let path = env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load(path.as_deref())
    }

    /// Reads `path` when given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Config::default()),
        }
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.message_limit == 0 {
            bail!("message_limit must be positive");
        }
        if self.download_timeout_secs == 0 {
            bail!("download_timeout_secs must be positive");
        }
        for (key, cohort) in &self.cohorts {
            if cohort.source.trim().is_empty() {
                bail!("Cohort '{key}' has no workbook source");
            }
            if cohort.layout.header_row == 0 || cohort.layout.first_group_column == 0 {
                bail!("Cohort '{key}' layout rows and columns are 1-based");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::classifier::ColorMatch;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.cohorts.len(), 4);
        assert_eq!(config.cohorts["2 курс"].source, "data/schedule_2course.xlsx");
        assert_eq!(config.cohorts["4 курс"].track_codes.len(), 9);
        assert_eq!(config.lesson_times[&4], "13:30-15:00");
        assert_eq!(config.download_timeout(), Duration::from_secs(30));
        assert_eq!(config.message_limit, 4096);
        assert!(config.lessons.teachers.contains(&"Губич".to_owned()));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = config_file(
            r#"{
                "cohorts": {
                    "1 курс": {"track_codes": ["ИС"], "source": "https://example.com/1.xlsx", "layout": {"header_row": 7}}
                },
                "palette": {"self_study": [{"indexed": 44}]},
                "message_limit": 1000
            }"#,
        );
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.cohorts.len(), 1);
        let cohort = &config.cohorts["1 курс"];
        assert_eq!(cohort.layout.header_row, 7);
        assert_eq!(cohort.layout.first_group_column, 4);
        assert_eq!(config.palette.self_study, vec![ColorMatch::Indexed(44)]);
        assert_eq!(config.palette.distant, FillPalette::default().distant);
        assert_eq!(config.message_limit, 1000);
        assert_eq!(config.lesson_times.len(), 6);
    }

    #[test]
    fn lesson_times_from_file() {
        let file = config_file(r#"{"lesson_times": {"1": "9:00-10:30"}}"#);
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.lesson_times, BTreeMap::from([(1, "9:00-10:30".to_owned())]));
    }

    #[test]
    fn invalid_files_are_errors() {
        assert!(Config::from_file(Path::new("does/not/exist.json")).is_err());
        assert!(Config::from_file(config_file("{not json").path()).is_err());
        assert!(Config::from_file(config_file(r#"{"message_limit": 0}"#).path()).is_err());
        let error = Config::from_file(config_file(r#"{"cohorts": {"1 курс": {"track_codes": [], "source": " "}}}"#).path())
            .unwrap_err();
        assert!(error.to_string().contains("1 курс"));
    }

    #[test]
    fn load_without_path_uses_defaults() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
