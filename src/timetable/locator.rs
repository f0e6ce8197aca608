use crate::spreadsheet::Grid;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

/// Words found in banner and title cells, never in group names.
const BANNER_WORDS: [&str; 6] = ["расписание", "занятий", "семестр", "учебный", "год", "№"];

const MAX_GROUP_NAME_LENGTH: usize = 15;

/// Where things are on a timetable sheet (1-based rows and columns).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Row holding group names; lesson rows start right below it
    pub header_row: usize,
    pub day_column: usize,
    pub time_column: usize,
    pub slot_column: usize,
    pub first_group_column: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        SheetLayout {
            header_row: 6,
            day_column: 1,
            time_column: 2,
            slot_column: 3,
            first_group_column: 4,
        }
    }
}

/// Tells group names ("ИС25", "МД-24с") apart from titles and labels in the header row.
pub fn is_valid_group_name(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_GROUP_NAME_LENGTH {
        return false;
    }
    let lower = name.to_lowercase();
    if BANNER_WORDS.iter().any(|word| lower.contains(word)) {
        return false;
    }
    name.chars().any(char::is_alphabetic) && name.chars().any(char::is_numeric)
}

/// A group belongs to a cohort when its name contains one of the cohort's track codes.
pub fn belongs_to_cohort<S: AsRef<str>>(name: &str, track_codes: &[S]) -> bool {
    let name = name.trim().to_uppercase();
    track_codes
        .iter()
        .map(|code| code.as_ref().trim().to_uppercase())
        .any(|code| !code.is_empty() && name.contains(&code))
}

/// Valid cohort groups among header texts, in column order. Empty texts and "№" are skipped.
pub fn groups_in_header<I, S>(header: I, track_codes: &[S]) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    S: AsRef<str>,
{
    header
        .into_iter()
        .filter_map(|text| {
            let name = text.as_ref().trim();
            if name.is_empty() || name == "№" {
                return None;
            }
            let valid = is_valid_group_name(name);
            let member = belongs_to_cohort(name, track_codes);
            debug!(name, valid, member, "header cell");
            (valid && member).then(|| name.to_owned())
        })
        .collect()
}

/// Groups of a cohort listed in the header row of a timetable sheet.
pub fn find_groups<S: AsRef<str>>(grid: &Grid, layout: &SheetLayout, track_codes: &[S]) -> Vec<String> {
    let header = grid
        .row_texts(layout.header_row, layout.first_group_column)
        .map(|(_, text)| text.unwrap_or_default());
    let groups = groups_in_header(header, track_codes);
    info!(sheet = %grid.name, count = groups.len(), "located groups");
    groups
}

/// Column of a group in the header row.
///
/// An exact (case-insensitive) header match wins over a header that merely
/// contains the group name, so "ИС25" never resolves to "ИС25с".
pub fn find_group_column(grid: &Grid, layout: &SheetLayout, group: &str) -> Option<usize> {
    let group = group.trim().to_uppercase();
    if group.is_empty() {
        return None;
    }
    let header: Vec<(usize, String)> = grid
        .row_texts(layout.header_row, layout.first_group_column)
        .filter_map(|(col, text)| text.map(|text| (col, text.to_uppercase())))
        .collect();
    header
        .iter()
        .find(|(_, text)| *text == group)
        .or_else(|| header.iter().find(|(_, text)| text.contains(&group)))
        .map(|(col, _)| *col)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACKS: [&str; 3] = ["ИС", "МД", "Э"];

    fn header_grid() -> Grid {
        let mut rows = vec![vec![""; 6]; 5];
        rows[0][0] = "Расписание занятий на 1 семестр";
        rows.push(vec!["День", "Время", "№", "ИС25с", "ИС25", "МД25"]);
        Grid::from_rows(rows)
    }

    /// Two banner lines push the header down to row 7.
    fn offset_header_grid() -> Grid {
        let mut rows = vec![vec![""; 6]; 6];
        rows[0][0] = "Расписание занятий на 1 семестр";
        rows[5][3] = "Утверждено";
        rows.push(vec!["День", "Время", "№", "ЭК25", "ИС25с", "ИС25"]);
        Grid::from_rows(rows)
    }

    #[test]
    fn group_name_validity() {
        assert!(is_valid_group_name("ИС25"));
        assert!(is_valid_group_name(" МД-24с "));
        assert!(!is_valid_group_name(""));
        assert!(!is_valid_group_name("№"));
        assert!(!is_valid_group_name("ИСП"));
        assert!(!is_valid_group_name("2025"));
        assert!(!is_valid_group_name("Учебный год 2025"));
        assert!(!is_valid_group_name("ИС25ИС25ИС25ИС25"));
    }

    #[test]
    fn cohort_membership_by_track_code() {
        assert!(belongs_to_cohort("ис25", &TRACKS));
        assert!(belongs_to_cohort("ЭК24", &TRACKS));
        assert!(!belongs_to_cohort("ЛС25", &TRACKS));
        assert!(!belongs_to_cohort("ЛС25", &[""]));
    }

    #[test]
    fn header_groups_of_cohort() {
        let groups = groups_in_header(["№", "", "ИС25", "МД25с"], &["ИС"]);
        assert_eq!(groups, vec!["ИС25"]);
    }

    #[test]
    fn find_groups_scans_header_row() {
        let grid = header_grid();
        let groups = find_groups(&grid, &SheetLayout::default(), &TRACKS);
        assert_eq!(groups, vec!["ИС25с", "ИС25", "МД25"]);

        let shifted = SheetLayout { header_row: 7, ..Default::default() };
        assert!(find_groups(&grid, &shifted, &TRACKS).is_empty());
    }

    #[test]
    fn find_group_column_prefers_exact_match() {
        let grid = header_grid();
        let layout = SheetLayout::default();
        assert_eq!(find_group_column(&grid, &layout, "ИС25"), Some(5));
        assert_eq!(find_group_column(&grid, &layout, "ис25с"), Some(4));
        assert_eq!(find_group_column(&grid, &layout, "МД"), Some(6));
        assert_eq!(find_group_column(&grid, &layout, "ЛС25"), None);
        assert_eq!(find_group_column(&grid, &layout, " "), None);
    }

    #[test]
    fn offset_header_row() {
        let grid = offset_header_grid();
        let layout = SheetLayout { header_row: 7, ..Default::default() };
        assert_eq!(find_groups(&grid, &layout, &TRACKS), vec!["ЭК25", "ИС25с", "ИС25"]);
        assert_eq!(find_group_column(&grid, &layout, "ИС25"), Some(6));
        assert_eq!(find_group_column(&grid, &layout, "ЭК25"), Some(4));

        assert!(find_groups(&grid, &SheetLayout::default(), &TRACKS).is_empty());
        assert_eq!(find_group_column(&grid, &SheetLayout::default(), "ИС25"), None);
    }
}
