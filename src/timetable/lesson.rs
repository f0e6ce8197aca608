use crate::timetable::NO_CLASS;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashSet;
use tracing::debug;

/// Teacher shown for extracurricular sessions.
pub const EXTRACURRICULAR: &str = "Внеурочное";

/// Free-text content of a lesson cell split into its parts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Lesson {
    /// Never empty: "?" when nothing is left after extraction
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub subgroup: String,
}

impl Lesson {
    fn no_class() -> Self {
        Lesson { subject: NO_CLASS.to_owned(), ..Default::default() }
    }
}

/// Words the parser recognises in lesson cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonVocabulary {
    /// Surnames accepted as teachers; anything else stays in the subject
    pub teachers: Vec<String>,
    /// Lower-case phrase → display subject of an extracurricular session
    pub special_lessons: BTreeMap<String, String>,
    /// Named rooms without a number, matched as whole words
    pub special_rooms: Vec<String>,
    /// Several-word room names → display name; matched before single words
    pub room_phrases: BTreeMap<String, String>,
}

impl Default for LessonVocabulary {
    fn default() -> Self {
        let teachers = [
            "Шпейт", "Таран", "Морозова", "Соколова", "Олешкевич", "Догадин", "Денисов",
            "Зыкова", "Лобанов", "Коротков", "Бухатиева", "Коврижных", "Гоголева", "Губич",
        ];
        let special_rooms = ["зал", "библиотека", "чит", "актовый", "спортзал", "стадион"];
        LessonVocabulary {
            teachers: teachers.iter().map(|name| name.to_string()).collect(),
            special_lessons: BTreeMap::from([(
                "разговор о важном".to_owned(),
                "💬 Занятие \"Разговор о важном\"".to_owned(),
            )]),
            special_rooms: special_rooms.iter().map(|room| room.to_string()).collect(),
            room_phrases: BTreeMap::from([
                ("актовый зал".to_owned(), "Актовый зал".to_owned()),
                ("читальный зал".to_owned(), "Читальный зал".to_owned()),
                ("чит. зал".to_owned(), "Читальный зал".to_owned()),
            ]),
        }
    }
}

/// Splits lesson cell text into subject, teacher, room and subgroup.
///
/// Extraction runs in a fixed order and every step removes what it matched:
/// subgroup, numbered room, named rooms, teachers. Whatever remains is the subject.
#[derive(Clone, Debug)]
pub struct LessonParser {
    pair_subgroup: Regex,
    single_subgroup: Regex,
    room: Regex,
    /// Word keys of a named room → display name, longest first
    special_rooms: Vec<(Vec<String>, String)>,
    special_lessons: Vec<(String, String)>,
    teachers: HashSet<String>,
}

impl Default for LessonParser {
    fn default() -> Self {
        LessonParser::new(&LessonVocabulary::default())
    }
}

impl LessonParser {
    pub fn new(vocabulary: &LessonVocabulary) -> Self {
        let phrases = vocabulary.room_phrases.iter().map(|(phrase, name)| (room_keys(phrase), name.clone()));
        let words = vocabulary.special_rooms.iter().map(|room| (room_keys(room), capitalize(room.trim())));
        let mut special_rooms: Vec<(Vec<String>, String)> =
            phrases.chain(words).filter(|(keys, _)| !keys.is_empty()).collect();
        // "читальный зал" must win over "зал"
        special_rooms.sort_by_key(|(keys, _)| std::cmp::Reverse(keys.len()));

        LessonParser {
            pair_subgroup: Regex::new(r"(?i)(\d)\s?и\s?(\d)\s?п?од?гр?\p{L}*\.?").expect("Hardcode regex pattern"),
            single_subgroup: Regex::new(r"(?i)(\d)\s?п?од?гр?\p{L}*\.?").expect("Hardcode regex pattern"),
            room: Regex::new(r"\b(\d{2,4}[A-ZА-Я]?)\b").expect("Hardcode regex pattern"),
            special_rooms,
            special_lessons: vocabulary
                .special_lessons
                .iter()
                .map(|(phrase, subject)| (phrase.to_lowercase(), subject.clone()))
                .filter(|(phrase, _)| !phrase.is_empty())
                .collect(),
            teachers: vocabulary.teachers.iter().map(|name| name.trim().to_owned()).collect(),
        }
    }

    /// Parses one lesson cell. Never fails; blank text yields the "no class" lesson.
    pub fn parse(&self, text: &str) -> Lesson {
        let text = text.trim();
        if text.is_empty() {
            return Lesson::no_class();
        }

        let lower = text.to_lowercase();
        if let Some((_, subject)) = self.special_lessons.iter().find(|(phrase, _)| lower.contains(phrase.as_str())) {
            return Lesson {
                subject: subject.clone(),
                teacher: EXTRACURRICULAR.to_owned(),
                room: "?".to_owned(),
                subgroup: String::new(),
            };
        }

        let mut text = collapse_whitespace(text);
        let subgroup = self.take_subgroup(&mut text);
        let room = self.take_rooms(&mut text);
        let teacher = self.take_teachers(&mut text);

        let subject = collapse_whitespace(&text);
        let subject = subject.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | '–' | '—' | '(' | ')'));
        let lesson = Lesson {
            subject: if subject.is_empty() { "?".to_owned() } else { subject.to_owned() },
            teacher,
            room,
            subgroup,
        };
        debug!(?lesson, "parsed lesson text");
        lesson
    }

    fn take_subgroup(&self, text: &mut String) -> String {
        if let Some(captures) = self.pair_subgroup.captures(text) {
            let subgroup = format!("{} и {} подгр", &captures[1], &captures[2]);
            *text = self.pair_subgroup.replace_all(text, " ").into_owned();
            return subgroup;
        }
        if let Some(captures) = self.single_subgroup.captures(text) {
            let subgroup = format!("{} подгр", &captures[1]);
            *text = self.single_subgroup.replace_all(text, " ").into_owned();
            return subgroup;
        }
        String::new()
    }

    fn take_rooms(&self, text: &mut String) -> String {
        let mut rooms = Vec::new();
        // The last number is the room; earlier ones belong to the subject ("Математика 101 205")
        if let Some((range, room)) = self.room.find_iter(text).last().map(|found| (found.range(), found.as_str().to_owned())) {
            rooms.push(room);
            text.replace_range(range, " ");
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        let keys: Vec<String> = words.iter().map(|word| room_key(word)).collect();
        let mut rest = Vec::new();
        let mut index = 0;
        while index < words.len() {
            let found = self
                .special_rooms
                .iter()
                .find(|(room, _)| keys[index..].starts_with(room));
            match found {
                Some((room, name)) => {
                    if !rooms.contains(name) {
                        rooms.push(name.clone());
                    }
                    index += room.len();
                }
                None => {
                    rest.push(words[index]);
                    index += 1;
                }
            }
        }
        *text = rest.join(" ");
        rooms.join(", ")
    }

    fn take_teachers(&self, text: &mut String) -> String {
        let mut teachers = Vec::new();
        let mut rest = Vec::new();
        for word in text.split_whitespace() {
            let name: String = word.chars().filter(|c| c.is_alphabetic()).collect();
            if self.teachers.contains(&name) {
                teachers.push(name);
            } else {
                rest.push(word);
            }
        }
        *text = rest.join(" ");
        teachers.join(", ")
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case word without surrounding punctuation: "Чит." → "чит".
fn room_key(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

fn room_keys(phrase: &str) -> Vec<String> {
    phrase.split_whitespace().map(room_key).filter(|key| !key.is_empty()).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser_with_teachers(teachers: &[&str]) -> LessonParser {
        let mut vocabulary = LessonVocabulary::default();
        vocabulary.teachers.extend(teachers.iter().map(|name| name.to_string()));
        LessonParser::new(&vocabulary)
    }

    fn lesson(subject: &str, teacher: &str, room: &str, subgroup: &str) -> Lesson {
        Lesson {
            subject: subject.to_owned(),
            teacher: teacher.to_owned(),
            room: room.to_owned(),
            subgroup: subgroup.to_owned(),
        }
    }

    #[test]
    fn parse_full_cell() {
        let parser = parser_with_teachers(&["Иванов"]);
        assert_eq!(parser.parse("1подгр Иванов 205 Физика"), lesson("Физика", "Иванов", "205", "1 подгр"));
    }

    #[test]
    fn parse_blank_cell() {
        let parser = LessonParser::default();
        assert_eq!(parser.parse(""), lesson(NO_CLASS, "", "", ""));
        assert_eq!(parser.parse("  \n "), lesson(NO_CLASS, "", "", ""));
    }

    #[test]
    fn parse_room_only() {
        assert_eq!(LessonParser::default().parse("205"), lesson("?", "", "205", ""));
    }

    #[test]
    fn parse_keeps_earlier_numbers_in_subject() {
        assert_eq!(LessonParser::default().parse("Математика 101 205"), lesson("Математика 101", "", "205", ""));
    }

    #[test]
    fn parse_special_lesson() {
        let parsed = LessonParser::default().parse("РАЗГОВОР О ВАЖНОМ 101");
        assert_eq!(parsed, lesson("💬 Занятие \"Разговор о важном\"", EXTRACURRICULAR, "?", ""));
    }

    #[test]
    fn parse_pair_subgroup() {
        let parsed = LessonParser::default().parse("Информатика 1и2подгр Шпейт 310А");
        assert_eq!(parsed, lesson("Информатика", "Шпейт", "310А", "1 и 2 подгр"));

        let parsed = LessonParser::default().parse("Английский язык 2 подгруппа Таран, 214");
        assert_eq!(parsed, lesson("Английский язык", "Таран", "214", "2 подгр"));
    }

    #[test]
    fn parse_special_rooms() {
        let parsed = LessonParser::default().parse("Физкультура Денисов спортзал");
        assert_eq!(parsed, lesson("Физкультура", "Денисов", "Спортзал", ""));

        let parsed = LessonParser::default().parse("Литература АКТОВЫЙ зал 205");
        assert_eq!(parsed, lesson("Литература", "", "205, Актовый зал", ""));

        let parsed = LessonParser::default().parse("Литература (зал) Таран");
        assert_eq!(parsed, lesson("Литература", "Таран", "Зал", ""));
    }

    #[test]
    fn parse_reading_room_as_one_room() {
        let parsed = LessonParser::default().parse("Самоподготовка читальный зал");
        assert_eq!(parsed, lesson("Самоподготовка", "", "Читальный зал", ""));

        let parsed = LessonParser::default().parse("Самоподготовка Чит. зал 205");
        assert_eq!(parsed, lesson("Самоподготовка", "", "205, Читальный зал", ""));
    }

    #[test]
    fn parse_room_words_inside_other_words_stay() {
        let parsed = LessonParser::default().parse("Вычислительная математика Вычитание 205");
        assert_eq!(parsed, lesson("Вычислительная математика Вычитание", "", "205", ""));

        let parsed = LessonParser::default().parse("Залоговое право Стадионная 12");
        assert_eq!(parsed, lesson("Залоговое право Стадионная", "", "12", ""));
    }

    #[test]
    fn parse_subgroup_stops_at_period() {
        let parsed = LessonParser::default().parse("Информатика 1подгр.Шпейт 310");
        assert_eq!(parsed, lesson("Информатика", "Шпейт", "310", "1 подгр"));

        let parsed = LessonParser::default().parse("Информатика 1и2 подгр.Таран 310");
        assert_eq!(parsed, lesson("Информатика", "Таран", "310", "1 и 2 подгр"));
    }

    #[test]
    fn parse_unknown_surname_stays_in_subject() {
        let parsed = LessonParser::default().parse("Химия Петров 112");
        assert_eq!(parsed, lesson("Химия Петров", "", "112", ""));
    }

    #[test]
    fn parse_several_teachers() {
        let parsed = LessonParser::default().parse("Проектная деятельность (Зыкова, Лобанов) 401");
        assert_eq!(parsed, lesson("Проектная деятельность", "Зыкова, Лобанов", "401", ""));
    }

    #[test]
    fn parse_trims_separators() {
        assert_eq!(LessonParser::default().parse("— История, -").subject, "История");
        assert_eq!(LessonParser::default().parse("Гоголева").subject, "?");
    }

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("чит"), "Чит");
        assert_eq!(capitalize("АКТОВЫЙ"), "Актовый");
        assert_eq!(capitalize(""), "");
    }
}
