use crate::timetable::weekday_from_name;
use crate::timetable::Schedule;
use crate::timetable::ScheduleEntry;

const LEGEND: &str = "💻 дистанционное занятие\n📚 самостоятельная работа";

/// Renders a group's schedule as chat text.
///
/// Days follow the week from Monday to Saturday; day labels that are not
/// weekday names come last in the order they first appear. Within a day
/// entries are listed by slot number.
pub fn format_schedule(schedule: &Schedule, group: &str) -> String {
    if schedule.is_empty() {
        return format!("❌ Нет расписания для группы {group}");
    }

    let mut days: Vec<(&str, Vec<&ScheduleEntry>)> = Vec::new();
    for entry in schedule.entries.values() {
        match days.iter_mut().find(|(day, _)| *day == entry.day) {
            Some((_, entries)) => entries.push(entry),
            None => days.push((entry.day.as_str(), vec![entry])),
        }
    }
    // Stable: unknown labels keep their first-seen order
    days.sort_by_key(|(day, _)| {
        weekday_from_name(day)
            .map(|weekday| weekday.num_days_from_monday())
            .unwrap_or(u32::MAX)
    });

    let mut text = format!("📅 Расписание для группы {group}:\n");
    for (day, entries) in days {
        text.push_str(&format!("\n🗓 {day}\n"));
        for entry in entries {
            write_entry(&mut text, entry);
        }
    }

    let stats = &schedule.stats;
    text.push_str(&format!(
        "\n📊 Статистика:\nВсего пар: {}\nОчных: {}\nДистанционных: {}\nСамостоятельных: {}\n\n{LEGEND}",
        stats.total, stats.normal, stats.distant, stats.self_study
    ));
    text
}

fn write_entry(text: &mut String, entry: &ScheduleEntry) {
    if entry.vacant {
        text.push_str(&format!("{}. {} — ❌ {}\n", entry.slot, entry.time, entry.subject));
        return;
    }
    text.push_str(&format!("{}. {} — {}\n", entry.slot, entry.time, entry.subject));

    let mut details = Vec::new();
    if !entry.teacher.is_empty() {
        details.push(format!("👨‍🏫 {}", entry.teacher));
    }
    if !entry.room.is_empty() {
        details.push(format!("🚪 {}", entry.room));
    }
    if !entry.subgroup.is_empty() {
        details.push(format!("👥 {}", entry.subgroup));
    }
    if !details.is_empty() {
        text.push_str(&format!("    {}\n", details.join(" | ")));
    }
}

/// Splits text into chunks of at most `limit` characters.
///
/// Chunks break after a newline whenever possible; a single line longer than
/// `limit` is cut at character boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if chunk_len + line_len > limit && !chunk.is_empty() {
            chunks.push(std::mem::take(&mut chunk));
            chunk_len = 0;
        }
        if line_len <= limit {
            chunk.push_str(line);
            chunk_len += line_len;
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        for piece in chars.chunks(limit) {
            if piece.len() == limit {
                chunks.push(piece.iter().collect());
            } else {
                chunk = piece.iter().collect();
                chunk_len = piece.len();
            }
        }
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}
