//! MarkdownV2 rendering of backend responses

use gymtrack_shared::types::{ExerciseHistoryResponse, RoutineResponse, TodayRoutineResponse};
use gymtrack_shared::weekday_name_es;
use teloxide::utils::markdown::{bold, escape};

/// Longest message Telegram accepts, in UTF-16 code units
pub const MAX_MESSAGE_LEN: usize = 4096;

fn fmt_kg(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

/// "4x8 @ 100 kg", or "4x8" without a weight
fn sets_line(sets: i32, reps: i32, weight_kg: Option<f64>) -> String {
    match weight_kg {
        Some(weight) => format!("{}x{} @ {} kg", sets, reps, fmt_kg(weight)),
        None => format!("{}x{}", sets, reps),
    }
}

pub fn logs(history: &ExerciseHistoryResponse) -> String {
    if history.items.is_empty() {
        return escape("Todavía no registraste ejercicios. ¡Empieza hoy!");
    }

    let mut out = bold("🏋️ Últimos ejercicios");
    out.push('\n');
    for log in &history.items {
        out.push_str(&format!(
            "\n• {} {}: {}",
            escape(&log.performed_on.format("%d/%m").to_string()),
            bold(&escape(&log.exercise_name)),
            escape(&sets_line(log.sets, log.reps, log.weight_kg)),
        ));
    }
    out
}

pub fn routine(routine: &RoutineResponse) -> String {
    if routine.entries.is_empty() {
        return escape("Todavía no tienes una rutina semanal. Créala desde la web.");
    }

    let mut out = bold("📅 Tu rutina semanal");
    let mut current_day = None;
    for entry in &routine.entries {
        if current_day != Some(entry.day_of_week) {
            current_day = Some(entry.day_of_week);
            out.push_str(&format!("\n\n{}", bold(&escape(weekday_name_es(entry.day_of_week)))));
        }
        out.push_str(&format!(
            "\n• {} {}",
            escape(&entry.exercise_name),
            escape(&sets_line(entry.sets, entry.reps, entry.target_weight_kg)),
        ));
    }
    out
}

pub fn today(today: &TodayRoutineResponse) -> String {
    if today.entries.is_empty() {
        return escape(&format!("Hoy ({}) es día de descanso. 😴", today.day_name));
    }

    let mut out = bold(&escape(&format!(
        "Hoy toca ({}) · {}/{} hechos",
        today.day_name, today.completed, today.total
    )));
    out.push('\n');
    for item in &today.entries {
        let mark = if item.done { "✅" } else { "⬜" };
        out.push_str(&format!(
            "\n{} {} {}",
            mark,
            escape(&item.entry.exercise_name),
            escape(&sets_line(item.entry.sets, item.entry.reps, item.entry.target_weight_kg)),
        ));
    }
    out
}

/// Chat replies start with `*Header*`; the header becomes bold, the rest is escaped
pub fn chat_reply(reply: &str) -> String {
    if let Some(rest) = reply.strip_prefix('*') {
        if let Some((header, body)) = rest.split_once("*\n\n") {
            return format!("{}\n\n{}", bold(&escape(header)), escape(body));
        }
    }
    escape(reply)
}

/// Plain message with every special character escaped
pub fn plain(text: &str) -> String {
    escape(text)
}

fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Cut one line into pieces, never separating a `\` from the character it escapes
fn split_line(line: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut len = 0;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        let mut token = String::from(c);
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                token.push(escaped);
            }
        }
        let width = utf16_len(&token);
        if len + width > MAX_MESSAGE_LEN && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            len = 0;
        }
        piece.push_str(&token);
        len += width;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

fn flush(current: &mut String, current_len: &mut usize, chunks: &mut Vec<String>) {
    if !current.trim().is_empty() {
        chunks.push(std::mem::take(current));
    }
    current.clear();
    *current_len = 0;
}

/// Split a MarkdownV2 message into pieces Telegram accepts, breaking at newlines first
pub fn split_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = utf16_len(line);
        let separator = usize::from(!current.is_empty());
        if current_len + separator + line_len <= MAX_MESSAGE_LEN {
            if separator == 1 {
                current.push('\n');
            }
            current.push_str(line);
            current_len += separator + line_len;
            continue;
        }

        flush(&mut current, &mut current_len, &mut chunks);
        let mut pieces = split_line(line);
        let last = pieces.pop().unwrap_or_default();
        chunks.extend(pieces);
        current_len = utf16_len(&last);
        current = last;
    }
    flush(&mut current, &mut current_len, &mut chunks);

    if chunks.is_empty() {
        chunks.push(text.to_string());
    }
    chunks
}
