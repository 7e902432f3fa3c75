//! Plain text rendering of the application state. Colors are only used when `color` is set, so
//! the same functions serve terminals, pipes and tests.

pub mod graph;

use std::fmt::Write;

use ansi_term::{Colour, Style};
use chrono::{DateTime, Local, Utc};

use crate::app::{
    categories::{Category, CategoryRegistry},
    notes::Note,
    state::AppState,
};

/// Parses `#rgb` or `#rrggbb` into a terminal color.
pub fn parse_hex_color(value: &str) -> Option<Colour> {
    let hex = value.strip_prefix('#').filter(|v| v.is_ascii())?;
    let channel = |v: &str| u8::from_str_radix(v, 16).ok();
    match hex.len() {
        6 => Some(Colour::RGB(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let mut channels = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Colour::RGB(
                channels.next()??,
                channels.next()??,
                channels.next()??,
            ))
        }
        _ => None,
    }
}

/// Category label as a colored pill. Light category colors are used as background.
pub fn pill(label: &str, color: &str, use_color: bool) -> String {
    match parse_hex_color(color).filter(|_| use_color) {
        Some(background) => Style::new()
            .on(background)
            .fg(Colour::Black)
            .paint(format!(" {label} "))
            .to_string(),
        None => format!("[{label}]"),
    }
}

fn category_button(category: &Category, selected: bool, use_color: bool) -> String {
    let label = match category.hotkey {
        Some(hotkey) => format!("{} ({hotkey})", category.display_label()),
        None => category.display_label().to_string(),
    };
    let marker = if selected { "*" } else { "" };
    format!("{marker}{}", pill(&label, &category.color, use_color))
}

/// Category buttons grouped into "Timer" and "Other". Empty groups are left out.
pub fn render_categories(categories: &CategoryRegistry, current: &str, use_color: bool) -> String {
    let mut output = String::new();
    let groups = [
        ("Timer", categories.timers().collect::<Vec<_>>()),
        ("Other", categories.others().collect::<Vec<_>>()),
    ];
    for (name, members) in groups {
        if members.is_empty() {
            continue;
        }
        let buttons = members
            .into_iter()
            .map(|v| category_button(v, v.key == current, use_color))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(output, "{name}: {buttons}");
    }
    output
}

pub fn render_note(note: &Note, categories: &CategoryRegistry, use_color: bool) -> String {
    let category = categories.lookup(&note.category);
    let label = category
        .map(|v| v.display_label())
        .unwrap_or(note.category.as_str());
    let color = category.map(|v| v.color.as_str()).unwrap_or_default();
    let meta = note.ts.with_timezone(&Local).format("%x %H:%M:%S");
    format!(
        "{} {}\n    {meta}  {}",
        pill(label, color, use_color),
        note.text.replace('\n', "\n    "),
        note.id
    )
}

pub fn render_notes<'a>(
    notes: impl IntoIterator<Item = &'a Note>,
    categories: &CategoryRegistry,
    use_color: bool,
) -> String {
    let mut output = String::new();
    for note in notes {
        let _ = writeln!(output, "{}", render_note(note, categories, use_color));
    }
    output
}

/// Timer line: `HH:MM:SS`, state and the category time is attributed to.
pub fn render_timer(state: &AppState, now: DateTime<Utc>) -> String {
    let running = if state.timer.is_running() {
        "running"
    } else {
        "paused"
    };
    match state.timer.active_category() {
        Some(active) => format!("{} {running} ({active})", state.timer.display(now)),
        None => format!("{} {running}", state.timer.display(now)),
    }
}

/// The whole screen of an interactive session.
pub fn render_screen(state: &AppState, now: DateTime<Utc>, use_color: bool) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", render_timer(state, now));
    output += &graph::render_graph(&state.categories, state.timer.totals(), use_color);
    output += &render_categories(&state.categories, &state.current_category, use_color);
    output.push('\n');
    output += &render_notes(state.notes.visible(state.show_all), &state.categories, use_color);
    if state.notes.has_hidden() {
        let toggle = if state.show_all {
            "View less (/more)"
        } else {
            "View more (/more)"
        };
        let _ = writeln!(output, "{toggle}");
    }
    if !state.draft.is_empty() {
        let style = if state.expanded { "expanded" } else { "draft" };
        let _ = writeln!(output, "{style}> {}", state.draft);
    }
    if let Some(status) = state.visible_status(now) {
        let _ = writeln!(output, "{status}");
    }
    output
}

#[cfg(test)]
mod tests {
    use ansi_term::Colour;
    use chrono::{TimeZone, Utc};

    use crate::app::{
        categories::CategoryRegistry, commands::Action, notes::NoteStore, state::AppState,
        timer::TimerEngine,
    };

    use super::{parse_hex_color, render_categories, render_screen, render_timer};

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#fecaca"), Some(Colour::RGB(0xfe, 0xca, 0xca)));
        assert_eq!(parse_hex_color("#fff"), Some(Colour::RGB(255, 255, 255)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn categories_are_grouped() {
        let output = render_categories(&CategoryRegistry::default(), "bug", false);
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Timer: [Test (1)]"));
        assert!(lines[0].contains("*[Bug (3)]"));
        assert!(lines[1].contains("[Future]"));

        let empty = CategoryRegistry::new(vec![]);
        assert!(render_categories(&empty, "x", false).is_empty());
    }

    #[test]
    fn screen_shows_timer_notes_and_status() {
        let now = Utc.with_ymd_and_hms(2018, 7, 4, 0, 0, 0).unwrap();
        let mut state = AppState::new(
            CategoryRegistry::default(),
            NoteStore::default(),
            TimerEngine::default(),
            Some("bug".into()),
            None,
        );
        state.dispatch(Action::AddNote { text: "fix login bug".into() }, now);

        assert_eq!(render_timer(&state, now), "00:00:00 running (bug)");
        let screen = render_screen(&state, now, false);
        assert!(screen.contains("[Bug] fix login bug"));
        assert!(screen.contains("Saved"));
        assert!(!screen.contains("View more"));
    }
}
