use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use now::DateTimeNow;

use crate::{
    app::{notes::Note, state::AppState},
    utils::time::next_day_start,
};

use super::{output::render_notes, Args};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ListCommand {
    #[arg(long, help = "Show every note instead of the latest 3")]
    all: bool,
    #[arg(short, long, help = "Only notes of this category")]
    category: Option<String>,
    #[arg(
        long,
        short,
        help = "Only notes created after this moment. Examples are \"yesterday\", \"1 hour ago\", \"15/03/2025\", \"12:00 16/03/2025\""
    )]
    since: Option<String>,
    #[arg(long, help = "Only notes created today", conflicts_with = "since")]
    today: bool,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Creation time range notes have to fall into. Open ends are `None`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct NoteFilter {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl NoteFilter {
    fn matches(&self, note: &Note) -> bool {
        self.start.map_or(true, |start| note.ts >= start)
            && self.end.map_or(true, |end| note.ts < end)
    }
}

fn parse_filter(command: &ListCommand, now: DateTime<Local>) -> Result<NoteFilter> {
    if command.today {
        let start = now.beginning_of_day();
        return Ok(NoteFilter {
            start: Some(start.with_timezone(&Utc)),
            end: next_day_start(now).map(|v| v.with_timezone(&Utc)),
        });
    }
    let start = match command
        .since
        .as_ref()
        .map(|s| parse_date_string(s, now, command.date_style.into()))
    {
        Some(Ok(v)) => Some(v.with_timezone(&Utc)),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate since date {e}"),
                )
                .into());
        }
        None => None,
    };
    Ok(NoteFilter { start, end: None })
}

/// Command to process `list` command. Without filters it shows the same notes a session does.
pub fn process_list_command(command: ListCommand, state: &AppState, use_color: bool) -> Result<()> {
    let filter = parse_filter(&command, Local::now())?;
    let filtered = filter != NoteFilter::default() || command.category.is_some();

    let source = if command.all || filtered {
        state.notes.notes()
    } else {
        state.notes.visible(false)
    };
    let notes = source
        .iter()
        .filter(|v| filter.matches(v))
        .filter(|v| command.category.as_ref().map_or(true, |c| &v.category == c));

    print!("{}", render_notes(notes, &state.categories, use_color));
    if !command.all && !filtered && state.notes.has_hidden() {
        println!(
            "{} more, use --all to see them",
            state.notes.len() - source.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, TimeZone, Utc};
    use clap::Parser;

    use crate::app::notes::NoteStore;

    use super::{parse_filter, ListCommand};

    #[test]
    fn today_filter_covers_the_whole_day() {
        let now = Local.with_ymd_and_hms(2025, 3, 16, 15, 0, 0).unwrap();
        let command = ListCommand::parse_from(["list", "--today"]);
        let filter = parse_filter(&command, now).unwrap();

        let mut notes = NoteStore::default();
        notes.add("yesterday", "note", (now - Duration::days(1)).with_timezone(&Utc));
        notes.add("morning", "note", (now - Duration::hours(6)).with_timezone(&Utc));

        let matching = notes
            .notes()
            .iter()
            .filter(|v| filter.matches(v))
            .map(|v| v.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(matching, vec!["morning"]);
    }

    #[test]
    fn since_accepts_natural_dates() {
        let now = Local.with_ymd_and_hms(2025, 3, 16, 15, 0, 0).unwrap();
        let command = ListCommand::parse_from(["list", "--since", "1 hour ago"]);
        let filter = parse_filter(&command, now).unwrap();
        let start = filter.start.unwrap();
        assert!(start < now.with_timezone(&Utc));
        assert!(start >= (now - Duration::hours(1)).with_timezone(&Utc) - Duration::minutes(1));
        assert_eq!(filter.end, None);

        let command = ListCommand::parse_from(["list", "--since", "not a date at all"]);
        assert!(parse_filter(&command, now).is_err());
    }
}
