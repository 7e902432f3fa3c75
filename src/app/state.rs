use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use super::{categories::CategoryRegistry, notes::NoteStore, timer::TimerEngine};

/// How long a status message stays visible.
pub const STATUS_LIFETIME: Duration = Duration::milliseconds(1500);

const FALLBACK_CATEGORY: &str = "note";

/// Parts of the state that are stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Notes,
    Draft,
    SelectedCategory,
    Config,
    /// Per-category totals together with the active category key.
    Totals,
    TimerSnapshot,
}

/// Sections changed by an action. The caller decides when to write them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dirty(BTreeSet<Section>);

impl Dirty {
    pub fn mark(&mut self, section: Section) {
        self.0.insert(section);
    }

    pub fn contains(&self, section: Section) -> bool {
        self.0.contains(&section)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Section> + '_ {
        self.0.iter().copied()
    }

    pub fn merge(&mut self, other: Dirty) {
        self.0.extend(other.0);
    }
}

/// Transient message. Clears itself after [STATUS_LIFETIME].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: &'static str,
    pub posted_at: DateTime<Utc>,
}

impl Status {
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now - self.posted_at < STATUS_LIFETIME
    }
}

/// Everything the application knows. Owned by one controller and mutated only through
/// [AppState::dispatch](super::commands).
#[derive(Debug, Clone)]
pub struct AppState {
    pub categories: CategoryRegistry,
    pub notes: NoteStore,
    pub timer: TimerEngine,
    pub current_category: String,
    pub draft: String,
    pub expanded: bool,
    pub show_all: bool,
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(
        categories: CategoryRegistry,
        notes: NoteStore,
        timer: TimerEngine,
        selected_category: Option<String>,
        draft: Option<String>,
    ) -> Self {
        let current_category = selected_category
            .filter(|v| !v.is_empty())
            .or_else(|| categories.first_key().map(str::to_string))
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
        Self {
            categories,
            notes,
            timer,
            current_category,
            draft: draft.unwrap_or_default(),
            expanded: false,
            show_all: false,
            status: None,
        }
    }

    pub fn announce(&mut self, message: &'static str, now: DateTime<Utc>) {
        self.status = Some(Status {
            message,
            posted_at: now,
        });
    }

    /// Message to show at `now`, if any.
    pub fn visible_status(&self, now: DateTime<Utc>) -> Option<&'static str> {
        self.status
            .as_ref()
            .filter(|v| v.is_visible(now))
            .map(|v| v.message)
    }
}
