//! User intents and the single handler that applies them to [AppState].

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{
    notes::parse_import,
    state::{AppState, Dirty, Section},
    timer::TimerTransition,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The input field changed.
    SaveDraft(String),
    /// Turns the draft into a note under the current category and clears the draft.
    SubmitDraft,
    AddNote { text: String },
    UpdateNote { id: String, text: String },
    DeleteNote { id: String },
    UndoDelete,
    SelectCategory(String),
    Hotkey(u8),
    Pause,
    Resume,
    ToggleTimer,
    ToggleExpanded,
    ToggleShowAll,
    /// Raw `{ "categories": [...] }` text.
    ApplyConfig(String),
    ResetConfig,
    /// Raw contents of an import file.
    Import(String),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub dirty: Dirty,
    pub status: Option<&'static str>,
    /// Why the input was refused, when it was.
    pub rejected: Option<String>,
}

impl Outcome {
    fn mark(mut self, section: Section) -> Self {
        self.dirty.mark(section);
        self
    }

    fn status(mut self, status: &'static str) -> Self {
        self.status = Some(status);
        self
    }

    fn rejected(mut self, reason: String) -> Self {
        self.rejected = Some(reason);
        self
    }
}

impl AppState {
    pub fn dispatch(&mut self, action: Action, now: DateTime<Utc>) -> Outcome {
        debug!("Dispatching {action:?}");
        let outcome = match action {
            Action::SaveDraft(text) => {
                self.draft = text;
                Outcome::default().mark(Section::Draft)
            }
            Action::SubmitDraft => {
                let text = std::mem::take(&mut self.draft);
                let mut outcome = self.add_note(&text, now);
                outcome.dirty.mark(Section::Draft);
                outcome
            }
            Action::AddNote { text } => self.add_note(&text, now),
            Action::UpdateNote { id, text } => {
                if text.trim().is_empty() {
                    debug!("Ignoring blank edit of {id}");
                    Outcome::default()
                } else if self.notes.update(&id, &text) {
                    Outcome::default().mark(Section::Notes)
                } else {
                    debug!("No note {id} to update");
                    Outcome::default()
                }
            }
            Action::DeleteNote { id } => match self.notes.delete(&id) {
                Some(_) => Outcome::default().mark(Section::Notes).status("Deleted"),
                None => Outcome::default(),
            },
            Action::UndoDelete => match self.notes.undo_delete() {
                Some(_) => Outcome::default().mark(Section::Notes).status("Restored"),
                None => Outcome::default(),
            },
            Action::SelectCategory(key) => self.select_category(key),
            Action::Hotkey(digit) => match self.categories.hotkey_match(digit) {
                Some(category) => {
                    let key = category.key.clone();
                    self.select_category(key)
                }
                None => Outcome::default(),
            },
            Action::Pause => timer_outcome(self.timer.pause(now)),
            Action::Resume => timer_outcome(self.timer.start(now)),
            Action::ToggleTimer => timer_outcome(self.timer.toggle(now)),
            Action::ToggleExpanded => {
                self.expanded = !self.expanded;
                Outcome::default().status(if self.expanded {
                    "Expanded"
                } else {
                    "Collapsed"
                })
            }
            Action::ToggleShowAll => {
                self.show_all = !self.show_all;
                Outcome::default()
            }
            Action::ApplyConfig(raw) => match self.categories.replace(&raw) {
                Ok(()) => {
                    info!("Applied configuration with {} categories", self.categories.len());
                    Outcome::default()
                        .mark(Section::Config)
                        .status("Categories saved")
                }
                Err(e) => {
                    warn!("Rejected configuration: {e}");
                    Outcome::default()
                        .status(e.status_message())
                        .rejected(e.to_string())
                }
            },
            Action::ResetConfig => {
                self.categories.reset();
                Outcome::default()
                    .mark(Section::Config)
                    .status("Categories saved")
            }
            Action::Import(raw) => match parse_import(&raw) {
                Ok(notes) => {
                    info!("Importing {} notes", notes.len());
                    self.notes.import_merge(notes);
                    Outcome::default().mark(Section::Notes).status("Imported")
                }
                Err(e) => {
                    warn!("Rejected import: {e}");
                    Outcome::default()
                        .status(e.status_message())
                        .rejected(e.to_string())
                }
            },
        };

        if let Some(status) = outcome.status {
            self.announce(status, now);
        }
        outcome
    }

    /// Adds a note and hands the timer over when the category starts one.
    fn add_note(&mut self, text: &str, now: DateTime<Utc>) -> Outcome {
        let category = self.current_category.clone();
        if self.notes.add(text, &category, now).is_none() {
            return Outcome::default();
        }
        let outcome = Outcome::default().mark(Section::Notes).status("Saved");

        let starts_timer = self
            .categories
            .lookup(&category)
            .is_some_and(|v| v.starts_timer);
        if starts_timer {
            self.timer.attribute_and_restart(&category, now);
            return outcome.mark(Section::Totals);
        }
        outcome
    }

    fn select_category(&mut self, key: String) -> Outcome {
        if self.categories.lookup(&key).is_none() {
            warn!("Unknown category {key}");
            return Outcome::default()
                .status("Unknown category")
                .rejected(format!("there is no category `{key}`"));
        }
        self.current_category = key;
        Outcome::default().mark(Section::SelectedCategory)
    }
}

fn timer_outcome(transition: TimerTransition) -> Outcome {
    match transition {
        TimerTransition::Started => Outcome::default().status("Running"),
        TimerTransition::Paused { .. } => Outcome::default().mark(Section::Totals).status("Paused"),
        TimerTransition::Unchanged => Outcome::default(),
    }
}
