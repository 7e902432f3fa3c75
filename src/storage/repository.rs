use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::app::{
    categories::CategoryRegistry,
    notes::NoteStore,
    state::{AppState, Dirty, Section},
    timer::{CategoryTotals, TimerEngine, TimerSnapshot},
};

use super::{keys::StorageKey, kv_store::KeyValueStore};

/// Bridges [AppState] and a [KeyValueStore]. Loading never fails on malformed values, only on
/// the store itself failing.
pub struct Repository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        self.store.get(&key.name())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        self.store.set(&key.name(), value)
    }

    #[instrument(skip(self))]
    pub fn load(&self, now: DateTime<Utc>) -> Result<AppState> {
        let categories = CategoryRegistry::load(self.get(StorageKey::Config)?.as_deref());
        let notes = NoteStore::load(self.get(StorageKey::Notes)?.as_deref());
        let timer = TimerEngine::restore(
            TimerSnapshot::load(self.get(StorageKey::TimerSnapshot)?.as_deref()),
            CategoryTotals::load(self.get(StorageKey::CategoryTotals)?.as_deref()),
            self.get(StorageKey::ActiveCategory)?,
            now,
        );
        let selected = self.get(StorageKey::SelectedCategory)?;
        let draft = self.get(StorageKey::Draft)?;

        debug!(
            "Loaded {} notes and {} categories",
            notes.len(),
            categories.len()
        );
        Ok(AppState::new(categories, notes, timer, selected, draft))
    }

    /// Writes every section marked in `dirty`.
    pub fn persist(&self, state: &AppState, dirty: &Dirty, now: DateTime<Utc>) -> Result<()> {
        for section in dirty.iter() {
            self.persist_section(state, section, now)?;
        }
        Ok(())
    }

    fn persist_section(&self, state: &AppState, section: Section, now: DateTime<Utc>) -> Result<()> {
        debug!("Persisting {section:?}");
        match section {
            Section::Notes => self.set(
                StorageKey::Notes,
                &serde_json::to_string(state.notes.notes())?,
            ),
            Section::Draft if state.draft.is_empty() => {
                self.store.remove(&StorageKey::Draft.name())
            }
            Section::Draft => self.set(StorageKey::Draft, &state.draft),
            Section::SelectedCategory => {
                self.set(StorageKey::SelectedCategory, &state.current_category)
            }
            Section::Config => self.set(
                StorageKey::Config,
                &serde_json::to_string(&state.categories.save())?,
            ),
            Section::Totals => {
                self.set(
                    StorageKey::CategoryTotals,
                    &serde_json::to_string(&state.timer.totals().save())?,
                )?;
                self.set(
                    StorageKey::ActiveCategory,
                    state.timer.active_category().unwrap_or_default(),
                )
            }
            Section::TimerSnapshot => self.set(
                StorageKey::TimerSnapshot,
                &serde_json::to_string(&state.timer.snapshot(now))?,
            ),
        }
    }

    /// Teardown write: total elapsed including the running segment, and whether it was running.
    pub fn save_timer_snapshot(&self, state: &AppState, now: DateTime<Utc>) -> Result<()> {
        self.persist_section(state, Section::TimerSnapshot, now)
    }
}
