use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::RejectedInput;

pub const EXPORT_VERSION: u32 = 1;

/// Amount of notes shown before the list is expanded.
pub const COLLAPSED_NOTES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    /// Key of the category the note was created under. Categories may be removed later, so this
    /// is a plain lookup key.
    #[serde(rename = "type")]
    pub category: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ts: DateTime<Utc>,
}

/// Shape of an export file, `{ "version": 1, "notes": [...] }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: u32,
    pub notes: Vec<Note>,
}

#[derive(Debug, Deserialize)]
struct ImportDocument {
    notes: Vec<Note>,
}

/// Parses an import file. Only the `notes` array is required.
pub fn parse_import(raw: &str) -> Result<Vec<Note>, RejectedInput> {
    let value =
        serde_json::from_str::<serde_json::Value>(raw).map_err(RejectedInput::ImportParse)?;
    if !value.is_object() {
        return Err(RejectedInput::ImportShape(serde::de::Error::custom(
            "expected an object",
        )));
    }
    let document =
        serde_json::from_value::<ImportDocument>(value).map_err(RejectedInput::ImportShape)?;
    Ok(document.notes)
}

/// Notes ordered from the most recent to the oldest.
#[derive(Debug, Default, Clone)]
pub struct NoteStore {
    notes: Vec<Note>,
    deleted: Vec<Note>,
}

impl NoteStore {
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            notes,
            deleted: vec![],
        }
    }

    /// Reads the persisted notes array. Malformed data means an empty store.
    pub fn load(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<Vec<Note>>(raw) {
            Ok(notes) => Self::new(notes),
            Err(e) => {
                warn!("Stored notes are malformed, starting empty: {e}");
                Self::default()
            }
        }
    }

    /// Creates a note in front of the others. Blank text creates nothing.
    pub fn add(&mut self, text: &str, category: &str, now: DateTime<Utc>) -> Option<&Note> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let note = Note {
            id: Uuid::new_v4().to_string(),
            category: category.into(),
            text: text.into(),
            ts: now,
        };
        debug!("Adding note {}", note.id);
        self.notes.insert(0, note);
        self.notes.first()
    }

    /// Replaces the text of a note. Position and id are kept.
    pub fn update(&mut self, id: &str, text: &str) -> bool {
        match self.notes.iter_mut().find(|v| v.id == id) {
            Some(note) => {
                note.text = text.trim().into();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> Option<Note> {
        let index = self.notes.iter().position(|v| v.id == id)?;
        let note = self.notes.remove(index);
        self.deleted.push(note.clone());
        Some(note)
    }

    /// Puts the most recently deleted note back in front of the list.
    pub fn undo_delete(&mut self) -> Option<&Note> {
        let note = self.deleted.pop()?;
        self.notes.insert(0, note);
        self.notes.first()
    }

    /// Prepends imported notes keeping their order. Ids are not checked for collisions.
    pub fn import_merge(&mut self, notes: Vec<Note>) {
        let existing = std::mem::take(&mut self.notes);
        self.notes = notes;
        self.notes.extend(existing);
    }

    pub fn export_all(&self) -> ExportDocument {
        ExportDocument {
            version: EXPORT_VERSION,
            notes: self.notes.clone(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|v| v.id == id)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn visible(&self, show_all: bool) -> &[Note] {
        if show_all {
            &self.notes
        } else {
            &self.notes[..self.notes.len().min(COLLAPSED_NOTES)]
        }
    }

    /// Whether a "view more"/"view less" toggle makes sense.
    pub fn has_hidden(&self) -> bool {
        self.notes.len() > COLLAPSED_NOTES
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::error::RejectedInput;

    use super::{parse_import, NoteStore};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 7, 4, 0, 0, 0).unwrap()
    }

    fn store_with(texts: &[&str]) -> NoteStore {
        let mut store = NoteStore::default();
        for (i, text) in texts.iter().enumerate() {
            store.add(text, "note", start() + Duration::seconds(i as i64));
        }
        store
    }

    #[test]
    fn add_prepends_trimmed_note() {
        let mut store = store_with(&["first"]);
        let note = store.add("  second  ", "bug", start()).cloned().unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.notes()[0], note);
        assert_eq!(note.text, "second");
        assert_eq!(note.category, "bug");
        assert_eq!(note.ts, start());
    }

    #[test]
    fn add_ignores_blank_text() {
        let mut store = store_with(&["first"]);
        assert!(store.add("", "note", start()).is_none());
        assert!(store.add("   \n\t", "note", start()).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let store = store_with(&["a", "b", "c"]);
        let ids = store.notes().iter().map(|v| v.id.clone()).collect::<std::collections::HashSet<_>>();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn update_keeps_position_and_id() {
        let mut store = store_with(&["a", "b", "c"]);
        let target = store.notes()[1].clone();

        assert!(store.update(&target.id, "changed"));

        let updated = &store.notes()[1];
        assert_eq!(updated.id, target.id);
        assert_eq!(updated.text, "changed");
        assert_eq!(updated.ts, target.ts);
        assert!(!store.update("missing", "x"));
    }

    #[test]
    fn delete_removes_and_ignores_unknown_ids() {
        let mut store = store_with(&["a", "b"]);
        let id = store.notes()[0].id.clone();

        assert!(store.delete(&id).is_some());
        assert!(store.get(&id).is_none());
        assert_eq!(store.len(), 1);

        assert!(store.delete(&id).is_none());
        assert!(store.delete("unknown").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn undo_delete_restores_at_front() {
        let mut store = store_with(&["a", "b", "c"]);
        let removed = store.notes()[2].clone();
        store.delete(&removed.id);

        assert_eq!(store.undo_delete(), Some(&removed));
        assert_eq!(store.notes()[0], removed);
        assert!(store.undo_delete().is_none());
    }

    #[test]
    fn export_then_import_into_empty_store_keeps_order() {
        let store = store_with(&["a", "b", "c"]);
        let exported = serde_json::to_string_pretty(&store.export_all()).unwrap();

        let mut other = NoteStore::default();
        other.import_merge(parse_import(&exported).unwrap());

        assert_eq!(other.notes(), store.notes());
    }

    #[test]
    fn import_prepends_without_dedup() {
        let mut store = store_with(&["old"]);
        let imported = store_with(&["x", "y"]).notes().to_vec();
        let old = store.notes()[0].clone();

        store.import_merge(imported.clone());
        store.import_merge(imported.clone());

        assert_eq!(store.len(), 5);
        assert_eq!(store.notes()[0], imported[0]);
        assert_eq!(store.notes()[4], old);
    }

    #[test]
    fn import_rejects_wrong_shape() {
        assert!(matches!(parse_import("[1, 2"), Err(RejectedInput::ImportParse(_))));
        assert!(matches!(
            parse_import(r#"{"version": 1}"#),
            Err(RejectedInput::ImportShape(_))
        ));
        assert!(matches!(
            parse_import(r#"{"notes": {"id": "1"}}"#),
            Err(RejectedInput::ImportShape(_))
        ));
        assert!(matches!(parse_import("[[]]"), Err(RejectedInput::ImportShape(_))));
        assert_eq!(parse_import(r#"{"notes": []}"#).unwrap(), vec![]);
    }

    #[test]
    fn persisted_shape_matches_widget_format() {
        let store = store_with(&["hello"]);
        let value = serde_json::to_value(store.notes()).unwrap();
        assert_eq!(value[0]["type"], "note");
        assert_eq!(value[0]["ts"], start().timestamp_millis());

        assert_eq!(NoteStore::load(Some("oops")).len(), 0);
        assert_eq!(NoteStore::load(Some(&value.to_string())).notes(), store.notes());
    }

    #[test]
    fn visible_collapses_to_three() {
        let store = store_with(&["a", "b", "c", "d"]);
        assert_eq!(store.visible(false).len(), 3);
        assert_eq!(store.visible(true).len(), 4);
        assert!(store.has_hidden());
        assert!(!store_with(&["a"]).has_hidden());
    }
}
