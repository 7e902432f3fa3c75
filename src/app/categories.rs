use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RejectedInput;

pub const CONFIG_VERSION: u32 = 1;

/// A tag for notes. Categories with `starts_timer` also receive timer attribution when a note is
/// created under them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub starts_timer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<u8>,
}

impl Category {
    fn new(key: &str, label: &str, color: &str, starts_timer: bool, hotkey: Option<u8>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            color: color.into(),
            starts_timer,
            hotkey,
        }
    }

    /// Label shown to the user. Falls back to the key when a config omits the label.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

/// Persisted form of the category configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default, deserialize_with = "lenient_version")]
    pub version: u32,
    pub categories: Vec<Category>,
}

/// Only `categories` decides whether stored configuration is usable.
fn lenient_version<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(CONFIG_VERSION))
}

/// Form the user edits. Anything besides `categories` is ignored.
#[derive(Debug, Serialize, Deserialize)]
struct EditableDocument {
    categories: Vec<Category>,
}

fn default_categories() -> Vec<Category> {
    vec![
        Category::new("test", "Test", "#d8b4fe", true, Some(1)),
        Category::new("setup", "Setup", "#a7f3d0", true, Some(2)),
        Category::new("bug", "Bug", "#fecaca", true, Some(3)),
        Category::new("charter", "Charter", "#dbeafe", false, Some(4)),
        Category::new("future", "Future", "#bae6fd", false, None),
        Category::new("idea", "Idea", "#fde68a", false, Some(5)),
        Category::new("question", "Question", "#fbcfe8", false, None),
        Category::new("automate", "Automate", "#e9d5ff", false, None),
        Category::new("document", "Document", "#cffafe", false, None),
        Category::new("note", "Note", "#fff7ed", false, Some(6)),
    ]
}

/// Ordered list of categories. Drives grouping of category buttons, hotkeys and the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            categories: default_categories(),
        }
    }
}

impl CategoryRegistry {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Builds the registry from the persisted configuration. Missing or malformed configuration
    /// falls back to the built-in set.
    pub fn load(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            debug!("No stored category configuration, using defaults");
            return Self::default();
        };
        let document = serde_json::from_str::<serde_json::Value>(raw).and_then(|value| {
            if !value.is_object() {
                return Err(serde::de::Error::custom("expected an object"));
            }
            serde_json::from_value::<ConfigDocument>(value)
        });
        match document {
            Ok(document) => Self::new(document.categories),
            Err(e) => {
                warn!("Stored category configuration is malformed, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> ConfigDocument {
        ConfigDocument {
            version: CONFIG_VERSION,
            categories: self.categories.clone(),
        }
    }

    /// Applies user supplied JSON. The registry is only changed when the whole document is valid.
    pub fn replace(&mut self, raw: &str) -> Result<(), RejectedInput> {
        let value =
            serde_json::from_str::<serde_json::Value>(raw).map_err(RejectedInput::ConfigParse)?;
        if !value.is_object() {
            return Err(RejectedInput::ConfigShape(serde::de::Error::custom(
                "expected an object",
            )));
        }
        let document = serde_json::from_value::<EditableDocument>(value)
            .map_err(RejectedInput::ConfigShape)?;
        self.categories = document.categories;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.categories = default_categories();
    }

    pub fn lookup(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|v| v.key == key)
    }

    /// First category bound to `digit`. Duplicated hotkeys are allowed, the earliest one wins.
    pub fn hotkey_match(&self, digit: u8) -> Option<&Category> {
        self.categories.iter().find(|v| v.hotkey == Some(digit))
    }

    pub fn timers(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|v| v.starts_timer)
    }

    pub fn others(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|v| !v.starts_timer)
    }

    pub fn first_key(&self) -> Option<&str> {
        self.categories.first().map(|v| v.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Pretty printed `{ "categories": [...] }`, the text a user starts editing from.
    pub fn to_editable_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&EditableDocument {
            categories: self.categories.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RejectedInput;

    use super::{Category, CategoryRegistry};

    #[test]
    fn default_set_has_timer_and_other_categories() {
        let registry = CategoryRegistry::default();
        assert_eq!(registry.len(), 10);
        assert_eq!(
            registry.timers().map(|v| v.key.as_str()).collect::<Vec<_>>(),
            vec!["test", "setup", "bug"]
        );
        assert_eq!(registry.others().count(), 7);
        assert_eq!(registry.first_key(), Some("test"));
    }

    #[test]
    fn load_falls_back_to_defaults() {
        assert_eq!(CategoryRegistry::load(None), CategoryRegistry::default());
        assert_eq!(CategoryRegistry::load(Some("{not json")), CategoryRegistry::default());
        assert_eq!(
            CategoryRegistry::load(Some(r#"{"version":1,"categories":"nope"}"#)),
            CategoryRegistry::default()
        );
    }

    #[test]
    fn load_keeps_categories_without_usable_version() {
        let loaded = CategoryRegistry::load(Some(r#"{"categories":[{"key":"mine"}]}"#));
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.first_key(), Some("mine"));

        let loaded =
            CategoryRegistry::load(Some(r#"{"version":"two","categories":[{"key":"mine"}]}"#));
        assert_eq!(loaded.first_key(), Some("mine"));

        assert_eq!(
            CategoryRegistry::load(Some(r#"[1, [{"key":"mine"}]]"#)),
            CategoryRegistry::default()
        );
    }

    #[test]
    fn load_reads_saved_configuration() {
        let registry = CategoryRegistry::new(vec![Category {
            key: "deep".into(),
            label: "Deep work".into(),
            color: "#000000".into(),
            starts_timer: true,
            hotkey: Some(7),
        }]);
        let saved = serde_json::to_string(&registry.save()).unwrap();
        assert!(saved.contains(r#""version":1"#));
        assert!(saved.contains(r#""startsTimer":true"#));

        assert_eq!(CategoryRegistry::load(Some(&saved)), registry);
    }

    #[test]
    fn replace_rejects_malformed_json_and_keeps_registry() {
        let mut registry = CategoryRegistry::default();

        let result = registry.replace("{\"categories\": [");
        assert!(matches!(result, Err(RejectedInput::ConfigParse(_))));

        let result = registry.replace(r#"{"categories": {"key": "a"}}"#);
        assert!(matches!(result, Err(RejectedInput::ConfigShape(_))));

        let result = registry.replace(r#"[[{"key": "x"}]]"#);
        assert!(matches!(result, Err(RejectedInput::ConfigShape(_))));

        let result = registry.replace("null");
        assert!(matches!(result, Err(RejectedInput::ConfigShape(_))));

        assert_eq!(registry, CategoryRegistry::default());
    }

    #[test]
    fn replace_applies_whole_document() {
        let mut registry = CategoryRegistry::default();
        registry
            .replace(
                r##"{"categories": [
                    {"key": "a", "label": "A", "color": "#fff", "startsTimer": true, "hotkey": 1},
                    {"key": "b", "label": "B", "color": "#eee", "startsTimer": false}
                ], "extra": true}"##,
            )
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("a").map(|v| v.starts_timer), Some(true));
        assert!(registry.lookup("bug").is_none());
    }

    #[test]
    fn hotkey_lookup_takes_first_match() {
        let mut registry = CategoryRegistry::default();
        registry
            .replace(
                r#"{"categories": [
                    {"key": "first", "hotkey": 2},
                    {"key": "second", "hotkey": 2}
                ]}"#,
            )
            .unwrap();

        assert_eq!(registry.hotkey_match(2).map(|v| v.key.as_str()), Some("first"));
        assert!(registry.hotkey_match(9).is_none());
        assert_eq!(registry.lookup("first").map(|v| v.display_label()), Some("first"));
    }

    #[test]
    fn editable_json_round_trips_through_replace() {
        let registry = CategoryRegistry::default();
        let text = registry.to_editable_json().unwrap();

        let mut other = CategoryRegistry::new(vec![]);
        other.replace(&text).unwrap();
        assert_eq!(other, registry);
    }
}
