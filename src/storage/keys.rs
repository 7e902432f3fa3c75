use std::fmt::Display;

use crate::app::state::Section;

pub const KEY_PREFIX: &str = "quicknotes.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Notes,
    Draft,
    SelectedCategory,
    Config,
    TimerSnapshot,
    CategoryTotals,
    ActiveCategory,
}

impl StorageKey {
    fn suffix(&self) -> &'static str {
        match self {
            StorageKey::Notes => "notes",
            StorageKey::Draft => "draft",
            StorageKey::SelectedCategory => "type",
            StorageKey::Config => "config",
            StorageKey::TimerSnapshot => "timer",
            StorageKey::CategoryTotals => "perCategory",
            StorageKey::ActiveCategory => "activeCategory",
        }
    }

    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Keys written when a section changes.
    pub fn for_section(section: Section) -> &'static [StorageKey] {
        match section {
            Section::Notes => &[StorageKey::Notes],
            Section::Draft => &[StorageKey::Draft],
            Section::SelectedCategory => &[StorageKey::SelectedCategory],
            Section::Config => &[StorageKey::Config],
            Section::Totals => &[StorageKey::CategoryTotals, StorageKey::ActiveCategory],
            Section::TimerSnapshot => &[StorageKey::TimerSnapshot],
        }
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{KEY_PREFIX}.{}", self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use crate::app::state::Section;

    use super::StorageKey;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(StorageKey::Notes.name(), "quicknotes.v1.notes");
        assert_eq!(StorageKey::SelectedCategory.to_string(), "quicknotes.v1.type");
        assert_eq!(
            StorageKey::for_section(Section::Totals),
            &[StorageKey::CategoryTotals, StorageKey::ActiveCategory]
        );
    }
}
