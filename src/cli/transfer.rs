use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{app::notes::NoteStore, utils::time::export_file_name};

/// Writes every note into `target`, or into a timestamped file in the current directory.
pub async fn export_notes(
    notes: &NoteStore,
    target: Option<PathBuf>,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let path = target.unwrap_or_else(|| PathBuf::from(export_file_name(now)));
    let data = serde_json::to_string_pretty(&notes.export_all())?;
    tokio::fs::write(&path, data)
        .await
        .with_context(|| format!("Failed to write export into {path:?}"))?;
    info!("Exported {} notes into {path:?}", notes.len());
    Ok(path)
}

/// Reads an import file fully. Validation happens when the contents are dispatched.
pub async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {path:?}"))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use crate::app::notes::{parse_import, NoteStore};

    use super::{export_notes, read_file};

    #[tokio::test]
    async fn export_file_can_be_imported() -> Result<()> {
        let dir = tempdir()?;
        let now = Utc.with_ymd_and_hms(2025, 3, 16, 12, 0, 0).unwrap();
        let mut notes = NoteStore::default();
        notes.add("one", "note", now);
        notes.add("two", "bug", now);

        let path = export_notes(&notes, Some(dir.path().join("out.json")), now).await?;
        let raw = read_file(&path).await?;

        assert!(raw.contains("\"version\": 1"));
        assert_eq!(parse_import(&raw).unwrap(), notes.notes());
        Ok(())
    }

    #[tokio::test]
    async fn missing_import_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_file(&dir.path().join("missing.json")).await.is_err());
    }
}
