use thiserror::Error;

/// User supplied input that was rejected as a whole. Whatever state existed before stays as it
/// was.
#[derive(Debug, Error)]
pub enum RejectedInput {
    #[error("categories JSON could not be parsed: {0}")]
    ConfigParse(#[source] serde_json::Error),

    #[error("categories JSON must be an object with a `categories` array of categories: {0}")]
    ConfigShape(#[source] serde_json::Error),

    #[error("import file could not be parsed: {0}")]
    ImportParse(#[source] serde_json::Error),

    #[error("import file must be an object with a `notes` array of notes: {0}")]
    ImportShape(#[source] serde_json::Error),
}

impl RejectedInput {
    /// Short message shown in the status line.
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) | Self::ConfigShape(_) => "Invalid categories JSON",
            Self::ImportParse(_) | Self::ImportShape(_) => "Import failed",
        }
    }
}
