use std::path::PathBuf;

/// A question cannot be assembled from what the store holds.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot tell language from image '{0}'")]
    UnknownImage(String),

    #[error("No image configured for extension '{ext}' (snippet: {path})")]
    UnmappedExtension { ext: String, path: PathBuf },

    #[error("{0} has multiple snippets: {1:?}")]
    MultipleSnippets(PathBuf, Vec<PathBuf>),

    #[error("Invalid output verbosity {0} (expected 0, 1 or 2)")]
    InvalidVerbosity(i64),

    #[error("Invalid output verbosity '{0}' (expected 0, 1 or 2)")]
    InvalidVerbosityString(String),

    #[error("Note {0} has no 'snip:image:' tag")]
    MissingImageTag(i64),

    #[error("Note {note_id} has {got} fields (expected at least 2)")]
    MissingNoteFields { note_id: i64, got: usize },
}
