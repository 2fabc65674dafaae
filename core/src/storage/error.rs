use std::path::PathBuf;

use crate::error::ConfigError;
use crate::question::QuestionId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] fsutil::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot access Anki collection '{}'", .path.to_string_lossy())]
    Sqlite {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Cannot locate the user data directory")]
    NoDataDir,

    #[error("Note {0} no longer exists")]
    NoteNotFound(i64),

    #[error("{0} does not belong to this store")]
    ForeignQuestion(QuestionId),
}

impl Error {
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Fs(fsutil::Error::DeserializeFromToml(..)))
    }
}
