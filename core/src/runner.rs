pub mod docker;
pub mod session;

pub use docker::*;
pub use session::*;

use std::io;

use async_trait::async_trait;

use crate::output::TimedChunk;
use crate::question::Snippet;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The snippet did not compile. A crash at run time is not an error; it is output.
    #[error("Build failed:\n{output}")]
    Build { output: String },

    #[error("Failed to spawn '{cmd}'")]
    Spawn {
        cmd: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to communicate with '{cmd}'")]
    Communicate {
        cmd: String,
        #[source]
        source: io::Error,
    },

    #[error("'{cmd}' failed (exitcode={code:?}): {stderr}")]
    Docker {
        cmd: String,
        code: Option<i32>,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, RunError>;

#[async_trait]
pub trait SnippetRunner: Send + Sync {
    /// Runs the snippet and returns its merged stdout/stderr, stamped with seconds since start.
    async fn execute(&self, snippet: &Snippet) -> Result<Vec<TimedChunk>>;

    /// Runs the language formatter over the snippet.
    /// `Ok(None)` means the formatter rejected the code.
    async fn format(&self, snippet: &Snippet, compress: bool) -> Result<Option<String>>;
}
