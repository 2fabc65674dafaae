use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use super::{DockerSession, Result, RunError, SnippetRunner};
use crate::lang::Recipe;
use crate::output::TimedChunk;
use crate::question::Snippet;

/// Runs snippets inside the containers of a [`DockerSession`].
///
/// Execution has no time limit; a snippet that never exits blocks the batch.
#[derive(Debug, Clone, Copy)]
pub struct DockerRunner<'s> {
    session: &'s DockerSession,
}

impl<'s> DockerRunner<'s> {
    const READ_BUF_SIZE: usize = 4096;

    pub fn new(session: &'s DockerSession) -> Self {
        Self { session }
    }

    async fn put_source(&self, container: &str, recipe: &Recipe, code: &str) -> Result<()> {
        let args = write_args(container, recipe);
        self.session
            .checked_with_stdin(&args, code.as_bytes())
            .await?;
        Ok(())
    }

    async fn build(&self, container: &str, recipe: &Recipe) -> Result<()> {
        let Some(build) = recipe.build else {
            return Ok(());
        };
        let args = exec_args(container, recipe, build, false);
        let output = self.session.output(&args).await?;
        if output.status.success() {
            return Ok(());
        }

        let mut merged = String::from_utf8_lossy(&output.stdout).into_owned();
        merged.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(RunError::Build { output: merged })
    }

    async fn run_timed(&self, container: &str, recipe: &Recipe) -> Result<Vec<TimedChunk>> {
        let args = exec_args(container, recipe, recipe.run, true);
        let cmd = self.session.describe(&args);
        log::debug!("$ {}", cmd);

        let mut proc = self
            .session
            .command(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| RunError::Spawn {
                cmd: cmd.clone(),
                source,
            })?;
        let mut stdout = proc.stdout.take().ok_or_else(|| RunError::Communicate {
            cmd: cmd.clone(),
            source: std::io::Error::other("stdout is not piped"),
        })?;

        let start_at = tokio::time::Instant::now();
        let mut chunks = Vec::new();
        let mut buf = vec![0u8; Self::READ_BUF_SIZE];
        loop {
            let n = stdout
                .read(&mut buf)
                .await
                .map_err(|source| RunError::Communicate {
                    cmd: cmd.clone(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            let elapsed = start_at.elapsed().as_secs_f64();
            chunks.push(TimedChunk::new(elapsed, &buf[..n]));
        }

        let status = proc
            .wait()
            .await
            .map_err(|source| RunError::Communicate { cmd, source })?;
        log::debug!("Snippet exited with {:?}", status.code());

        Ok(chunks)
    }

    async fn read_source(&self, container: &str, recipe: &Recipe) -> Result<String> {
        let args = ["exec", container, "cat", recipe.source_path];
        let stdout = self.session.checked(&args).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

#[async_trait]
impl SnippetRunner for DockerRunner<'_> {
    async fn execute(&self, snippet: &Snippet) -> Result<Vec<TimedChunk>> {
        let recipe = snippet.language.recipe();
        let container = self.session.container_for(&snippet.image).await?;

        self.put_source(&container, recipe, &snippet.code).await?;
        self.build(&container, recipe).await?;
        self.run_timed(&container, recipe).await
    }

    async fn format(&self, snippet: &Snippet, compress: bool) -> Result<Option<String>> {
        let recipe = snippet.language.recipe();
        let container = self.session.container_for(&snippet.image).await?;

        self.put_source(&container, recipe, &snippet.code).await?;

        let args = formatter_args(&container, recipe);
        let output = self.session.output(&args).await?;
        if !output.status.success() {
            log::warn!(
                "Formatter failed (exitcode={:?}): {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        let formatted = self.read_source(&container, recipe).await?;
        Ok(Some(if compress {
            snippet.language.compress(&formatted)
        } else {
            formatted
        }))
    }
}

fn write_args(container: &str, recipe: &Recipe) -> Vec<String> {
    vec![
        "exec".into(),
        "-i".into(),
        container.into(),
        "sh".into(),
        "-c".into(),
        format!("cat > {}", recipe.source_path),
    ]
}

fn exec_args(container: &str, recipe: &Recipe, cmd: &[&str], tty: bool) -> Vec<String> {
    let mut args = vec!["exec".to_owned()];
    if tty {
        args.push("-t".into());
    }
    args.extend(["-w".to_owned(), recipe.workdir.to_owned()]);
    for (k, v) in recipe.env {
        args.extend(["-e".to_owned(), format!("{}={}", k, v)]);
    }
    args.push(container.into());
    args.extend(cmd.iter().map(|s| s.to_string()));
    args
}

fn formatter_args(container: &str, recipe: &Recipe) -> Vec<String> {
    exec_args(container, recipe, &["sh", "-c", recipe.format], false)
}
