use std::{
    collections::HashMap,
    path::PathBuf,
    process::{Output, Stdio},
};

use tokio::{io::AsyncWriteExt, process::Command, sync::Mutex};

use super::{Result, RunError};

/// Long-running containers, one per image, shared by every snippet of a batch.
///
/// Containers are started on first use and stay up until [`DockerSession::teardown`].
#[derive(Debug)]
pub struct DockerSession {
    program: PathBuf,
    containers: Mutex<HashMap<String, String>>,
}

impl Default for DockerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerSession {
    const DEFAULT_PROGRAM: &str = "docker";

    pub fn new() -> Self {
        Self {
            program: Self::DEFAULT_PROGRAM.into(),
            containers: Mutex::new(HashMap::new()),
        }
    }

    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Id of the container running `image`, starting it (and pulling the image) if needed.
    pub async fn container_for(&self, image: &str) -> Result<String> {
        let mut containers = self.containers.lock().await;
        if let Some(id) = containers.get(image) {
            return Ok(id.clone());
        }

        let inspect = self.output(&["image", "inspect", image]).await?;
        if !inspect.status.success() {
            log::info!("Pulling image {}", image);
            self.checked(&["pull", image]).await?;
        }

        let stdout = self
            .checked(&["run", "-d", image, "tail", "-f", "/dev/null"])
            .await?;
        let id = String::from_utf8_lossy(&stdout).trim().to_owned();
        log::info!("Started container {} for {}", short_id(&id), image);

        containers.insert(image.to_owned(), id.clone());
        Ok(id)
    }

    /// Removes every container started by this session.
    /// Keeps going after a failure and reports the first one.
    pub async fn teardown(&self) -> Result<()> {
        let containers: Vec<_> = self.containers.lock().await.drain().collect();
        let mut first_err = None;

        for (image, id) in containers {
            log::debug!("Removing container {} ({})", short_id(&id), image);
            if let Err(e) = self.checked(&["rm", "-f", &id]).await {
                log::warn!("Failed to remove container {}: {:#}", short_id(&id), e);
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub(crate) fn command<S: AsRef<str>>(&self, args: &[S]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args.iter().map(|s| s.as_ref()));
        cmd
    }

    pub(crate) fn describe<S: AsRef<str>>(&self, args: &[S]) -> String {
        let args: Vec<&str> = args.iter().map(|s| s.as_ref()).collect();
        format!("{} {}", self.program.to_string_lossy(), args.join(" "))
    }

    /// Runs docker to completion, whatever its exit status.
    pub(crate) async fn output<S: AsRef<str>>(&self, args: &[S]) -> Result<Output> {
        log::debug!("$ {}", self.describe(args));
        self.command(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RunError::Spawn {
                cmd: self.describe(args),
                source,
            })
    }

    /// Runs docker and returns its stdout, failing on a non-zero exit.
    pub(crate) async fn checked<S: AsRef<str>>(&self, args: &[S]) -> Result<Vec<u8>> {
        let output = self.output(args).await?;
        self.ensure_success(args, output)
    }

    /// Like [`Self::checked`], feeding `input` to docker's stdin.
    pub(crate) async fn checked_with_stdin<S: AsRef<str>>(
        &self,
        args: &[S],
        input: &[u8],
    ) -> Result<Vec<u8>> {
        log::debug!("$ {}", self.describe(args));
        let cmd = || self.describe(args);

        let mut proc = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn { cmd: cmd(), source })?;

        if let Some(mut stdin) = proc.stdin.take() {
            stdin
                .write_all(input)
                .await
                .map_err(|source| RunError::Communicate { cmd: cmd(), source })?;
            // closing stdin ends `cat`
            drop(stdin);
        }

        let output = proc
            .wait_with_output()
            .await
            .map_err(|source| RunError::Communicate { cmd: cmd(), source })?;
        self.ensure_success(args, output)
    }

    fn ensure_success<S: AsRef<str>>(&self, args: &[S], output: Output) -> Result<Vec<u8>> {
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(RunError::Docker {
                cmd: self.describe(args),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
