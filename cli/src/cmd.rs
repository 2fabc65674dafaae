pub mod check_formatting;
pub mod check_output;
pub mod init;

use std::future::Future;
use std::path::Path;

use anyhow::Context as _;
use snipcheck_core::action;
use snipcheck_core::runner::DockerSession;
use snipcheck_core::storage::{AnkiRepository, DirectoryRepository, Repository};

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    /// Directory of questions, or the Anki tag of the questions when a profile is given
    pub target: String,

    /// Name of the Anki profile whose collection holds the questions
    #[arg(short = 'p', long)]
    pub anki_profile: Option<String>,

    #[command(subcommand)]
    pub subcmd: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    CheckOutput(check_output::Args),
    CheckFormatting(check_formatting::Args),
    Init(init::Args),
}

/// Process exit code on success.
pub type SubcmdResult = anyhow::Result<i32>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            CheckOutput(args) => check_output::exec(args, self).await,
            CheckFormatting(args) => check_formatting::exec(args, self).await,
            Init(args) => init::exec(args, self),
        }
    }

    pub fn open_repository(&self) -> anyhow::Result<Box<dyn Repository>> {
        let repo: Box<dyn Repository> = match &self.anki_profile {
            Some(profile) => Box::new(
                AnkiRepository::open_profile(profile, &self.target)
                    .with_context(|| format!("Failed to open Anki profile '{}'", profile))?,
            ),
            None => Box::new(DirectoryRepository::new(&self.target)),
        };
        Ok(repo)
    }

    pub fn target_dir(&self) -> &Path {
        Path::new(&self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum ArgMode {
    Check,
    Interactive,
    Fix,
}

impl From<ArgMode> for action::Mode {
    fn from(value: ArgMode) -> Self {
        use action::Mode;
        use ArgMode::*;
        match value {
            Check => Mode::Check,
            Interactive => Mode::Interactive,
            Fix => Mode::Fix,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct ModeArgs {
    /// What to do about failures
    #[arg(long, value_enum, default_value_t = ArgMode::Check)]
    pub mode: ArgMode,

    /// Shorthand for `--mode interactive`
    #[arg(short = 'i', long, conflicts_with = "mode")]
    pub interactive: bool,
}

impl ModeArgs {
    pub fn mode(&self) -> action::Mode {
        if self.interactive {
            action::Mode::Interactive
        } else {
            self.mode.into()
        }
    }
}

/// Awaits `check`, then removes the containers of `session` whether it succeeded, failed or was interrupted.
pub async fn teardown_after<T>(
    session: &DockerSession,
    check: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    let res = tokio::select! {
        res = check => res,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("Interrupted")),
    };

    if let Err(e) = session.teardown().await {
        log::warn!("Failed to remove containers: {:#}", e);
    }
    res
}
