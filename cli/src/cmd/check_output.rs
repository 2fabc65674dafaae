use snipcheck_core::action;
use snipcheck_core::interactive::TerminalPrompt;
use snipcheck_core::output::Verbosity;
use snipcheck_core::runner::{DockerRunner, DockerSession};

use super::{GlobalArgs, ModeArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[command(flatten)]
    pub mode: ModeArgs,

    /// Override the output verbosity (0, 1 or 2) of every question
    #[arg(long)]
    pub output_verbosity: Option<Verbosity>,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let mut repo = global_args.open_repository()?;
    let session = DockerSession::new();
    let runner = DockerRunner::new(&session);
    let mut prompt = TerminalPrompt;

    let summary = super::teardown_after(
        &session,
        action::check_output(
            &mut *repo,
            &runner,
            args.mode.mode(),
            &mut prompt,
            args.output_verbosity,
        ),
    )
    .await?;
    Ok(summary.exit_code())
}
