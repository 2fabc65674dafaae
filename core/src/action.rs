pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}

use std::path::{Path, PathBuf};

use error::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::interactive::{Prompt, SpinnerExt, UserResponse};
use crate::output::{self, Verbosity};
use crate::question::{Question, Tag};
use crate::runner::{RunError, SnippetRunner};
use crate::storage::{self, DirectoryRepository, Repository};
use crate::style;

/// How failures are dealt with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Report only; never write to the store.
    #[default]
    Check,
    /// Ask what to do about each fixable failure.
    Interactive,
    /// Replace the stored value of every fixable failure.
    Fix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CheckKind {
    Output,
    Formatting,
}

impl CheckKind {
    fn ignore_tag(&self) -> Tag {
        match self {
            CheckKind::Output => Tag::NoCheckOutput,
            CheckKind::Formatting => Tag::NoCheckFormatting,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub found: usize,
    pub checked: usize,
    pub failed: usize,
    pub fixed: usize,
    pub ignored: usize,
}

impl CheckSummary {
    /// Failures nobody dealt with.
    pub fn remaining(&self) -> usize {
        self.failed.saturating_sub(self.fixed + self.ignored)
    }

    pub fn exit_code(&self) -> i32 {
        if self.remaining() > 0 {
            1
        } else {
            0
        }
    }
}

pub fn init_snippet_dir(dir: impl AsRef<Path>) -> Result<PathBuf> {
    DirectoryRepository::init_with_example_config(dir).context("Failed to write example config")
}

fn list_questions<R>(repo: &mut R, kind: CheckKind) -> Result<(Vec<Question>, usize)>
where
    R: Repository + ?Sized,
{
    println!("Looking for questions in {}.", repo.describe());
    let questions = repo
        .list()
        .with_context(|| format!("Failed to load questions from {}", repo.describe()))?;
    let found = questions.len();

    let to_check: Vec<Question> = questions
        .into_iter()
        .filter(|q| match kind {
            CheckKind::Output => q.policy.check_output,
            CheckKind::Formatting => q.policy.check_formatting,
        })
        .collect();

    println!("Found {} questions.", found);
    println!("Will check {}.", to_check.len());
    Ok((to_check, found))
}

fn spinner(msg: String) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    ProgressBar::new_spinner().with_style(style).with_message(msg)
}

/// Settles one fixable failure according to `mode`, updating `summary`.
fn settle<R, P, F>(
    repo: &mut R,
    prompt: &mut P,
    mode: Mode,
    kind: CheckKind,
    question: &Question,
    summary: &mut CheckSummary,
    fix: F,
) -> Result<()>
where
    R: Repository + ?Sized,
    P: Prompt + ?Sized,
    F: FnOnce(&mut R, &Question) -> storage::Result<()>,
{
    let response = match mode {
        Mode::Check => return Ok(()),
        Mode::Fix => UserResponse::Replace,
        Mode::Interactive => prompt.ask(question).context("Failed to read answer")?,
    };

    match response {
        UserResponse::Replace => {
            fix(repo, question).with_context(|| format!("Failed to fix {}", question.id))?;
            summary.fixed += 1;
            println!("✨ Replaced.");
        }
        UserResponse::Ignore => {
            repo.add_tag(question, kind.ignore_tag())
                .with_context(|| format!("Failed to tag {}", question.id))?;
            summary.ignored += 1;
            println!("🙈 Will ignore in future.");
        }
        UserResponse::Review => {
            repo.add_tag(question, Tag::Review)
                .with_context(|| format!("Failed to tag {}", question.id))?;
            println!("🔎 Added '{}' tag.", Tag::Review);
        }
        UserResponse::MoveOn => println!("😶 Moving on."),
    }
    Ok(())
}

/// Runs every question whose output is checked and compares its normalised output with the stored one.
///
/// `verbosity` overrides each question's own output verbosity.
pub async fn check_output<R, S, P>(
    repo: &mut R,
    runner: &S,
    mode: Mode,
    prompt: &mut P,
    verbosity: Option<Verbosity>,
) -> Result<CheckSummary>
where
    R: Repository + ?Sized,
    S: SnippetRunner + ?Sized,
    P: Prompt + ?Sized,
{
    let kind = CheckKind::Output;
    let (questions, found) = list_questions(repo, kind)?;
    let mut summary = CheckSummary {
        found,
        checked: questions.len(),
        ..Default::default()
    };

    for mut question in questions {
        if let Some(v) = verbosity {
            question.policy.output_verbosity = v;
        }

        let spinner = spinner(format!("Running {} ...", question.id)).with_ticking();
        let res = runner.execute(&question.snippet).await;
        spinner.lock().await.finish_and_clear();

        let chunks = match res {
            Ok(chunks) => chunks,
            Err(RunError::Build { output }) => {
                style::print_build_failure(&question, &output);
                summary.failed += 1;
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to run {}", question.id)),
        };

        let raw = output::build(&chunks);
        let normalised = question.normalise(&raw);
        if question.has_ok_output(&normalised) {
            log::info!("{} {}", style::verdict_icon(style::Verdict::Pass), question.id);
            continue;
        }

        style::print_output_mismatch(&question, &normalised);
        summary.failed += 1;
        settle(repo, prompt, mode, kind, &question, &mut summary, |repo, q| {
            repo.fix_output(q, &normalised)
        })?;
    }

    style::print_check_summary(kind, &summary);
    Ok(summary)
}

/// Formats every question whose formatting is checked and compares the result with the stored code.
pub async fn check_formatting<R, S, P>(
    repo: &mut R,
    runner: &S,
    mode: Mode,
    prompt: &mut P,
) -> Result<CheckSummary>
where
    R: Repository + ?Sized,
    S: SnippetRunner + ?Sized,
    P: Prompt + ?Sized,
{
    let kind = CheckKind::Formatting;
    let (questions, found) = list_questions(repo, kind)?;
    let mut summary = CheckSummary {
        found,
        checked: questions.len(),
        ..Default::default()
    };

    for question in questions {
        let spinner = spinner(format!("Formatting {} ...", question.id)).with_ticking();
        let res = runner
            .format(&question.snippet, question.policy.compress)
            .await;
        spinner.lock().await.finish_and_clear();

        let formatted = match res {
            Ok(Some(formatted)) => formatted,
            Ok(None) => {
                style::print_format_failure(&question);
                summary.failed += 1;
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to format {}", question.id)),
        };

        if formatted == question.snippet.code {
            log::info!("{} {}", style::verdict_icon(style::Verdict::Pass), question.id);
            continue;
        }

        style::print_formatting_mismatch(&question, &formatted);
        summary.failed += 1;
        settle(repo, prompt, mode, kind, &question, &mut summary, |repo, q| {
            repo.fix_formatting(q, &formatted)
        })?;
    }

    style::print_check_summary(kind, &summary);
    Ok(summary)
}

#[cfg(test)]
mod test {
    use std::collections::{HashMap, VecDeque};
    use std::io;

    use async_trait::async_trait;

    use super::*;
    use crate::config::DirConfig;
    use crate::output::TimedChunk;
    use crate::question::{QuestionId, Snippet};

    /// Answers by snippet code.
    #[derive(Default)]
    struct FakeRunner {
        outputs: HashMap<String, Vec<TimedChunk>>,
        build_errors: HashMap<String, String>,
        formatted: HashMap<String, Option<String>>,
    }

    #[async_trait]
    impl SnippetRunner for FakeRunner {
        async fn execute(&self, snippet: &Snippet) -> crate::runner::Result<Vec<TimedChunk>> {
            if let Some(output) = self.build_errors.get(&snippet.code) {
                return Err(RunError::Build {
                    output: output.clone(),
                });
            }
            Ok(self.outputs.get(&snippet.code).cloned().unwrap_or_default())
        }

        async fn format(
            &self,
            snippet: &Snippet,
            _compress: bool,
        ) -> crate::runner::Result<Option<String>> {
            Ok(self
                .formatted
                .get(&snippet.code)
                .cloned()
                .unwrap_or_else(|| Some(snippet.code.clone())))
        }
    }

    struct ScriptedPrompt {
        answers: VecDeque<UserResponse>,
        asked: Vec<QuestionId>,
    }

    impl ScriptedPrompt {
        fn new(answers: &[UserResponse]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn ask(&mut self, question: &Question) -> io::Result<UserResponse> {
            self.asked.push(question.id.clone());
            Ok(self.answers.pop_front().unwrap_or(UserResponse::MoveOn))
        }
    }

    const HELLO_WORLD: &str = "import time\nprint('hello')\ntime.sleep(1)\nprint('world')\n";
    const GREET: &str = "print('hi')\n";

    fn put(root: &Path, rel: &str, contents: &str) {
        fsutil::write_with_mkdir(root.join(rel), contents).unwrap();
    }

    fn setup() -> (tempfile::TempDir, DirectoryRepository, FakeRunner) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        put(root, DirConfig::FILENAME, "[images]\npy = \"python:3.13\"\n");
        put(root, "a_sleep/snippet.py", HELLO_WORLD);
        put(root, "a_sleep/output.txt", "hello\n<~1s>\nworld\n");
        put(root, "b_greet/snippet.py", GREET);
        put(root, "b_greet/output.txt", "hello\n");

        let mut runner = FakeRunner::default();
        runner.outputs.insert(
            HELLO_WORLD.to_owned(),
            vec![
                TimedChunk::new(0.0, "hello\r\n"),
                TimedChunk::new(1.0, "world\r\n"),
            ],
        );
        runner
            .outputs
            .insert(GREET.to_owned(), vec![TimedChunk::new(0.02, "hi\r\n")]);

        let repo = DirectoryRepository::new(root);
        (tmp, repo, runner)
    }

    #[test]
    fn summary_arithmetic() {
        let s = CheckSummary {
            found: 5,
            checked: 4,
            failed: 3,
            fixed: 1,
            ignored: 1,
        };
        assert_eq!(s.remaining(), 1);
        assert_eq!(s.exit_code(), 1);
        assert_eq!(CheckSummary::default().exit_code(), 0);
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("interactive".parse::<Mode>().unwrap(), Mode::Interactive);
        assert_eq!(Mode::Fix.to_string(), "fix");
    }

    #[tokio::test]
    async fn timed_output_passes_and_mismatch_is_reported() {
        let (tmp, mut repo, runner) = setup();
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = check_output(&mut repo, &runner, Mode::Check, &mut prompt, None)
            .await
            .unwrap();

        assert_eq!(
            summary,
            CheckSummary {
                found: 2,
                checked: 2,
                failed: 1,
                fixed: 0,
                ignored: 0,
            }
        );
        assert!(prompt.asked.is_empty());
        assert_eq!(
            fsutil::read_to_string(tmp.path().join("b_greet/output.txt")).unwrap(),
            "hello\n"
        );
    }

    #[tokio::test]
    async fn interactive_replace_makes_next_check_pass() {
        let (tmp, mut repo, runner) = setup();
        let mut prompt = ScriptedPrompt::new(&[UserResponse::Replace]);

        let summary = check_output(&mut repo, &runner, Mode::Interactive, &mut prompt, None)
            .await
            .unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.fixed, 1);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(
            prompt.asked,
            vec![QuestionId::File(tmp.path().join("b_greet/snippet.py"))]
        );
        assert_eq!(
            fsutil::read_to_string(tmp.path().join("b_greet/output.txt")).unwrap(),
            "hi\n"
        );

        let summary = check_output(&mut repo, &runner, Mode::Check, &mut prompt, None)
            .await
            .unwrap();
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.exit_code(), 0);
    }

    #[tokio::test]
    async fn ignore_tags_the_question_out_of_future_runs() {
        let (_tmp, mut repo, runner) = setup();
        let mut prompt = ScriptedPrompt::new(&[UserResponse::Ignore]);

        let summary = check_output(&mut repo, &runner, Mode::Interactive, &mut prompt, None)
            .await
            .unwrap();
        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.remaining(), 0);

        let summary = check_output(&mut repo, &runner, Mode::Check, &mut prompt, None)
            .await
            .unwrap();
        assert_eq!(summary.found, 2);
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn review_and_move_on_leave_failures_remaining() {
        let (tmp, mut repo, runner) = setup();
        let mut prompt = ScriptedPrompt::new(&[UserResponse::Review]);

        let summary = check_output(&mut repo, &runner, Mode::Interactive, &mut prompt, None)
            .await
            .unwrap();
        assert_eq!(summary.remaining(), 1);
        assert_eq!(summary.exit_code(), 1);

        let table: toml::Table =
            fsutil::read_toml_with_deserialize(tmp.path().join("b_greet").join(DirConfig::FILENAME))
                .unwrap();
        assert_eq!(table["review"].as_bool(), Some(true));
    }

    #[tokio::test]
    async fn build_failure_is_not_fixable() {
        let (_tmp, mut repo, mut runner) = setup();
        runner
            .build_errors
            .insert(GREET.to_owned(), "SyntaxError".to_owned());
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = check_output(&mut repo, &runner, Mode::Fix, &mut prompt, None)
            .await
            .unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.fixed, 0);
        assert_eq!(summary.exit_code(), 1);
    }

    #[tokio::test]
    async fn verbosity_override_applies_to_every_question() {
        let (tmp, mut repo, mut runner) = setup();
        put(tmp.path(), "b_greet/output.txt", "ZeroDivisionError: division by zero\n");
        runner.outputs.insert(
            GREET.to_owned(),
            vec![TimedChunk::new(
                0.0,
                "Traceback (most recent call last):\r\n  File \"/tmp/main.py\", line 1, in <module>\r\n    1 / 0\r\nZeroDivisionError: division by zero\r\n",
            )],
        );
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = check_output(&mut repo, &runner, Mode::Check, &mut prompt, None)
            .await
            .unwrap();
        assert_eq!(summary.failed, 1);

        let summary = check_output(
            &mut repo,
            &runner,
            Mode::Check,
            &mut prompt,
            Some(Verbosity::Minimal),
        )
        .await
        .unwrap();
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn formatting_fix_and_formatter_error() {
        let (tmp, mut repo, mut runner) = setup();
        runner
            .formatted
            .insert(GREET.to_owned(), Some("print(\"hi\")\n".to_owned()));
        runner.formatted.insert(HELLO_WORLD.to_owned(), None);
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = check_formatting(&mut repo, &runner, Mode::Fix, &mut prompt)
            .await
            .unwrap();
        assert_eq!(summary.checked, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.fixed, 1);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(
            fsutil::read_to_string(tmp.path().join("b_greet/snippet.py")).unwrap(),
            "print(\"hi\")\n"
        );
    }

    #[tokio::test]
    async fn config_error_aborts_the_batch() {
        let (tmp, mut repo, runner) = setup();
        put(tmp.path(), "b_greet/main.py", "print(2)\n");
        let mut prompt = ScriptedPrompt::new(&[]);

        let err = check_output(&mut repo, &runner, Mode::Check, &mut prompt, None)
            .await
            .unwrap_err();
        let err = err.downcast_ref::<storage::Error>().unwrap();
        assert!(err.is_config_error());
    }
}
