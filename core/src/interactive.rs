use std::{io, sync::Arc, time::Duration};
use tokio::sync::Mutex;

use indicatif::ProgressBar;

use crate::question::Question;

pub mod util {
    use dialoguer::{theme::ColorfulTheme, Input};
    use std::io;

    fn theme() -> ColorfulTheme {
        ColorfulTheme::default()
    }

    /// Empty answers are allowed.
    pub fn ask_text(prompt: &str) -> io::Result<String> {
        Input::<String>::with_theme(&theme())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    }
}

/// What to do about a failed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum UserResponse {
    /// Overwrite the stored value with the new one.
    Replace,
    /// Stop checking this question in future runs.
    Ignore,
    /// Tag the question for a human to look at.
    Review,
    MoveOn,
}

impl UserResponse {
    pub const PROMPT: &str = "Enter 'r' to replace, 'i' to ignore in future, \
        'v' to tag for review and move on, anything else to just move on";

    /// ```
    /// use snipcheck_core::interactive::UserResponse;
    ///
    /// assert_eq!(UserResponse::from_answer("r"), UserResponse::Replace);
    /// assert_eq!(UserResponse::from_answer(" v "), UserResponse::Review);
    /// assert_eq!(UserResponse::from_answer("yes"), UserResponse::MoveOn);
    /// ```
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim() {
            "r" => Self::Replace,
            "i" => Self::Ignore,
            "v" => Self::Review,
            _ => Self::MoveOn,
        }
    }
}

pub trait Prompt {
    fn ask(&mut self, question: &Question) -> io::Result<UserResponse>;
}

/// Asks on the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, _question: &Question) -> io::Result<UserResponse> {
        println!();
        util::ask_text(UserResponse::PROMPT).map(|s| UserResponse::from_answer(&s))
    }
}

pub trait SpinnerExt {
    fn with_ticking(self) -> Arc<Mutex<Self>>;
}

impl SpinnerExt for ProgressBar {
    fn with_ticking(self) -> Arc<Mutex<Self>> {
        let mutex_spinner = Arc::new(Mutex::new(self));
        let spinner = mutex_spinner.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(30)).await;
                let spinner = spinner.lock().await;
                if spinner.is_finished() {
                    break;
                }
                spinner.tick();
            }
        });
        mutex_spinner
    }
}
