use std::{fmt, path::PathBuf};

use crate::error::ConfigError;
use crate::lang::Language;
use crate::output::Verbosity;

/// Label put on a question to change how it is treated in later runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Tag {
    NoCheckFormatting,
    NoCheckOutput,
    Review,
}

/// Where a question lives in its store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuestionId {
    /// Path of the snippet file.
    File(PathBuf),
    /// Note id in an Anki collection.
    Note(i64),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::File(path) => write!(f, "{}", path.to_string_lossy()),
            QuestionId::Note(id) => write!(f, "note {}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub code: String,
    pub language: Language,
    pub image: String,
}

impl Snippet {
    pub fn new(code: impl Into<String>, image: impl Into<String>) -> Result<Self, ConfigError> {
        let image = image.into();
        Ok(Self {
            code: code.into(),
            language: Language::from_image(&image)?,
            image,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub check_output: bool,
    pub check_formatting: bool,
    pub output_verbosity: Verbosity,
    pub compress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub snippet: Snippet,
    /// Stored in canonical form already; compared without normalising again.
    pub expected_output: String,
    pub policy: Policy,
}

impl Question {
    pub fn normalise(&self, raw: &str) -> String {
        self.snippet
            .language
            .normalise(raw, self.policy.output_verbosity)
    }

    pub fn has_ok_output(&self, normalised: &str) -> bool {
        crate::output::matches(normalised, &self.expected_output)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tag_names() {
        assert_eq!(Tag::NoCheckOutput.to_string(), "no_check_output");
        assert_eq!(Tag::NoCheckFormatting.to_string(), "no_check_formatting");
        assert_eq!("review".parse::<Tag>().unwrap(), Tag::Review);
    }

    #[test]
    fn snippet_language_follows_image() {
        let s = Snippet::new("puts 1\n", "ruby:3.4").unwrap();
        assert_eq!(s.language, Language::Ruby);
        assert!(Snippet::new("", "scratch").is_err());
    }

    #[test]
    fn question_id_display() {
        assert_eq!(QuestionId::Note(42).to_string(), "note 42");
        assert_eq!(
            QuestionId::File(PathBuf::from("q/snippet.py")).to_string(),
            "q/snippet.py"
        );
    }
}
