pub mod anki;
pub mod directory;
pub mod error;
pub mod markup;

pub use anki::*;
pub use directory::*;
pub use error::*;

use crate::question::{Question, Tag};

/// Where questions are kept, and the only way workflows write back to it.
pub trait Repository {
    /// Human readable description of what [`Repository::list`] looks at.
    fn describe(&self) -> String;

    /// Every question in the store. A store that cannot be read in full is an error.
    fn list(&mut self) -> Result<Vec<Question>>;

    /// Replaces the stored expected output with `normalised`.
    fn fix_output(&mut self, question: &Question, normalised: &str) -> Result<()>;

    /// Replaces the stored code with `formatted`.
    fn fix_formatting(&mut self, question: &Question, formatted: &str) -> Result<()>;

    fn add_tag(&mut self, question: &Question, tag: Tag) -> Result<()>;
}
