use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::bail;

use super::{Error, Repository, Result};
use crate::config::DirConfig;
use crate::error::ConfigError;
use crate::question::{Policy, Question, QuestionId, Snippet, Tag};

/// Questions kept as a directory tree: one snippet file and one `output.txt` per question folder.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    root: PathBuf,
}

impl DirectoryRepository {
    pub const OUTPUT_FILENAME: &str = "output.txt";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes the example `snippet_checker.toml` into `dir`. Refuses to overwrite one.
    pub fn init_with_example_config(dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let path = dir.as_ref().join(DirConfig::FILENAME);
        if path.exists() {
            bail!(
                "{:?} already exists.\nIf it's intentional, remove it and then try again.",
                path
            );
        }
        fsutil::write_with_mkdir(&path, DirConfig::example_toml())?;
        Ok(path)
    }

    fn load_question(dir: &Path, cfg: &DirConfig) -> Result<Option<Question>> {
        let mut snippets = fsutil::find_files_matching(dir, cfg.include.iter().map(|g| &**g))?;
        let snippet_path = match snippets.len() {
            0 => return Ok(None),
            1 => snippets.remove(0),
            _ => return Err(ConfigError::MultipleSnippets(dir.to_owned(), snippets).into()),
        };

        let ext = snippet_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(image) = cfg.image_for_extension(&ext) else {
            return Err(ConfigError::UnmappedExtension {
                ext,
                path: snippet_path,
            }
            .into());
        };

        let code = fsutil::read_to_string(&snippet_path)?;
        // created empty so a later fix has something to overwrite
        let expected_output = fsutil::read_to_string_or_create(dir.join(Self::OUTPUT_FILENAME))?;

        if cfg.review {
            log::info!("{} is marked for review", snippet_path.to_string_lossy());
        }

        Ok(Some(Question {
            snippet: Snippet::new(code, image)?,
            id: QuestionId::File(snippet_path),
            expected_output,
            policy: Policy {
                check_output: cfg.check_output,
                check_formatting: cfg.check_formatting,
                output_verbosity: cfg.output_verbosity,
                compress: cfg.compress,
            },
        }))
    }

    fn snippet_path<'q>(&self, question: &'q Question) -> Result<&'q Path> {
        match &question.id {
            QuestionId::File(path) => Ok(path),
            id => Err(Error::ForeignQuestion(id.clone())),
        }
    }

    fn question_dir<'q>(&self, question: &'q Question) -> Result<&'q Path> {
        let path = self.snippet_path(question)?;
        Ok(path.parent().unwrap_or(Path::new(".")))
    }
}

impl Repository for DirectoryRepository {
    fn describe(&self) -> String {
        format!("directory '{}'", self.root.to_string_lossy())
    }

    fn list(&mut self) -> Result<Vec<Question>> {
        let root_cfg = DirConfig::from_ancestors(fsutil::canonicalize(&self.root)?)?;

        let mut configs: HashMap<PathBuf, DirConfig> = HashMap::new();
        let mut questions = Vec::new();

        for dir in fsutil::walk_dirs(&self.root)? {
            let cfg = match dir.parent().and_then(|p| configs.get(p)) {
                Some(parent_cfg) if dir != self.root => parent_cfg.clone().merged_with_dir(&dir)?,
                _ => root_cfg.clone(),
            };
            if let Some(q) = Self::load_question(&dir, &cfg)? {
                log::debug!("Found {}", q.id);
                questions.push(q);
            }
            configs.insert(dir, cfg);
        }
        Ok(questions)
    }

    fn fix_output(&mut self, question: &Question, normalised: &str) -> Result<()> {
        let path = self.question_dir(question)?.join(Self::OUTPUT_FILENAME);
        fsutil::write(path, normalised)?;
        Ok(())
    }

    fn fix_formatting(&mut self, question: &Question, formatted: &str) -> Result<()> {
        fsutil::write(self.snippet_path(question)?, formatted)?;
        Ok(())
    }

    fn add_tag(&mut self, question: &Question, tag: Tag) -> Result<()> {
        let path = self.question_dir(question)?.join(DirConfig::FILENAME);
        let mut table: toml::Table = if path.is_file() {
            fsutil::read_toml_with_deserialize(&path)?
        } else {
            toml::Table::new()
        };

        let (key, value) = match tag {
            Tag::NoCheckOutput => ("check_output", false),
            Tag::NoCheckFormatting => ("check_formatting", false),
            Tag::Review => ("review", true),
        };
        table.insert(key.to_owned(), toml::Value::Boolean(value));

        fsutil::write_toml_with_mkdir(&path, &table)?;
        log::debug!("Set {} = {} in {}", key, value, path.to_string_lossy());
        Ok(())
    }
}
