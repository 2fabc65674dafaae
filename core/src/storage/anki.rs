use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::{markup, Error, Repository, Result};
use crate::error::ConfigError;
use crate::output::Verbosity;
use crate::question::{Policy, Question, QuestionId, Snippet, Tag};

const FIELD_SEPARATOR: &str = "\x1f";

/// Questions kept as notes of an Anki collection, selected by tag.
///
/// Tags with the `snip:` prefix configure a question:
///
/// | tag                          | effect                              |
/// |------------------------------|-------------------------------------|
/// | `snip:image:<image>`         | required; image the snippet runs in |
/// | `snip:no_check_output`       | skip the output check               |
/// | `snip:no_check_formatting`   | skip the formatting check           |
/// | `snip:output_verbosity:<n>`  | verbosity 0, 1 or 2 (default 0)     |
/// | `snip:no_compress`           | keep blank lines after formatting   |
pub struct AnkiRepository {
    conn: Connection,
    path: PathBuf,
    tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Note {
    id: i64,
    fields: Vec<String>,
    tags: Vec<String>,
}

impl AnkiRepository {
    pub const TAG_PREFIX: &str = "snip:";
    const NO_COMPRESS: &str = "no_compress";
    const IMAGE: &str = "image:";
    const OUTPUT_VERBOSITY: &str = "output_verbosity:";

    /// `<data dir>/Anki2/<profile>/collection.anki2`
    pub fn collection_path(profile: &str) -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or(Error::NoDataDir)?;
        Ok(data_dir
            .join("Anki2")
            .join(profile)
            .join("collection.anki2"))
    }

    pub fn open_profile(profile: &str, tag: impl Into<String>) -> Result<Self> {
        Self::open(Self::collection_path(profile)?, tag)
    }

    pub fn open(path: impl AsRef<Path>, tag: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let conn = Connection::open(&path).map_err(|source| Error::Sqlite {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            conn,
            path,
            tag: tag.into(),
        })
    }

    fn sql<T>(&self, res: rusqlite::Result<T>) -> Result<T> {
        res.map_err(|source| Error::Sqlite {
            path: self.path.clone(),
            source,
        })
    }

    fn notes(&self) -> Result<Vec<Note>> {
        let mut stmt = self.sql(self.conn.prepare("SELECT id, flds, tags FROM notes ORDER BY id"))?;
        let rows = self.sql(stmt.query_map([], |row| {
            Ok(Note::from_columns(row.get(0)?, row.get(1)?, row.get(2)?))
        }))?;
        let notes = self.sql(rows.collect::<rusqlite::Result<Vec<_>>>())?;
        Ok(notes)
    }

    fn note(&self, id: i64) -> Result<Note> {
        let note = self.sql(
            self.conn
                .query_row(
                    "SELECT id, flds, tags FROM notes WHERE id = ?1",
                    params![id],
                    |row| Ok(Note::from_columns(row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional(),
        )?;
        note.ok_or(Error::NoteNotFound(id))
    }

    fn update(&self, note: &Note) -> Result<()> {
        let flds = note.fields.join(FIELD_SEPARATOR);
        let sfld = note
            .fields
            .first()
            .map(|f| markup::code_from_field(f))
            .unwrap_or_default();
        let tags = format!(" {} ", note.tags.join(" "));
        let modified = chrono::Utc::now().timestamp();

        self.sql(self.conn.execute(
            "UPDATE notes SET flds = ?1, sfld = ?2, tags = ?3, mod = ?4, usn = -1 WHERE id = ?5",
            params![flds, sfld, tags, modified, note.id],
        ))?;
        log::debug!("Updated note {}", note.id);
        Ok(())
    }

    fn note_id(question: &Question) -> Result<i64> {
        match question.id {
            QuestionId::Note(id) => Ok(id),
            ref id => Err(Error::ForeignQuestion(id.clone())),
        }
    }

    fn update_field(&self, question: &Question, index: usize, value: String) -> Result<()> {
        let mut note = self.note(Self::note_id(question)?)?;
        let got = note.fields.len();
        let field = note.fields.get_mut(index).ok_or(ConfigError::MissingNoteFields {
            note_id: note.id,
            got,
        })?;
        *field = value;
        self.update(&note)
    }
}

impl Note {
    fn from_columns(id: i64, flds: String, tags: String) -> Self {
        Self {
            id,
            fields: flds.split(FIELD_SEPARATOR).map(str::to_owned).collect(),
            tags: tags.split_whitespace().map(str::to_owned).collect(),
        }
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Tags with the `snip:` prefix, prefix removed.
    fn snip_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter_map(|t| t.strip_prefix(AnkiRepository::TAG_PREFIX))
    }

    fn snip_value(&self, key: &str) -> Option<&str> {
        self.snip_tags().find_map(|t| t.strip_prefix(key))
    }

    fn has_snip_flag(&self, flag: &str) -> bool {
        self.snip_tags().any(|t| t == flag)
    }

    fn to_question(&self) -> std::result::Result<Question, ConfigError> {
        let [code, output, ..] = self.fields.as_slice() else {
            return Err(ConfigError::MissingNoteFields {
                note_id: self.id,
                got: self.fields.len(),
            });
        };
        let image = self
            .snip_value(AnkiRepository::IMAGE)
            .ok_or(ConfigError::MissingImageTag(self.id))?;
        let output_verbosity = match self.snip_value(AnkiRepository::OUTPUT_VERBOSITY) {
            Some(v) => v.parse()?,
            None => Verbosity::Minimal,
        };

        Ok(Question {
            id: QuestionId::Note(self.id),
            snippet: Snippet::new(markup::code_from_field(code), image)?,
            expected_output: markup::output_from_field(output),
            policy: Policy {
                check_output: !self.has_snip_flag(Tag::NoCheckOutput.into()),
                check_formatting: !self.has_snip_flag(Tag::NoCheckFormatting.into()),
                output_verbosity,
                compress: !self.has_snip_flag(AnkiRepository::NO_COMPRESS),
            },
        })
    }
}

impl Repository for AnkiRepository {
    fn describe(&self) -> String {
        format!("notes tagged '{}'", self.tag)
    }

    fn list(&mut self) -> Result<Vec<Question>> {
        let mut questions = Vec::new();
        for note in self.notes()?.iter().filter(|n| n.has_tag(&self.tag)) {
            questions.push(note.to_question()?);
        }
        Ok(questions)
    }

    fn fix_output(&mut self, question: &Question, normalised: &str) -> Result<()> {
        self.update_field(question, 1, markup::output_to_field(normalised))
    }

    fn fix_formatting(&mut self, question: &Question, formatted: &str) -> Result<()> {
        let class = question.snippet.language.highlight_class();
        self.update_field(question, 0, markup::code_to_field(formatted, class))
    }

    fn add_tag(&mut self, question: &Question, tag: Tag) -> Result<()> {
        let mut note = self.note(Self::note_id(question)?)?;
        let tag = format!("{}{}", Self::TAG_PREFIX, tag);
        if !note.has_tag(&tag) {
            note.tags.push(tag);
            self.update(&note)?;
        }
        Ok(())
    }
}
