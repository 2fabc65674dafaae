use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, ReadDir},
    io,
    path::{Path, PathBuf},
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("Cannot serialize to TOML (dest='{0}'): {1}")]
        SerializeToToml(PathBuf, #[source] toml::ser::Error),

        #[error("Cannot deserialize from TOML (src='{0}'): {1}")]
        DeserializeFromToml(PathBuf, #[source] toml::de::Error),
    }
}
pub use error::{Error, Result};

#[must_use]
pub fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    fs::canonicalize(path).map_err(|e| Error::SingleIO("Cannot resolve path", path.to_owned(), e))
}

#[must_use]
pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

#[must_use]
pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn write_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    if let Some(dir) = filepath.as_ref().parent() {
        self::mkdir_all(dir)?;
    }
    self::write(filepath, contents)
}

#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

/// Reads the file, creating it empty when it does not exist yet.
#[must_use]
pub fn read_to_string_or_create(filepath: impl AsRef<Path>) -> Result<String> {
    let filepath = filepath.as_ref();
    match fs::read_to_string(filepath) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Creating empty {}", filepath.to_string_lossy());
            self::write(filepath, "")?;
            Ok(String::new())
        }
        Err(e) => Err(Error::SingleIO("Cannot read file", filepath.to_owned(), e)),
    }
}

#[must_use]
pub fn read_dir(dir: impl AsRef<Path>) -> Result<ReadDir> {
    fs::read_dir(&dir).map_err(|e| Error::SingleIO("Cannot read dir", dir.as_ref().to_owned(), e))
}

#[must_use]
pub fn read_toml_with_deserialize<P, T>(filepath: P) -> Result<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let filepath = filepath.as_ref();
    let s = self::read_to_string(filepath)?;
    toml::from_str(&s).map_err(|e| Error::DeserializeFromToml(filepath.to_owned(), e))
}

#[must_use]
pub fn write_toml_with_mkdir<P, T>(filepath: P, data: &T) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let s = toml::to_string(data)
        .map_err(|e| Error::SerializeToToml(filepath.as_ref().to_owned(), e))?;
    write_with_mkdir(filepath, &s)
}

/// Returns `root` followed by every directory below it, depth-first.
/// Siblings are visited in file name order, symlinked directories are not followed.
pub fn walk_dirs(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut res = Vec::new();
    let mut stack = vec![root.as_ref().to_owned()];

    while let Some(dir) = stack.pop() {
        let mut children: Vec<PathBuf> = self::read_dir(&dir)?
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect();
        children.sort();
        res.push(dir);
        stack.extend(children.into_iter().rev());
    }
    Ok(res)
}

/// Files directly under `dir` whose name matches any of `patterns`, sorted by path.
pub fn find_files_matching<'p, I>(dir: impl AsRef<Path>, patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = &'p ::glob::Pattern>,
    I::IntoIter: Clone,
{
    let patterns = patterns.into_iter();
    let mut res = Vec::new();

    for entry in self::read_dir(&dir)?.filter_map(std::result::Result::ok) {
        let Ok(ft) = entry.file_type() else {
            continue
        };
        if !ft.is_file() {
            continue;
        }
        let filename = entry.file_name();
        let filename = filename.to_string_lossy();
        if patterns.clone().any(|pat| pat.matches(&filename)) {
            res.push(entry.path());
        }
    }
    res.sort();
    Ok(res)
}
