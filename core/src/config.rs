use std::collections::BTreeMap;
use std::path::Path;
use std::result::Result as StdResult;

use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use serdable::GlobPattern;

use crate::output::Verbosity;

/// Settings of one `snippet_checker.toml`. Unset keys inherit from the directory above.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PartialDirConfig {
    #[serde(default)]
    pub images: BTreeMap<String, String>,
    pub include: Option<Vec<GlobPattern>>,
    pub check_output: Option<bool>,
    pub check_formatting: Option<bool>,
    pub output_verbosity: Option<Verbosity>,
    pub compress: Option<bool>,
    pub review: Option<bool>,
}

/// Settings in effect for one directory after cascading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirConfig {
    /// File extension (without dot) to image.
    pub images: BTreeMap<String, String>,
    pub include: Vec<GlobPattern>,
    pub check_output: bool,
    pub check_formatting: bool,
    pub output_verbosity: Verbosity,
    pub compress: bool,
    pub review: bool,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            images: BTreeMap::new(),
            include: ["snippet.*", "main.*"]
                .iter()
                .filter_map(|p| GlobPattern::parse(p).ok())
                .collect(),
            check_output: true,
            check_formatting: true,
            output_verbosity: Verbosity::Elided,
            compress: false,
            review: false,
        }
    }
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl DirConfig {
    pub const FILENAME: &str = "snippet_checker.toml";

    pub fn example_toml() -> String {
        let file = Asset::get(Self::FILENAME).unwrap();
        String::from_utf8_lossy(&file.data).into_owned()
    }

    pub fn merged(mut self, p: PartialDirConfig) -> Self {
        self.images.extend(p.images);
        if let Some(v) = p.include {
            self.include = v;
        }
        if let Some(v) = p.check_output {
            self.check_output = v;
        }
        if let Some(v) = p.check_formatting {
            self.check_formatting = v;
        }
        if let Some(v) = p.output_verbosity {
            self.output_verbosity = v;
        }
        if let Some(v) = p.compress {
            self.compress = v;
        }
        if let Some(v) = p.review {
            self.review = v;
        }
        self
    }

    /// Applies the config file in `dir`, if there is one.
    pub fn merged_with_dir(self, dir: impl AsRef<Path>) -> fsutil::Result<Self> {
        let path = dir.as_ref().join(Self::FILENAME);
        if !path.is_file() {
            return Ok(self);
        }
        let partial: PartialDirConfig = fsutil::read_toml_with_deserialize(&path)?;
        log::debug!("Loaded {}", path.to_string_lossy());
        Ok(self.merged(partial))
    }

    /// Defaults overridden by every config file from the filesystem root down to `dir`.
    pub fn from_ancestors(dir: impl AsRef<Path>) -> fsutil::Result<Self> {
        let dirs: Vec<&Path> = dir.as_ref().ancestors().collect();
        dirs.into_iter()
            .rev()
            .try_fold(Self::default(), |cfg, d| cfg.merged_with_dir(d))
    }

    pub fn image_for_extension(&self, ext: &str) -> Option<&str> {
        self.images.get(ext).map(String::as_str)
    }
}

impl PartialDirConfig {
    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::btreemap;

    #[test]
    fn example_toml_should_be_parsable() {
        let toml = DirConfig::example_toml();
        let partial = dbg!(PartialDirConfig::from_toml(&toml)).unwrap();

        assert_eq!(partial.images.len(), 5);
        assert_eq!(partial.images["py"], "python:3.13");
        assert_eq!(partial.include, None);
        assert_eq!(partial.output_verbosity, None);

        let cfg = DirConfig::default().merged(partial);
        assert_eq!(cfg.image_for_extension("go"), Some("golang:1.24"));
        assert_eq!(cfg.output_verbosity, Verbosity::Elided);
    }

    #[test]
    fn deeper_config_wins_and_images_merge() {
        let root = PartialDirConfig::from_toml(
            r#"
            check_formatting = false
            output_verbosity = 0
            [images]
            py = "python:3.12"
            go = "golang:1.24"
            "#,
        )
        .unwrap();
        let leaf = PartialDirConfig::from_toml(
            r#"
            output_verbosity = 2
            include = ["solution.*"]
            [images]
            py = "python:3.13"
            "#,
        )
        .unwrap();

        let cfg = DirConfig::default().merged(root).merged(leaf);
        assert_eq!(
            cfg.images,
            btreemap! {
                "go".to_owned() => "golang:1.24".to_owned(),
                "py".to_owned() => "python:3.13".to_owned(),
            }
        );
        assert_eq!(cfg.check_formatting, false);
        assert_eq!(cfg.check_output, true);
        assert_eq!(cfg.output_verbosity, Verbosity::Verbatim);
        assert_eq!(cfg.include, vec![GlobPattern::parse("solution.*").unwrap()]);
    }

    #[test]
    fn bad_verbosity_is_rejected() {
        assert!(PartialDirConfig::from_toml("output_verbosity = 5").is_err());
    }

    #[test]
    fn from_ancestors_reads_every_level() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let leaf = root.join("a/b");
        fsutil::mkdir_all(&leaf).unwrap();
        fsutil::write(root.join(DirConfig::FILENAME), "compress = true\n[images]\nrb = \"ruby:3.4\"\n").unwrap();
        fsutil::write(leaf.join(DirConfig::FILENAME), "check_output = false\n").unwrap();

        let cfg = DirConfig::from_ancestors(&leaf).unwrap();
        assert!(cfg.compress);
        assert!(!cfg.check_output);
        assert_eq!(cfg.image_for_extension("rb"), Some("ruby:3.4"));
    }
}
