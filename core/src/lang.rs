//! The closed set of snippet languages and how each one is run and formatted.

use crate::error::ConfigError;
use crate::output::{self, Verbosity};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    Python,
    Go,
    Node,
    Ruby,
    Rust,
}

/// How a language's snippet is built, run and formatted inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    /// Where the snippet is written before running or formatting.
    pub source_path: &'static str,
    pub workdir: &'static str,
    pub build: Option<&'static [&'static str]>,
    pub run: &'static [&'static str],
    pub env: &'static [(&'static str, &'static str)],
    /// Run through `sh -c`; must rewrite `source_path` in place and exit non-zero on failure.
    pub format: &'static str,
}

impl Language {
    /// Image prefixes recognised per language, e.g. `python:3.13` or `golang:1.24`.
    pub fn from_image(image: &str) -> Result<Self, ConfigError> {
        use Language::*;
        let lang = if image.starts_with("golang") {
            Go
        } else if image.starts_with("python") || image.starts_with("numpy") {
            Python
        } else if image.starts_with("node") {
            Node
        } else if image.starts_with("ruby") {
            Ruby
        } else if image.starts_with("rust") {
            Rust
        } else {
            return Err(ConfigError::UnknownImage(image.to_owned()));
        };
        Ok(lang)
    }

    pub fn recipe(&self) -> &'static Recipe {
        use Language::*;
        match self {
            Python => &PYTHON,
            Go => &GO,
            Node => &NODE,
            Ruby => &RUBY,
            Rust => &RUST,
        }
    }

    pub fn normalise(&self, raw: &str, verbosity: Verbosity) -> String {
        output::normalise(*self, raw, verbosity)
    }

    /// Shrinks formatter output for places where vertical space is scarce (flashcards).
    ///
    /// ```
    /// use snipcheck_core::lang::Language;
    ///
    /// assert_eq!(Language::Python.compress("import os\n\n\n\ndef f():\n    pass\n"), "import os\n\ndef f():\n    pass\n");
    /// assert_eq!(Language::Go.compress("\npackage main\n\n\nfunc main() {}\n"), "package main\n\nfunc main() {}");
    /// ```
    pub fn compress(&self, formatted: &str) -> String {
        let mut s = match self {
            Language::Go => formatted.trim().to_owned(),
            _ => formatted.to_owned(),
        };
        while s.contains("\n\n\n") {
            s = s.replace("\n\n\n", "\n\n");
        }
        s
    }

    /// Class name used for syntax highlighting in note markup.
    pub fn highlight_class(&self) -> &'static str {
        use Language::*;
        match self {
            Python => "python",
            Go => "go",
            Node => "javascript",
            Ruby => "ruby",
            Rust => "rust",
        }
    }
}

static PYTHON: Recipe = Recipe {
    source_path: "/tmp/main.py",
    workdir: "/tmp",
    build: None,
    run: &["python", "/tmp/main.py"],
    env: &[("NO_COLOR", "true"), ("PYTHONWARNINGS", "ignore")],
    format: "python -m pip install --quiet ruff && ruff format /tmp/main.py",
};

static GO: Recipe = Recipe {
    source_path: "/tmp/main.go",
    workdir: "/tmp",
    build: Some(&["go", "build", "-o", "/tmp/main", "/tmp/main.go"]),
    run: &["/tmp/main"],
    env: &[],
    format: "go fmt /tmp/main.go",
};

static NODE: Recipe = Recipe {
    source_path: "/tmp/main.js",
    workdir: "/tmp",
    build: None,
    run: &["node", "/tmp/main.js"],
    env: &[("NO_COLOR", "1")],
    format: "npx --yes prettier --write /tmp/main.js",
};

static RUBY: Recipe = Recipe {
    source_path: "/tmp/main.rb",
    workdir: "/tmp",
    build: None,
    run: &["ruby", "/tmp/main.rb"],
    env: &[],
    format: "gem install --silent rubocop && rubocop -A /tmp/main.rb",
};

static RUST: Recipe = Recipe {
    source_path: "/tmp/main.rs",
    workdir: "/tmp",
    build: Some(&["rustc", "-o", "/tmp/main", "/tmp/main.rs"]),
    run: &["/tmp/main"],
    env: &[],
    format: "rustup component add rustfmt && rustfmt /tmp/main.rs",
};
