//! Error types for the build pipeline

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in config {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid TOML in config {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Front-matter errors in a single source document
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("malformed metadata block: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unrecognised date {0:?}")]
    InvalidDate(String),

    #[error("metadata key {key:?} cannot be passed to templates: {source}")]
    Unrepresentable {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Problems with the output location of a post
#[derive(Error, Debug)]
pub enum OutputError {
    #[error(
        "Posts {} and {} both resolve to url {url:?}",
        .first.display(),
        .second.display()
    )]
    Collision {
        url: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Post {} has no url", .post.display())]
    MissingUrl { post: PathBuf },

    #[error("Post {} has url {url:?} outside the output root", .post.display())]
    InvalidUrl { url: String, post: PathBuf },
}

/// Any failure while building the site
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to parse metadata in {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },

    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Theme directory not found: {}", .0.display())]
    ThemeNotFound(PathBuf),

    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Failed to render template {name}: {message}")]
    Template { name: String, message: String },

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert a directory-walk failure under `root`
    pub fn walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        Self::Io {
            path,
            source: err.into(),
        }
    }
}

/// A build stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Clean,
    Scaffold,
    StaticPages,
    PostPages,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Clean => "clean",
            Stage::Scaffold => "scaffold",
            Stage::StaticPages => "static pages",
            Stage::PostPages => "post pages",
        };
        f.write_str(name)
    }
}

/// A build failure tagged with the stage that produced it
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: BuildError,
}

impl StageError {
    pub fn new(stage: Stage, source: BuildError) -> Self {
        Self { stage, source }
    }
}
