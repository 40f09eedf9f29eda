//! pear-rs: a small static blog builder
//!
//! Posts are Markdown files with a YAML metadata block. A build copies the
//! chosen theme to the output directory, renders every theme template with
//! the full post list, then renders one page per post from the post template.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod templates;

use std::path::{Component, Path, PathBuf};

pub use commands::BuildReport;
pub use config::BuildConfig;
pub use error::{BuildError, ConfigError, StageError};

/// Configuration file looked up in the base directory
pub const DEFAULT_CONFIG: &str = "_config.yml";

/// The main application: a configuration plus the directories it resolves to
#[derive(Debug, Clone)]
pub struct Pear {
    /// Build configuration
    pub config: BuildConfig,
    /// Directory relative paths in the configuration are resolved against
    pub base_dir: PathBuf,
    /// Markdown sources
    pub posts_dir: PathBuf,
    /// Output root
    pub output_dir: PathBuf,
    /// Selected theme (`templates_directory/template`)
    pub theme_dir: PathBuf,
}

impl Pear {
    /// Create a new instance from a directory, reading `_config.yml` there
    /// when it exists
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, ConfigError> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join(DEFAULT_CONFIG);

        let config = if config_path.exists() {
            BuildConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", DEFAULT_CONFIG, base_dir);
            BuildConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Create a new instance from an explicit configuration file. Paths are
    /// resolved against the file's directory.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = BuildConfig::load(path)?;
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self::with_config(base_dir, config)
    }

    /// Create a new instance from an in-memory configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: BuildConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = resolve(&base_dir, &config.posts_directory);
        let output_dir = resolve(&base_dir, &config.static_pages_directory);
        let theme_dir = resolve(&base_dir, &config.theme_path());

        Ok(Self {
            config,
            base_dir,
            posts_dir,
            output_dir,
            theme_dir,
        })
    }

    /// Build the site
    pub fn build(&self) -> Result<BuildReport, StageError> {
        commands::build::run(self)
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<(), BuildError> {
        commands::clean::run(self)
    }
}

/// Join a configured path onto the base directory, dropping `.` components
fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let mut resolved = base.to_path_buf();
    for component in path.components() {
        if component != Component::CurDir {
            resolved.push(component);
        }
    }
    resolved
}
