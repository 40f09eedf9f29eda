//! Build configuration (_config.yml / _config.toml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Main build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    // Directories
    pub templates_directory: PathBuf,
    pub template: String,
    pub static_pages_directory: PathBuf,
    pub posts_directory: PathBuf,

    // Rendering
    pub post_template_file: String,
    pub render_posts: bool,
    pub markdown: MarkdownConfig,

    /// Extra bindings merged into every template context
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            templates_directory: PathBuf::from("./templates"),
            template: "pear".to_string(),
            static_pages_directory: PathBuf::from("./pages"),
            posts_directory: PathBuf::from("./posts"),

            post_template_file: "post.html".to_string(),
            render_posts: true,
            markdown: MarkdownConfig::default(),

            context: serde_json::Map::new(),
        }
    }
}

impl BuildConfig {
    /// Load configuration from a file, picking the format by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let config = if is_toml {
            toml::from_str::<BuildConfig>(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };

        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse YAML configuration. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Check values the schema alone cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.template.trim().is_empty() {
            return Err(ConfigError::Invalid("`template` must not be empty".to_string()));
        }

        let post_template = Path::new(&self.post_template_file);
        let is_bare_name = post_template.file_name().and_then(|n| n.to_str())
            == Some(self.post_template_file.as_str());
        if !is_bare_name {
            return Err(ConfigError::Invalid(format!(
                "`post_template_file` must be a file name, got {:?}",
                self.post_template_file
            )));
        }

        Ok(())
    }

    /// Theme directory, relative to the config's base directory
    pub fn theme_path(&self) -> PathBuf {
        self.templates_directory.join(&self.template)
    }
}

/// Markdown rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Syntax-highlight fenced code blocks
    pub highlight: bool,
    /// syntect theme name
    pub highlight_theme: String,
    pub line_numbers: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            highlight_theme: "base16-ocean.dark".to_string(),
            line_numbers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BuildConfig::default();
        assert_eq!(config.templates_directory, PathBuf::from("./templates"));
        assert_eq!(config.template, "pear");
        assert_eq!(config.static_pages_directory, PathBuf::from("./pages"));
        assert_eq!(config.posts_directory, PathBuf::from("./posts"));
        assert_eq!(config.post_template_file, "post.html");
        assert!(config.render_posts);
        assert!(config.context.is_empty());
        assert_eq!(
            config.theme_path(),
            PathBuf::from("./templates").join("pear")
        );
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
template: plum
posts_directory: content/posts
render_posts: false
context:
  site_title: My Blog
  year: 2024
"#;
        let config = BuildConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.template, "plum");
        assert_eq!(config.posts_directory, PathBuf::from("content/posts"));
        assert!(!config.render_posts);
        assert_eq!(config.context["site_title"], "My Blog");
        assert_eq!(config.context["year"], 2024);
        // untouched keys keep their defaults
        assert_eq!(config.post_template_file, "post.html");
    }

    #[test]
    fn test_context_keeps_key_order() {
        let yaml = "context:\n  zeta: 1\n  alpha: 2\n  mid: 3\n";
        let config = BuildConfig::from_yaml(yaml).unwrap();
        let keys: Vec<_> = config.context.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let yaml = "templates_dir: ./themes\n";
        assert!(BuildConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let yaml = "render_posts: sometimes\n";
        assert!(BuildConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(BuildConfig::from_yaml("\n").unwrap(), BuildConfig::default());
    }

    #[test]
    fn test_post_template_must_be_file_name() {
        let config = BuildConfig {
            post_template_file: "layouts/post.html".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = BuildConfig {
            post_template_file: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_toml_and_yaml_files() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("_config.toml");
        fs::write(
            &toml_path,
            "template = \"fig\"\n[markdown]\nline_numbers = true\n[context]\nauthor = \"Sam\"\n",
        )
        .unwrap();
        let config = BuildConfig::load(&toml_path).unwrap();
        assert_eq!(config.template, "fig");
        assert!(config.markdown.line_numbers);
        assert_eq!(config.context["author"], "Sam");

        let yaml_path = dir.path().join("_config.yml");
        fs::write(&yaml_path, "template: [not, a, string]\n").unwrap();
        assert!(matches!(
            BuildConfig::load(&yaml_path),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yml");
        assert!(matches!(
            BuildConfig::load(&missing),
            Err(ConfigError::NotFound(path)) if path == missing
        ));
    }
}
