//! Post loader - turns one source file into a [`Post`]

use chrono::{Local, NaiveDate};
use indexmap::IndexMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::post::{normalize_url, DEFAULT_TITLE};
use super::{FrontMatter, MarkdownRenderer, Post};
use crate::config::MarkdownConfig;
use crate::error::{BuildError, MetadataError};

/// Loads single posts from disk
pub struct PostLoader {
    renderer: MarkdownRenderer,
    /// Date given to posts without one; fixed for the whole run
    today: NaiveDate,
}

impl PostLoader {
    /// Create a new post loader
    pub fn new(config: &MarkdownConfig) -> Self {
        Self {
            renderer: MarkdownRenderer::with_config(config),
            today: Local::now().date_naive(),
        }
    }

    /// Override the fallback date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Load a single post from a file
    pub fn load(&self, path: &Path) -> Result<Post, BuildError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BuildError::SourceNotFound(path.to_path_buf()),
            _ => BuildError::io(path, e),
        })?;

        let metadata_error = |source| BuildError::Metadata {
            path: path.to_path_buf(),
            source,
        };
        let (fm, body) = FrontMatter::parse(&content).map_err(metadata_error)?;
        let date = fm.parse_date().map_err(metadata_error)?.unwrap_or(self.today);

        let title = fm.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let mut post = Post::new(title, date, path.to_path_buf());
        if let Some(description) = fm.description {
            post.description = description;
        }
        post.author = fm.author;
        post.tags = fm.tags.into_iter().collect();
        post.keywords = fm.keywords;
        post.url = fm.url.as_deref().map(normalize_url).unwrap_or_default();
        post.body = self.renderer.render(body);
        post.extra = template_values(fm.extra).map_err(metadata_error)?;

        tracing::debug!(
            "Loaded post {:?}: title={:?} date={} url={:?} tags={:?}",
            path,
            post.title,
            post.date,
            post.url,
            post.tags
        );

        Ok(post)
    }
}

/// Convert unknown metadata keys to template values, key by key
fn template_values(
    extra: IndexMap<String, serde_yaml::Value>,
) -> Result<serde_json::Map<String, serde_json::Value>, MetadataError> {
    extra
        .into_iter()
        .map(|(key, value)| match serde_json::to_value(&value) {
            Ok(value) => Ok((key, value)),
            Err(source) => Err(MetadataError::Unrepresentable { key, source }),
        })
        .collect()
}

/// Check if a file is a markdown file
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
