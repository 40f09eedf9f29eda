//! Post model

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::Serialize;
use std::path::PathBuf;

/// Title used when the front-matter has none
pub const DEFAULT_TITLE: &str = "Untitled";

/// Description used when the front-matter has none
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// Position in the date-ordered sequence, oldest first
    pub id: usize,

    /// Post title
    pub title: String,

    /// Short summary shown in listings
    pub description: String,

    /// Publication date
    pub date: NaiveDate,

    /// Post author
    pub author: Option<String>,

    /// Post tags, first occurrence wins
    pub tags: IndexSet<String>,

    /// Post keywords
    pub keywords: Vec<String>,

    /// Output path below the output root, without surrounding slashes.
    /// Empty if the post did not set one.
    pub url: String,

    /// Rendered HTML content
    pub body: String,

    /// Source file path
    pub source: PathBuf,

    /// Index of the next-older post
    pub previous: Option<usize>,

    /// Index of the next-newer post
    pub next: Option<usize>,

    /// Custom front-matter fields
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: NaiveDate, source: PathBuf) -> Self {
        Self {
            id: 0,
            title,
            description: DEFAULT_DESCRIPTION.to_string(),
            date,
            author: None,
            tags: IndexSet::new(),
            keywords: Vec::new(),
            url: String::new(),
            body: String::new(),
            source,
            previous: None,
            next: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Strip whitespace and surrounding slashes from a front-matter url
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_matches('/').to_string()
}
