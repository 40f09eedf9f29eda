//! Theme templates rendered with the Tera template engine
//!
//! Every template of the theme is registered under its path relative to the
//! theme root (`index.html`, `blog/archive.html`, ...), so templates can
//! `extends` and `include` each other by that name.

use serde::Serialize;
use std::collections::HashMap;
use std::error::Error as _;
use tera::{Context, Tera};

use crate::content::{Post, PostRegistry};
use crate::error::BuildError;
use crate::helpers::{format_date, LONG_DATE};

/// Binding names reserved for the build itself
pub const POST_KEY: &str = "post";
pub const POSTS_KEY: &str = "posts";

/// Template renderer holding every theme template
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Register templates given as (name, source) pairs
    pub fn from_sources<I>(templates: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut tera = Tera::default();

        // Bodies are already HTML; nothing in a binding should be escaped
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(templates)
            .map_err(|e| template_error("theme", &e))?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Whether a template with this name was registered
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template with given context
    pub fn render(&self, name: &str, context: &Context) -> Result<String, BuildError> {
        self.tera
            .render(name, context)
            .map_err(|e| template_error(name, &e))
    }
}

/// Flatten a Tera error chain; the outer message alone rarely says what broke
fn template_error(name: &str, err: &tera::Error) -> BuildError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    BuildError::Template {
        name: name.to_string(),
        message,
    }
}

/// Global bindings shared by every render of one pass
pub struct Bindings {
    base: Context,
}

impl Bindings {
    /// Start from the configured context. `reserved` is the key the pass will
    /// bind itself; a context entry of that name is shadowed.
    pub fn new(globals: &serde_json::Map<String, serde_json::Value>, reserved: &str) -> Self {
        if globals.contains_key(reserved) {
            tracing::warn!(
                "Context key {:?} is shadowed by the built-in binding of the same name",
                reserved
            );
        }

        let mut base = Context::new();
        for (key, value) in globals {
            base.insert(key.as_str(), value);
        }
        Self { base }
    }

    /// Context for one render: globals plus `key = value`
    pub fn with<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Context {
        let mut context = self.base.clone();
        context.insert(key, value);
        context
    }
}

// Data structures for template context

/// Template view of a post
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub id: usize,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// e.g. `January 05, 2024`
    pub display_date: String,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub url: String,
    pub body: String,
    pub source: String,
    pub previous: Option<NavPost>,
    pub next: Option<NavPost>,
    pub extra: serde_json::Value,
}

impl PostData {
    pub fn new(post: &Post, registry: &PostRegistry) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            description: post.description.clone(),
            date: post.date.format("%Y-%m-%d").to_string(),
            display_date: post.date.format(LONG_DATE).to_string(),
            author: post.author.clone(),
            tags: post.tags.iter().cloned().collect(),
            keywords: post.keywords.clone(),
            url: post.url.clone(),
            body: post.body.clone(),
            source: post.source.display().to_string(),
            previous: registry.previous(post).map(NavPost::from),
            next: registry.next(post).map(NavPost::from),
            extra: serde_json::Value::Object(post.extra.clone()),
        }
    }

    /// Views of every post in registry order
    pub fn all(registry: &PostRegistry) -> Vec<Self> {
        registry.iter().map(|post| Self::new(post, registry)).collect()
    }
}

/// Summary of a neighbouring post for prior/next navigation
#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub id: usize,
    pub title: String,
    pub url: String,
    pub date: String,
    pub display_date: String,
}

impl From<&Post> for NavPost {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            url: post.url.clone(),
            date: post.date.format("%Y-%m-%d").to_string(),
            display_date: post.date.format(LONG_DATE).to_string(),
        }
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => " .....".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: reformat a `YYYY-MM-DD` date string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "LL".to_string(),
    };

    // Not a date we produced: pass through untouched
    let Some(date) = crate::helpers::parse_date(&s) else {
        return Ok(tera::Value::String(s));
    };

    format_date(date, &format)
        .map(tera::Value::String)
        .ok_or_else(|| tera::Error::msg(format!("date_format: invalid format {:?}", format)))
}
