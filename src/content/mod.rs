//! Content module - handles posts and content processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod registry;

pub use frontmatter::FrontMatter;
pub use loader::PostLoader;
pub use markdown::MarkdownRenderer;
pub use post::{normalize_url, Post, DEFAULT_DESCRIPTION, DEFAULT_TITLE};
pub use registry::PostRegistry;
