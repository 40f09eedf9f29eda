//! Configuration module

mod site;

pub use site::BuildConfig;
pub use site::MarkdownConfig;
