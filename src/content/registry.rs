//! Post registry - the date-ordered, linked sequence of every post
//!
//! The registry owns all [`Post`]s. Neighbour links are plain indices into
//! that sequence, so `posts()[post.previous?]` is the next-older post.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::loader::{is_markdown_file, PostLoader};
use super::Post;
use crate::error::BuildError;

/// Ordered collection of posts, oldest first
#[derive(Debug, Clone, Default)]
pub struct PostRegistry {
    posts: Vec<Post>,
}

impl PostRegistry {
    /// Discover and load every post below `posts_dir`
    pub fn load(posts_dir: &Path, loader: &PostLoader) -> Result<Self, BuildError> {
        if !posts_dir.is_dir() {
            return Err(BuildError::SourceNotFound(posts_dir.to_path_buf()));
        }

        let sources = discover(posts_dir)?;
        let posts = sources
            .iter()
            .map(|path| loader.load(path))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Loaded {} posts from {:?}", posts.len(), posts_dir);
        Ok(Self::from_posts(posts))
    }

    /// Order posts by date and link neighbours.
    ///
    /// `posts` must be in discovery order; posts sharing a date keep it.
    pub fn from_posts(mut posts: Vec<Post>) -> Self {
        posts.sort_by_key(|post| post.date);

        let len = posts.len();
        for (index, post) in posts.iter_mut().enumerate() {
            post.id = index;
            post.previous = index.checked_sub(1);
            post.next = (index + 1 < len).then_some(index + 1);
        }

        Self { posts }
    }

    /// All posts, oldest first
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn get(&self, id: usize) -> Option<&Post> {
        self.posts.get(id)
    }

    /// The next-older post
    pub fn previous(&self, post: &Post) -> Option<&Post> {
        post.previous.and_then(|id| self.get(id))
    }

    /// The next-newer post
    pub fn next(&self, post: &Post) -> Option<&Post> {
        post.next.and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl<'a> IntoIterator for &'a PostRegistry {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Markdown files below `dir`, in lexicographic path order
fn discover(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::walk(dir, e))?;
        if entry.file_type().is_file() && is_markdown_file(entry.path()) {
            sources.push(entry.into_path());
        }
    }

    sources.sort();
    Ok(sources)
}
