//! Generator module - builds the output tree from the theme and the posts
//!
//! Three steps, run in order by the build command:
//! 1. [`Generator::scaffold`] copies the theme directory to the output root.
//! 2. [`Generator::render_static_pages`] renders every theme template in place,
//!    except the post template.
//! 3. [`Generator::render_post_pages`] renders the post template once per post
//!    into `<output>/<url>/index.html`.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::content::{Post, PostRegistry};
use crate::error::{BuildError, OutputError};
use crate::templates::{Bindings, PostData, TemplateRenderer, POSTS_KEY, POST_KEY};
use crate::Pear;

/// Extension of theme files that are rendered as templates
pub const TEMPLATE_EXTENSION: &str = "html";

/// File written inside each post's directory
pub const POST_PAGE_FILE: &str = "index.html";

/// A template read from the output tree
struct ThemeTemplate {
    /// Name relative to the output root, `/`-separated
    name: String,
    path: PathBuf,
}

/// Theme templates, read before anything is rendered
pub struct ThemeTemplates {
    renderer: TemplateRenderer,
    templates: Vec<ThemeTemplate>,
}

impl ThemeTemplates {
    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Static site generator using Tera templates
pub struct Generator<'a> {
    pear: &'a Pear,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(pear: &'a Pear) -> Self {
        Self { pear }
    }

    /// Copy the theme directory to the output root. Returns the number of
    /// files copied.
    ///
    /// An existing output root is left alone: the copy is skipped with a
    /// warning.
    pub fn scaffold(&self) -> Result<usize, BuildError> {
        let theme_dir = &self.pear.theme_dir;
        let output_dir = &self.pear.output_dir;

        if !theme_dir.is_dir() {
            return Err(BuildError::ThemeNotFound(theme_dir.clone()));
        }

        if output_dir.exists() {
            tracing::warn!(
                "Output directory {:?} already exists, skipping theme copy",
                output_dir
            );
            return Ok(0);
        }

        let copied = copy_tree(theme_dir, output_dir)?;
        tracing::info!("Copied {} theme files to {:?}", copied, output_dir);
        Ok(copied)
    }

    /// Read and register every template in the output tree
    pub fn load_templates(&self) -> Result<ThemeTemplates, BuildError> {
        let output_dir = &self.pear.output_dir;
        let mut sources = Vec::new();
        let mut templates = Vec::new();

        for entry in WalkDir::new(output_dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| BuildError::walk(output_dir, e))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_template(path) {
                continue;
            }

            let Some(name) = template_name(output_dir, path) else {
                continue;
            };
            let source = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
            tracing::debug!("Registered template {}", name);

            sources.push((name.clone(), source));
            templates.push(ThemeTemplate {
                name,
                path: path.to_path_buf(),
            });
        }

        let renderer = TemplateRenderer::from_sources(sources)?;
        Ok(ThemeTemplates {
            renderer,
            templates,
        })
    }

    /// Render every template except the post template in place, with the
    /// full post list bound as `posts`. Returns the number of pages written.
    pub fn render_static_pages(
        &self,
        templates: &ThemeTemplates,
        registry: &PostRegistry,
    ) -> Result<usize, BuildError> {
        let post_template = self.pear.config.post_template_file.as_str();
        let posts = PostData::all(registry);
        let bindings = Bindings::new(&self.pear.config.context, POSTS_KEY);

        // Render everything first so no template sees another's output
        let mut rendered = Vec::new();
        for template in &templates.templates {
            let is_post_template = template
                .path
                .file_name()
                .map(|n| n == post_template)
                .unwrap_or(false);
            if is_post_template {
                continue;
            }

            let context = bindings.with(POSTS_KEY, &posts);
            let html = templates.renderer.render(&template.name, &context)?;
            rendered.push((&template.path, html));
        }

        for (path, html) in &rendered {
            fs::write(path, html).map_err(|e| BuildError::io(*path, e))?;
            tracing::debug!("Generated: {:?}", path);
        }

        tracing::info!("Rendered {} static pages", rendered.len());
        Ok(rendered.len())
    }

    /// Render one page per post at `<output>/<url>/index.html`.
    /// Returns the number of pages written.
    ///
    /// Every url is validated before the first page is written.
    pub fn render_post_pages(
        &self,
        templates: &ThemeTemplates,
        registry: &PostRegistry,
    ) -> Result<usize, BuildError> {
        validate_post_urls(registry.posts())?;

        let post_template = self.pear.config.post_template_file.as_str();
        if !templates.renderer.has_template(post_template) {
            return Err(BuildError::TemplateNotFound(
                self.pear.output_dir.join(post_template),
            ));
        }

        let bindings = Bindings::new(&self.pear.config.context, POST_KEY);

        for post in registry {
            let context = bindings.with(POST_KEY, &PostData::new(post, registry));
            let html = templates.renderer.render(post_template, &context)?;

            let output_path = self.post_output_path(post);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
            }
            fs::write(&output_path, &html).map_err(|e| BuildError::io(&output_path, e))?;
            tracing::debug!("Generated post: {:?}", output_path);
        }

        tracing::info!("Rendered {} post pages", registry.len());
        Ok(registry.len())
    }

    /// Where a post's page is written
    pub fn post_output_path(&self, post: &Post) -> PathBuf {
        self.pear.output_dir.join(&post.url).join(POST_PAGE_FILE)
    }
}

/// Check that every post has a url of its own inside the output root
pub fn validate_post_urls(posts: &[Post]) -> Result<(), OutputError> {
    let mut seen: HashMap<String, &Path> = HashMap::new();

    for post in posts {
        if post.url.is_empty() {
            return Err(OutputError::MissingUrl {
                post: post.source.clone(),
            });
        }

        // Components drop repeated separators and inner `.`, so `a//b`
        // and `a/./b` key the same page as `a/b`
        let mut target = Vec::new();
        for component in Path::new(&post.url).components() {
            match component {
                Component::Normal(part) => target.push(part.to_string_lossy()),
                _ => {
                    return Err(OutputError::InvalidUrl {
                        url: post.url.clone(),
                        post: post.source.clone(),
                    })
                }
            }
        }

        if let Some(first) = seen.insert(target.join("/"), &post.source) {
            return Err(OutputError::Collision {
                url: post.url.clone(),
                first: first.to_path_buf(),
                second: post.source.clone(),
            });
        }
    }

    Ok(())
}

/// Recursively copy `from` into `to`, creating `to`. Returns the file count.
fn copy_tree(from: &Path, to: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;

    for entry in WalkDir::new(from).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::walk(from, e))?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let dest = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| BuildError::io(&dest, e))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| BuildError::io(entry.path(), e))?;
            tracing::debug!("Copied: {:?} -> {:?}", entry.path(), dest);
            copied += 1;
        }
    }

    Ok(copied)
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == TEMPLATE_EXTENSION)
        .unwrap_or(false)
}

/// `/`-separated path of `path` below `root`
fn template_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use chrono::NaiveDate;

    fn post(title: &str, day: u32, url: &str) -> Post {
        let mut post = Post::new(
            title.to_string(),
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            PathBuf::from(format!("posts/{}.md", title)),
        );
        post.url = url.to_string();
        post.body = format!("<p>{} body</p>", title);
        post
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// A site dir with a theme holding index, post and a nested page
    fn site() -> (tempfile::TempDir, Pear) {
        let dir = tempfile::tempdir().unwrap();
        let theme = dir.path().join("templates/pear");
        write(
            &theme.join("index.html"),
            "{% for p in posts %}[{{ p.title }}]{% endfor %}",
        );
        write(
            &theme.join("post.html"),
            "<h1>{{ post.title }}</h1>{{ post.body }}{% if post.previous %}<a href=\"/{{ post.previous.url }}\">prev</a>{% endif %}{% if post.next %}<a href=\"/{{ post.next.url }}\">next</a>{% endif %}",
        );
        write(&theme.join("about/index.html"), "{{ owner }} has {{ posts | length }} posts");
        write(&theme.join("static/js/script.js"), "console.log('{{ untouched }}');");

        let mut config = BuildConfig::default();
        config
            .context
            .insert("owner".to_string(), serde_json::Value::from("Sam"));
        let pear = Pear::with_config(dir.path(), config).unwrap();
        (dir, pear)
    }

    #[test]
    fn test_scaffold_copies_theme() {
        let (_dir, pear) = site();
        let generator = Generator::new(&pear);

        assert_eq!(generator.scaffold().unwrap(), 4);
        assert!(pear.output_dir.join("index.html").is_file());
        assert!(pear.output_dir.join("static/js/script.js").is_file());
    }

    #[test]
    fn test_scaffold_skips_existing_output() {
        let (_dir, pear) = site();
        fs::create_dir_all(&pear.output_dir).unwrap();

        assert_eq!(Generator::new(&pear).scaffold().unwrap(), 0);
        assert!(!pear.output_dir.join("index.html").exists());
    }

    #[test]
    fn test_scaffold_without_theme() {
        let (_dir, pear) = site();
        fs::remove_dir_all(&pear.theme_dir).unwrap();

        assert!(matches!(
            Generator::new(&pear).scaffold(),
            Err(BuildError::ThemeNotFound(path)) if path == pear.theme_dir
        ));
        assert!(!pear.output_dir.exists());
    }

    #[test]
    fn test_render_static_pages() {
        let (_dir, pear) = site();
        let generator = Generator::new(&pear);
        generator.scaffold().unwrap();

        let registry = PostRegistry::from_posts(vec![post("b", 2, "b"), post("a", 1, "a")]);
        let templates = generator.load_templates().unwrap();
        assert_eq!(templates.len(), 3);
        assert_eq!(generator.render_static_pages(&templates, &registry).unwrap(), 2);

        let index = fs::read_to_string(pear.output_dir.join("index.html")).unwrap();
        assert_eq!(index, "[a][b]");
        let about = fs::read_to_string(pear.output_dir.join("about/index.html")).unwrap();
        assert_eq!(about, "Sam has 2 posts");

        // the post template and non-templates are copied verbatim
        let post_template = fs::read_to_string(pear.output_dir.join("post.html")).unwrap();
        assert!(post_template.contains("{{ post.title }}"));
        let script = fs::read_to_string(pear.output_dir.join("static/js/script.js")).unwrap();
        assert!(script.contains("{{ untouched }}"));
    }

    #[test]
    fn test_render_post_pages() {
        let (_dir, pear) = site();
        let generator = Generator::new(&pear);
        generator.scaffold().unwrap();

        let registry = PostRegistry::from_posts(vec![
            post("jan", 1, "2024/jan"),
            post("feb", 2, "feb"),
            post("mar", 3, "mar/"),
        ]);
        let templates = generator.load_templates().unwrap();
        assert_eq!(generator.render_post_pages(&templates, &registry).unwrap(), 3);

        let jan = fs::read_to_string(pear.output_dir.join("2024/jan/index.html")).unwrap();
        assert_eq!(jan, "<h1>jan</h1><p>jan body</p><a href=\"/feb\">next</a>");
        let feb = fs::read_to_string(pear.output_dir.join("feb/index.html")).unwrap();
        assert!(feb.contains("<a href=\"/2024/jan\">prev</a>"));
        assert!(feb.contains("<a href=\"/mar/\">next</a>"));
    }

    #[test]
    fn test_missing_post_template() {
        let (_dir, pear) = site();
        fs::remove_file(pear.theme_dir.join("post.html")).unwrap();
        let generator = Generator::new(&pear);
        generator.scaffold().unwrap();

        let registry = PostRegistry::from_posts(vec![post("a", 1, "a")]);
        let templates = generator.load_templates().unwrap();
        assert!(matches!(
            generator.render_post_pages(&templates, &registry),
            Err(BuildError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_collision_detected_before_writing() {
        let (_dir, pear) = site();
        let generator = Generator::new(&pear);
        generator.scaffold().unwrap();

        let registry = PostRegistry::from_posts(vec![
            post("first", 1, "same"),
            post("other", 2, "fine"),
            post("second", 3, "same"),
        ]);
        let templates = generator.load_templates().unwrap();

        match generator.render_post_pages(&templates, &registry) {
            Err(BuildError::Output(OutputError::Collision { url, first, second })) => {
                assert_eq!(url, "same");
                assert_eq!(first, PathBuf::from("posts/first.md"));
                assert_eq!(second, PathBuf::from("posts/second.md"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!pear.output_dir.join("same").exists());
        assert!(!pear.output_dir.join("fine").exists());
    }

    #[test]
    fn test_empty_url_never_overwrites_root_index() {
        let (_dir, pear) = site();
        let generator = Generator::new(&pear);
        generator.scaffold().unwrap();

        let registry = PostRegistry::from_posts(vec![post("nourl", 1, "")]);
        let templates = generator.load_templates().unwrap();

        assert!(matches!(
            generator.render_post_pages(&templates, &registry),
            Err(BuildError::Output(OutputError::MissingUrl { .. }))
        ));
        let index = fs::read_to_string(pear.output_dir.join("index.html")).unwrap();
        assert!(index.contains("{% for p in posts %}"));
    }

    #[test]
    fn test_validate_rejects_escaping_urls() {
        for url in ["../outside", "a/../../b", "./here"] {
            let posts = vec![post("x", 1, url)];
            assert!(
                matches!(
                    validate_post_urls(&posts),
                    Err(OutputError::InvalidUrl { .. })
                ),
                "{} accepted",
                url
            );
        }
        assert!(validate_post_urls(&[post("x", 1, "2024/01/x")]).is_ok());
    }

    #[test]
    fn test_validate_compares_output_paths() {
        for (a, b) in [("a/b", "a//b"), ("a/b", "a/./b"), ("2024/hello", "2024///hello")] {
            let posts = vec![post("first", 1, a), post("second", 2, b)];
            match validate_post_urls(&posts) {
                Err(OutputError::Collision { url, first, .. }) => {
                    assert_eq!(url, b);
                    assert_eq!(first, PathBuf::from("posts/first.md"));
                }
                other => panic!("{} and {} not flagged: {:?}", a, b, other),
            }
        }
        assert!(validate_post_urls(&[post("first", 1, "a/b"), post("second", 2, "a/bb")]).is_ok());
    }

    #[test]
    fn test_template_name() {
        let root = Path::new("/out");
        assert_eq!(
            template_name(root, Path::new("/out/blog/list.html")).as_deref(),
            Some("blog/list.html")
        );
        assert_eq!(template_name(root, Path::new("/elsewhere/x.html")), None);
    }
}
