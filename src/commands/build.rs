//! Build the site: load → clean → scaffold → static pages → post pages

use std::time::{Duration, Instant};

use crate::content::{PostLoader, PostRegistry};
use crate::error::{BuildError, Stage, StageError};
use crate::generator::{validate_post_urls, Generator};
use crate::Pear;

/// What a successful build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub posts: usize,
    pub static_pages: usize,
    pub post_pages: usize,
    pub elapsed: Duration,
}

/// Tag errors from one stage
fn at(stage: Stage) -> impl Fn(BuildError) -> StageError {
    move |source| {
        tracing::debug!("{} stage failed", stage);
        StageError::new(stage, source)
    }
}

/// Run the full build. The first failing stage aborts the rest; whatever was
/// already written stays on disk.
pub fn run(pear: &Pear) -> Result<BuildReport, StageError> {
    let start = Instant::now();

    // Everything that can be checked without touching the output happens
    // first, so a bad post leaves the previous build in place
    let loader = PostLoader::new(&pear.config.markdown);
    let registry = PostRegistry::load(&pear.posts_dir, &loader).map_err(at(Stage::Load))?;
    if pear.config.render_posts {
        validate_post_urls(registry.posts())
            .map_err(BuildError::from)
            .map_err(at(Stage::Load))?;
    }

    super::clean::run(pear).map_err(at(Stage::Clean))?;

    let generator = Generator::new(pear);
    generator.scaffold().map_err(at(Stage::Scaffold))?;

    let templates = generator
        .load_templates()
        .map_err(at(Stage::StaticPages))?;
    let static_pages = generator
        .render_static_pages(&templates, &registry)
        .map_err(at(Stage::StaticPages))?;

    let post_pages = if pear.config.render_posts {
        generator
            .render_post_pages(&templates, &registry)
            .map_err(at(Stage::PostPages))?
    } else {
        tracing::info!("Post rendering disabled, skipping post pages");
        0
    };

    let report = BuildReport {
        posts: registry.len(),
        static_pages,
        post_pages,
        elapsed: start.elapsed(),
    };
    tracing::info!(
        "Built {} posts, {} static pages, {} post pages in {:.2}s",
        report.posts,
        report.static_pages,
        report.post_pages,
        report.elapsed.as_secs_f64()
    );

    Ok(report)
}
