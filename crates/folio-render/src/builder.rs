//! Static site export.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::assets::AssetPipeline;
use crate::pages::{Route, Site};

/// Configuration for exporting a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Output directory
    pub output_dir: PathBuf,

    /// Minify the stylesheet
    pub minify: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            minify: true,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of posts exported
    pub posts: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to render {path}: {message}")]
    RenderError { path: String, message: String },

    #[error("Failed to serialize post index: {0}")]
    SerializeError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Static site builder.
pub struct StaticBuilder {
    site: Site,
    config: BuildConfig,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(site: Site, config: BuildConfig) -> Self {
        Self { site, config }
    }

    /// Build the static site.
    ///
    /// Renders every static route in parallel, then writes the 404 page,
    /// stylesheet, post index, sitemap, and robots.txt.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let routes: Vec<Route> = self
            .site
            .static_routes()
            .into_iter()
            .filter(|route| match route {
                Route::Tag(tag) if !is_safe_segment(tag) => {
                    tracing::warn!("Skipping tag with unsafe path characters: {}", tag);
                    false
                }
                _ => true,
            })
            .collect();

        let results: Vec<Result<(), BuildError>> = routes
            .par_iter()
            .map(|route| self.build_route(route))
            .collect();

        for result in results {
            result?;
        }

        let posts = routes
            .iter()
            .filter(|r| matches!(r, Route::Post(_)))
            .count();

        self.generate_not_found()?;
        self.generate_assets()?;
        self.generate_post_index()?;
        self.generate_sitemap(&routes)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: routes.len(),
            posts,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    fn build_route(&self, route: &Route) -> Result<(), BuildError> {
        let page = self.site.render(route).map_err(|e| BuildError::RenderError {
            path: route.path(),
            message: e.to_string(),
        })?;

        let output_path = self.config.output_dir.join(route.file_path());
        write_file(&output_path, &page.html)?;

        tracing::debug!("Wrote {}", output_path.display());
        Ok(())
    }

    fn generate_not_found(&self) -> Result<(), BuildError> {
        let page = self
            .site
            .render_not_found("Page Not Found")
            .map_err(|e| BuildError::RenderError {
                path: "/404.html".to_string(),
                message: e.to_string(),
            })?;

        write_file(&self.config.output_dir.join("404.html"), &page.html)
    }

    fn generate_assets(&self) -> Result<(), BuildError> {
        let css = AssetPipeline::main_css(self.config.minify);
        write_file(&self.config.output_dir.join("assets").join("main.css"), &css)
    }

    /// Write `posts.json`, the collection as summaries.
    fn generate_post_index(&self) -> Result<(), BuildError> {
        let posts = self.site.store().get_all_posts();

        let json = serde_json::to_string_pretty(&posts)
            .map_err(|e| BuildError::SerializeError(e.to_string()))?;

        write_file(&self.config.output_dir.join("posts.json"), &json)
    }

    fn generate_sitemap(&self, routes: &[Route]) -> Result<(), BuildError> {
        let urls: Vec<String> = routes
            .iter()
            .map(|route| format!("  <url>\n    <loc>{}</loc>\n  </url>", self.site.url(route)))
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        write_file(&self.config.output_dir.join("sitemap.xml"), &sitemap)?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}sitemap.xml",
            self.site.config().base_url
        );
        write_file(&self.config.output_dir.join("robots.txt"), &robots)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }

    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

/// A tag can name an output directory.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.starts_with('.') && !segment.contains(['/', '\\', '\0'])
}
