//! Blog routes and page rendering.

use folio_content::{ContentStore, Post, PostSummary};

use crate::markdown::MarkdownRenderer;
use crate::templates::{Context, PostCard, PostView, TagLink, TemplateEngine};

/// Site-wide settings used by every page.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Site title
    pub title: String,

    /// Description of the blog listing
    pub description: String,

    /// Base URL links are generated under (always ends with `/`)
    pub base_url: String,

    /// Extra script URLs appended to every page
    pub scripts: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "DevLaunch".to_string(),
            description: "Technical articles and tutorials about web development".to_string(),
            base_url: "/".to_string(),
            scripts: vec![],
        }
    }
}

/// A renderable page of the blog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Listing of every post
    Index,
    /// A single post by slug
    Post(String),
    /// Posts carrying a tag
    Tag(String),
}

impl Route {
    /// Path of the route relative to the base URL, with a leading and
    /// trailing slash. Tags are lowercased; both parts are percent-encoded.
    pub fn path(&self) -> String {
        match self {
            Self::Index => "/blog/".to_string(),
            Self::Post(slug) => format!("/blog/{}/", urlencoding::encode(slug)),
            Self::Tag(tag) => format!("/blog/tags/{}/", urlencoding::encode(&tag.to_lowercase())),
        }
    }

    /// Output location of the route inside a static export, relative to the
    /// output directory. Segments are not percent-encoded.
    pub fn file_path(&self) -> String {
        match self {
            Self::Index => "blog/index.html".to_string(),
            Self::Post(slug) => format!("blog/{}/index.html", slug),
            Self::Tag(tag) => format!("blog/tags/{}/index.html", tag.to_lowercase()),
        }
    }
}

/// HTTP-level outcome of rendering a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    NotFound,
}

/// A rendered HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub status: PageStatus,
    pub title: String,
    pub html: String,
}

/// Errors that can occur when rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to render template {template}: {source}")]
    Template {
        template: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Renders blog routes from a content store.
///
/// Every call re-reads the store, so rendering a route twice picks up
/// content changes in between.
pub struct Site {
    store: ContentStore,
    renderer: MarkdownRenderer,
    templates: TemplateEngine,
    config: SiteConfig,
}

impl Site {
    pub fn new(store: ContentStore, mut config: SiteConfig) -> Self {
        if !config.base_url.ends_with('/') {
            config.base_url.push('/');
        }

        Self {
            store,
            renderer: MarkdownRenderer::new(),
            templates: TemplateEngine::new(),
            config,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Absolute URL path of a route under the base URL.
    pub fn url(&self, route: &Route) -> String {
        format!("{}{}", self.config.base_url, &route.path()[1..])
    }

    /// Every route known ahead of time: the listing, each post, each tag.
    pub fn static_routes(&self) -> Vec<Route> {
        let posts = self.store.get_all_posts();

        let mut routes = Vec::with_capacity(posts.len() + 1);
        routes.push(Route::Index);
        routes.extend(posts.into_iter().map(|p| Route::Post(p.slug)));
        routes.extend(self.store.tags().into_iter().map(|t| Route::Tag(t.tag)));
        routes
    }

    /// Render a route. Absent posts and unused tags render the not-found page.
    pub fn render(&self, route: &Route) -> Result<RenderedPage, RenderError> {
        match route {
            Route::Index => self.render_index(),
            Route::Post(slug) => match self.store.get_post_by_slug(slug) {
                Some(post) => self.render_post(&post),
                None => self.render_not_found("Post Not Found"),
            },
            Route::Tag(tag) => self.render_tag(tag),
        }
    }

    /// Render the blog listing, newest first.
    pub fn render_index(&self) -> Result<RenderedPage, RenderError> {
        let posts = self.store.get_all_posts();

        let ctx = Context {
            title: format!("Blog | {}", self.config.title),
            description: self.config.description.clone(),
            heading: "Blog".to_string(),
            subheading: self.config.description.clone(),
            posts: posts.iter().map(|p| self.card(p)).collect(),
            ..self.base_context()
        };

        self.page(PageStatus::Ok, "index.html", ctx)
    }

    /// Render the full view of a post.
    pub fn render_post(&self, post: &Post) -> Result<RenderedPage, RenderError> {
        let body = self.renderer.render(&post.content);

        let view = PostView {
            title: post.title.clone(),
            description: post.description.clone(),
            date_iso: post.date.to_iso_date(),
            date: post.date.format_long(),
            author: post.author.clone(),
            reading_time: post.reading_time.to_string(),
            tags: self.tag_links(&post.tags),
            content: body.html,
            toc: body.toc,
        };

        let ctx = Context {
            title: format!("{} | {} Blog", post.title, self.config.title),
            description: post.description.clone(),
            post: Some(view),
            ..self.base_context()
        };

        self.page(PageStatus::Ok, "post.html", ctx)
    }

    /// Render the listing of posts carrying `tag`.
    pub fn render_tag(&self, tag: &str) -> Result<RenderedPage, RenderError> {
        let posts = self.store.get_posts_by_tag(tag);

        // Show the tag as the posts spell it
        let wanted = tag.to_lowercase();
        let Some(display) = posts
            .iter()
            .flat_map(|p| p.tags.iter())
            .find(|t| t.to_lowercase() == wanted)
            .cloned()
        else {
            return self.render_not_found("Tag Not Found");
        };

        let ctx = Context {
            title: format!("Posts tagged {} | {}", display, self.config.title),
            description: format!("Articles tagged {}", display),
            heading: format!("Posts tagged \u{201c}{}\u{201d}", display),
            subheading: format!(
                "{} {}",
                posts.len(),
                if posts.len() == 1 { "post" } else { "posts" }
            ),
            posts: posts.iter().map(|p| self.card(p)).collect(),
            ..self.base_context()
        };

        self.page(PageStatus::Ok, "index.html", ctx)
    }

    /// Render a 404 page with the given heading.
    pub fn render_not_found(&self, heading: &str) -> Result<RenderedPage, RenderError> {
        let ctx = Context {
            title: heading.to_string(),
            heading: heading.to_string(),
            subheading: "The page you are looking for does not exist.".to_string(),
            ..self.base_context()
        };

        self.page(PageStatus::NotFound, "not_found.html", ctx)
    }

    fn base_context(&self) -> Context {
        Context {
            site_title: self.config.title.clone(),
            base_url: self.config.base_url.clone(),
            blog_url: self.url(&Route::Index),
            scripts: self.config.scripts.clone(),
            ..Default::default()
        }
    }

    fn page(
        &self,
        status: PageStatus,
        template: &'static str,
        ctx: Context,
    ) -> Result<RenderedPage, RenderError> {
        let html = self
            .templates
            .render_page(template, &ctx)
            .map_err(|source| RenderError::Template { template, source })?;

        Ok(RenderedPage {
            status,
            title: ctx.title,
            html,
        })
    }

    fn card(&self, post: &PostSummary) -> PostCard {
        PostCard {
            url: self.url(&Route::Post(post.slug.clone())),
            title: post.title.clone(),
            description: post.description.clone(),
            date_iso: post.date.to_iso_date(),
            date: post.date.format_short(),
            author: post.author.clone(),
            reading_time: post.reading_time.to_string(),
            tags: self.tag_links(&post.tags),
        }
    }

    fn tag_links(&self, tags: &[String]) -> Vec<TagLink> {
        tags.iter()
            .map(|tag| TagLink {
                name: tag.clone(),
                url: self.url(&Route::Tag(tag.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_post(dir: &Path, slug: &str, date: &str, tags: &str, body: &str) {
        fs::write(
            dir.join(format!("{}.mdx", slug)),
            format!(
                "---\ntitle: {slug} title\ndescription: About {slug}\ndate: {date}\nauthor: Jane\ntags: {tags}\n---\n{body}"
            ),
        )
        .unwrap();
    }

    fn site(dir: &Path) -> Site {
        Site::new(ContentStore::new(dir), SiteConfig::default())
    }

    #[test]
    fn route_paths() {
        assert_eq!(Route::Index.path(), "/blog/");
        assert_eq!(Route::Post("hello".into()).path(), "/blog/hello/");
        assert_eq!(Route::Tag("Dev Ops".into()).path(), "/blog/tags/dev%20ops/");
        assert_eq!(
            Route::Tag("Dev Ops".into()).file_path(),
            "blog/tags/dev ops/index.html"
        );
    }

    #[test]
    fn urls_respect_base_url() {
        let temp = tempdir().unwrap();
        let config = SiteConfig {
            base_url: "/docs".to_string(),
            ..Default::default()
        };
        let site = Site::new(ContentStore::new(temp.path()), config);

        assert_eq!(site.url(&Route::Index), "/docs/blog/");
        assert_eq!(site.url(&Route::Post("a".into())), "/docs/blog/a/");
    }

    #[test]
    fn renders_index_newest_first() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "a", "2024-01-01", "[x]", "Body A");
        write_post(temp.path(), "b", "2024-06-01", "[x, y]", "Body B");

        let page = site(temp.path()).render(&Route::Index).unwrap();

        assert_eq!(page.status, PageStatus::Ok);
        assert_eq!(page.title, "Blog | DevLaunch");
        let b = page.html.find("b title").unwrap();
        let a = page.html.find("a title").unwrap();
        assert!(b < a);
        assert!(page.html.contains("Jun 1, 2024"));
        assert!(!page.html.contains("Body A"));
    }

    #[test]
    fn empty_store_renders_empty_state() {
        let temp = tempdir().unwrap();
        let page = site(&temp.path().join("missing")).render(&Route::Index).unwrap();

        assert_eq!(page.status, PageStatus::Ok);
        assert!(page.html.contains("No posts yet"));
    }

    #[test]
    fn renders_post_page() {
        let temp = tempdir().unwrap();
        write_post(
            temp.path(),
            "hello",
            "2024-06-01",
            "[Rust]",
            "## Intro\n\n```rust\nlet x = 1;\n```\n",
        );

        let page = site(temp.path())
            .render(&Route::Post("hello".into()))
            .unwrap();

        assert_eq!(page.status, PageStatus::Ok);
        assert_eq!(page.title, "hello title | DevLaunch Blog");
        assert!(page.html.contains("June 1, 2024"));
        assert!(page.html.contains("1 min read"));
        assert!(page.html.contains(r#"href="/blog/tags/rust/">Rust</a>"#));
        assert!(page
            .html
            .contains(r##"<h2 id="intro"><a class="anchor" href="#intro">Intro</a></h2>"##));
        assert!(page.html.contains(r#"<span class="hljs-keyword">let</span>"#));
    }

    #[test]
    fn missing_post_is_not_found() {
        let temp = tempdir().unwrap();
        let page = site(temp.path())
            .render(&Route::Post("missing".into()))
            .unwrap();

        assert_eq!(page.status, PageStatus::NotFound);
        assert_eq!(page.title, "Post Not Found");
    }

    #[test]
    fn renders_tag_listing_case_insensitively() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "ops", "2024-01-01", "[DevOps]", "");
        write_post(temp.path(), "other", "2024-01-02", "[Rust]", "");

        let site = site(temp.path());
        let page = site.render(&Route::Tag("devops".into())).unwrap();

        assert_eq!(page.status, PageStatus::Ok);
        assert_eq!(page.title, "Posts tagged DevOps | DevLaunch");
        assert!(page.html.contains("ops title"));
        assert!(!page.html.contains("other title"));

        let missing = site.render(&Route::Tag("golang".into())).unwrap();
        assert_eq!(missing.status, PageStatus::NotFound);
    }

    #[test]
    fn static_routes_cover_posts_and_tags() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "a", "2024-01-01", "[x]", "");
        write_post(temp.path(), "b", "2024-06-01", "[x, y]", "");

        let routes = site(temp.path()).static_routes();

        assert_eq!(
            routes,
            vec![
                Route::Index,
                Route::Post("b".into()),
                Route::Post("a".into()),
                Route::Tag("x".into()),
                Route::Tag("y".into()),
            ]
        );
    }

    #[test]
    fn rendering_does_not_mutate_posts() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "a", "2024-01-01", "[x]", "# Heading\n");

        let site = site(temp.path());
        let post = site.store().get_post_by_slug("a").unwrap();
        let before = post.clone();

        let first = site.render_post(&post).unwrap();
        let second = site.render_post(&post).unwrap();

        assert_eq!(post, before);
        assert_eq!(first, second);
    }
}
