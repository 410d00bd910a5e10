//! Template engine for rendering blog pages.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::markdown::TocEntry;

/// A tag badge with its listing URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagLink {
    pub name: String,
    pub url: String,
}

/// A post as shown on a listing card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCard {
    pub url: String,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`, for `<time datetime>`
    pub date_iso: String,
    /// Human-readable date
    pub date: String,
    pub author: String,
    pub reading_time: String,
    pub tags: Vec<TagLink>,
}

/// A full post page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub title: String,
    pub description: String,
    pub date_iso: String,
    pub date: String,
    pub author: String,
    pub reading_time: String,
    pub tags: Vec<TagLink>,
    /// Rendered body HTML
    pub content: String,
    pub toc: Vec<TocEntry>,
}

/// Context for rendering a page template.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Context {
    /// `<title>` text
    pub title: String,
    /// Meta description
    pub description: String,
    /// Site title
    pub site_title: String,
    /// Base URL
    pub base_url: String,
    /// Blog listing URL
    pub blog_url: String,
    /// Listing heading
    pub heading: String,
    /// Listing subheading
    pub subheading: String,
    /// Listing cards
    pub posts: Vec<PostCard>,
    /// Post being displayed
    pub post: Option<PostView>,
    /// Extra script URLs to include
    pub scripts: Vec<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("index.html", INDEX_TEMPLATE),
            ("post.html", POST_TEMPLATE),
            ("not_found.html", NOT_FOUND_TEMPLATE),
        ] {
            env.add_template(name, source)
                .expect("Built-in template must parse");
        }

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(&self, template: &str, ctx: &Context) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            title => &ctx.title,
            description => &ctx.description,
            site_title => &ctx.site_title,
            base_url => &ctx.base_url,
            blog_url => &ctx.blog_url,
            heading => &ctx.heading,
            subheading => &ctx.subheading,
            posts => &ctx.posts,
            post => &ctx.post,
            scripts => &ctx.scripts,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  {% endif %}<link rel="stylesheet" href="{{ base_url | safe }}assets/main.css">
</head>
<body>
  <header class="site-header">
    <a href="{{ blog_url | safe }}" class="site-title">{{ site_title }}</a>
  </header>
  <main class="container">
    {% block content %}{% endblock %}
  </main>
  {% for src in scripts %}<script src="{{ src | safe }}"></script>
  {% endfor %}
</body>
</html>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<div class="page-header">
  <h1>{{ heading }}</h1>
  {% if subheading %}<p class="muted">{{ subheading }}</p>{% endif %}
</div>

{% if posts %}
<div class="post-grid">
  {% for post in posts %}
  <article class="card">
    <div class="tags">
      {% for tag in post.tags %}<a class="badge" href="{{ tag.url | safe }}">{{ tag.name }}</a>{% endfor %}
    </div>
    <h2 class="card-title"><a href="{{ post.url | safe }}">{{ post.title }}</a></h2>
    <p class="card-description">{{ post.description }}</p>
    <div class="meta">
      <time datetime="{{ post.date_iso }}">{{ post.date }}</time>
      <span>{{ post.author }}</span>
      <span>{{ post.reading_time }}</span>
    </div>
  </article>
  {% endfor %}
</div>
{% else %}
<div class="empty-state">
  <h2>No posts yet</h2>
  <p>Check back soon for new content!</p>
</div>
{% endif %}
{% endblock %}"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<a href="{{ blog_url | safe }}" class="back-link">&larr; Back to Blog</a>

<article class="post">
  <header class="post-header">
    <div class="tags">
      {% for tag in post.tags %}<a class="badge" href="{{ tag.url | safe }}">{{ tag.name }}</a>{% endfor %}
    </div>
    <h1>{{ post.title }}</h1>
    <p class="lead">{{ post.description }}</p>
    <div class="meta">
      <time datetime="{{ post.date_iso }}">{{ post.date }}</time>
      <span>{{ post.author }}</span>
      <span>{{ post.reading_time }}</span>
    </div>
  </header>

  {% if post.toc %}
  <aside class="toc">
    <h2>On this page</h2>
    <ul>
    {% for entry in post.toc %}
      <li class="toc-level-{{ entry.level }}"><a href="#{{ entry.id }}">{{ entry.title }}</a></li>
    {% endfor %}
    </ul>
  </aside>
  {% endif %}

  <div class="prose">
    {{ post.content | safe }}
  </div>
</article>
{% endblock %}"##;

const NOT_FOUND_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<div class="empty-state">
  <h1>{{ heading }}</h1>
  <p>{{ subheading }}</p>
  <a href="{{ blog_url | safe }}" class="back-link">&larr; Back to Blog</a>
</div>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str) -> PostCard {
        PostCard {
            url: format!("/blog/{}/", title.to_lowercase()),
            title: title.to_string(),
            description: "A description".to_string(),
            date_iso: "2024-06-01".to_string(),
            date: "Jun 1, 2024".to_string(),
            author: "Jane".to_string(),
            reading_time: "3 min read".to_string(),
            tags: vec![TagLink {
                name: "Rust".to_string(),
                url: "/blog/tags/rust/".to_string(),
            }],
        }
    }

    fn listing(posts: Vec<PostCard>) -> Context {
        Context {
            title: "Blog | Site".to_string(),
            site_title: "Site".to_string(),
            base_url: "/".to_string(),
            blog_url: "/blog/".to_string(),
            heading: "Blog".to_string(),
            posts,
            ..Default::default()
        }
    }

    #[test]
    fn renders_listing_cards() {
        let engine = TemplateEngine::new();
        let html = engine
            .render_page("index.html", &listing(vec![card("Hello")]))
            .unwrap();

        assert!(html.contains("<title>Blog | Site</title>"));
        assert!(html.contains(r#"<a href="/blog/hello/">Hello</a>"#));
        assert!(html.contains(r#"<time datetime="2024-06-01">Jun 1, 2024</time>"#));
        assert!(html.contains(r#"<a class="badge" href="/blog/tags/rust/">Rust</a>"#));
        assert!(html.contains("3 min read"));
        assert!(!html.contains("No posts yet"));
    }

    #[test]
    fn renders_empty_state() {
        let engine = TemplateEngine::new();
        let html = engine.render_page("index.html", &listing(vec![])).unwrap();

        assert!(html.contains("No posts yet"));
        assert!(html.contains("Check back soon for new content!"));
    }

    #[test]
    fn renders_post_content_unescaped() {
        let engine = TemplateEngine::new();
        let ctx = Context {
            title: "Hello | Site Blog".to_string(),
            blog_url: "/blog/".to_string(),
            post: Some(PostView {
                title: "Hello <World>".to_string(),
                description: "Desc".to_string(),
                date_iso: "2024-06-01".to_string(),
                date: "June 1, 2024".to_string(),
                author: "Jane".to_string(),
                reading_time: "1 min read".to_string(),
                tags: vec![],
                content: "<p>Body</p>".to_string(),
                toc: vec![TocEntry {
                    title: "Intro".to_string(),
                    id: "intro".to_string(),
                    level: 2,
                }],
            }),
            ..Default::default()
        };

        let html = engine.render_page("post.html", &ctx).unwrap();

        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains("Hello &lt;World&gt;"));
        assert!(html.contains(r##"<a href="#intro">Intro</a>"##));
        assert!(html.contains("Back to Blog"));
    }

    #[test]
    fn includes_extra_scripts() {
        let engine = TemplateEngine::new();
        let ctx = Context {
            scripts: vec!["/__reload.js".to_string()],
            ..listing(vec![])
        };

        let html = engine.render_page("index.html", &ctx).unwrap();

        assert!(html.contains(r#"<script src="/__reload.js"></script>"#));
    }
}
