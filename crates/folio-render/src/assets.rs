//! Stylesheet for the generated pages.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the main CSS file, minified when requested.
    ///
    /// Falls back to the unminified source if minification fails.
    pub fn main_css(minify: bool) -> String {
        let css = Self::generate_css();
        if !minify {
            return css;
        }

        match Self::minify_css(&css) {
            Ok(minified) => minified,
            Err(e) => {
                tracing::warn!("Failed to minify CSS: {}", e);
                css
            }
        }
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

// Layout, cards, badges, and highlight.js token colours
const DEFAULT_CSS: &str = r#"/* folio blog theme */

:root {
  --background: #ffffff;
  --foreground: #0f172a;
  --muted: #64748b;
  --border: #e2e8f0;
  --primary: #2563eb;
  --code-background: #f8fafc;
  --content-max-width: 48rem;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

a {
  color: inherit;
}

.site-header {
  padding: 1rem 2rem;
  border-bottom: 1px solid var(--border);
}

.site-title {
  font-weight: 700;
  text-decoration: none;
}

.container {
  max-width: 72rem;
  margin: 0 auto;
  padding: 2rem 1rem;
}

.page-header {
  margin-bottom: 3rem;
  text-align: center;
}

.muted,
.meta,
.lead {
  color: var(--muted);
}

.post-grid {
  display: grid;
  gap: 1.5rem;
  grid-template-columns: repeat(auto-fill, minmax(18rem, 1fr));
}

.card {
  border: 1px solid var(--border);
  border-radius: 0.5rem;
  padding: 1.5rem;
  transition: box-shadow 0.2s;
}

.card:hover {
  box-shadow: 0 4px 12px rgba(15, 23, 42, 0.08);
}

.card-title a {
  text-decoration: none;
}

.card-title a:hover {
  color: var(--primary);
}

.tags {
  display: flex;
  flex-wrap: wrap;
  gap: 0.5rem;
  margin-bottom: 0.5rem;
}

.badge {
  border-radius: 9999px;
  background: var(--code-background);
  border: 1px solid var(--border);
  padding: 0.125rem 0.625rem;
  font-size: 0.75rem;
  text-decoration: none;
}

.meta {
  display: flex;
  flex-wrap: wrap;
  gap: 1rem;
  font-size: 0.875rem;
}

.empty-state {
  text-align: center;
  padding: 4rem 1rem;
}

.back-link {
  display: inline-block;
  margin-bottom: 2rem;
  font-size: 0.875rem;
  color: var(--muted);
  text-decoration: none;
}

.post {
  max-width: var(--content-max-width);
  margin: 0 auto;
}

.post-header {
  margin-bottom: 2rem;
  padding-bottom: 2rem;
  border-bottom: 1px solid var(--border);
}

.toc {
  font-size: 0.875rem;
  margin-bottom: 2rem;
}

.toc-level-3 {
  margin-left: 1rem;
}

.prose a.anchor {
  text-decoration: none;
}

.prose a.anchor:hover {
  text-decoration: underline;
}

.prose pre {
  background: var(--code-background);
  border: 1px solid var(--border);
  border-radius: 0.5rem;
  padding: 1rem;
  overflow-x: auto;
}

.hljs-keyword { color: #7c3aed; }
.hljs-string { color: #059669; }
.hljs-comment { color: #94a3b8; font-style: italic; }
.hljs-number,
.hljs-literal { color: #d97706; }
.hljs-name { color: #dc2626; }
"#;
