//! Configuration file (folio.toml).

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use folio_content::{reading_time::DEFAULT_WORDS_PER_MINUTE, ContentStore};
use folio_render::{Site, SiteConfig};

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_content_dir")]
    pub dir: String,
    /// File extensions treated as posts
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

#[derive(Debug, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_minify")]
    pub minify: bool,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds a rendered page stays fresh
    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: u64,
    #[serde(default = "default_prerender")]
    pub prerender: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            extensions: default_extensions(),
            words_per_minute: default_words_per_minute(),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: default_description(),
            base_url: default_base_url(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
            minify: default_minify(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            revalidate_secs: default_revalidate_secs(),
            prerender: default_prerender(),
        }
    }
}

fn default_content_dir() -> String {
    "content/blog".to_string()
}
fn default_extensions() -> Vec<String> {
    vec!["mdx".to_string()]
}
fn default_words_per_minute() -> u32 {
    DEFAULT_WORDS_PER_MINUTE
}
fn default_title() -> String {
    SiteConfig::default().title
}
fn default_description() -> String {
    SiteConfig::default().description
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_minify() -> bool {
    true
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_revalidate_secs() -> u64 {
    600
}
fn default_prerender() -> bool {
    true
}

impl ConfigFile {
    pub fn content_store(&self) -> ContentStore {
        ContentStore::new(&self.content.dir)
            .with_extensions(&self.content.extensions)
            .with_words_per_minute(self.content.words_per_minute)
    }

    pub fn site_config(&self) -> SiteConfig {
        SiteConfig {
            title: self.site.title.clone(),
            description: self.site.description.clone(),
            base_url: self.site.base_url.clone(),
            scripts: vec![],
        }
    }

    /// Build the site with extra scripts appended to every page.
    pub fn site_with_scripts(&self, scripts: Vec<String>) -> Site {
        let mut site_config = self.site_config();
        site_config.scripts = scripts;
        Site::new(self.content_store(), site_config)
    }

    pub fn site(&self) -> Site {
        self.site_with_scripts(vec![])
    }

    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.server.revalidate_secs)
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
