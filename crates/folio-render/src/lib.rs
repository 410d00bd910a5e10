//! Page rendering for folio blogs.
//!
//! Turns posts from a [`folio_content::ContentStore`] into HTML pages:
//! markdown bodies go through an ordered pass pipeline (highlighting,
//! heading ids, heading anchors), then into minijinja page templates.
//! [`StaticBuilder`] exports every page to a directory.

pub mod assets;
pub mod builder;
pub mod highlight;
pub mod markdown;
pub mod pages;
pub mod templates;

pub use assets::AssetPipeline;
pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use highlight::{Highlighter, Language};
pub use markdown::{MarkdownRenderer, Pass, RenderedBody, TocEntry};
pub use pages::{PageStatus, RenderError, RenderedPage, Route, Site, SiteConfig};
