//! Blog content loading.
//!
//! This crate reads MDX posts from a content directory, validates their YAML
//! frontmatter, estimates reading time, and builds the date-ordered post
//! collection used by the renderer.

pub mod frontmatter;
pub mod post;
pub mod reading_time;
pub mod store;

pub use frontmatter::{Frontmatter, FrontmatterError, PublishDate};
pub use post::{count_tags, sort_by_date, Post, PostSummary, TagCount};
pub use reading_time::ReadingTime;
pub use store::{ContentStore, LoadError};
