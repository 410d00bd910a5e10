//! Post records and collection helpers.

use serde::Serialize;

use crate::frontmatter::{Frontmatter, PublishDate};
use crate::reading_time::ReadingTime;

/// A fully loaded post, including its markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Identifier derived from the file name
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: PublishDate,
    pub author: String,
    pub tags: Vec<String>,
    pub reading_time: ReadingTime,

    /// Markdown body without the frontmatter block
    pub content: String,
}

impl Post {
    /// Assemble a post from its validated frontmatter and body.
    pub fn new(
        slug: impl Into<String>,
        frontmatter: Frontmatter,
        content: impl Into<String>,
        words_per_minute: u32,
    ) -> Self {
        let content = content.into();
        let reading_time = ReadingTime::estimate(&content, words_per_minute);

        Self {
            slug: slug.into(),
            title: frontmatter.title,
            description: frontmatter.description,
            date: frontmatter.date,
            author: frontmatter.author,
            tags: frontmatter.tags,
            reading_time,
            content,
        }
    }

    /// Metadata-only projection used by listings.
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            author: self.author.clone(),
            tags: self.tags.clone(),
            reading_time: self.reading_time,
        }
    }

    pub fn into_summary(self) -> PostSummary {
        PostSummary {
            slug: self.slug,
            title: self.title,
            description: self.description,
            date: self.date,
            author: self.author,
            tags: self.tags,
            reading_time: self.reading_time,
        }
    }
}

/// Post metadata without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: PublishDate,
    pub author: String,
    pub tags: Vec<String>,
    pub reading_time: ReadingTime,
}

impl PostSummary {
    /// Case-insensitive exact tag match.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == wanted)
    }
}

/// Number of posts carrying a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    /// First spelling of the tag seen in the collection
    pub tag: String,
    pub count: usize,
}

/// Sort newest first. Posts with equal dates keep their relative order.
pub fn sort_by_date(posts: &mut [PostSummary]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Count tags across a collection, merging case variants.
///
/// Ordered by count (descending), then by lowercase name.
pub fn count_tags(posts: &[PostSummary]) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();

    for post in posts {
        for tag in &post.tags {
            let key = tag.to_lowercase();
            match counts.iter_mut().find(|c| c.tag.to_lowercase() == key) {
                Some(entry) => entry.count += 1,
                None => counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                }),
            }
        }
    }

    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.tag.to_lowercase().cmp(&b.tag.to_lowercase()))
    });
    counts
}
