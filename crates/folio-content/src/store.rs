//! Content store: post lookup and collection indexing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::frontmatter::{extract_frontmatter, FrontmatterError};
use crate::post::{count_tags, sort_by_date, Post, PostSummary, TagCount};
use crate::reading_time::DEFAULT_WORDS_PER_MINUTE;

/// A directory of posts, one file per slug.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    extensions: Vec<String>,
    words_per_minute: u32,
}

/// Errors that can occur when loading a single post.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Failed to read post {slug}: {source}")]
    Io {
        slug: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid frontmatter in post {slug}: {source}")]
    Frontmatter {
        slug: String,
        #[source]
        source: FrontmatterError,
    },
}

impl ContentStore {
    /// Create a store rooted at `root`, reading `.mdx` files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec!["mdx".to_string()],
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
        }
    }

    /// Replace the accepted file extensions (without the leading dot).
    ///
    /// Earlier extensions win when two files share a slug.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn with_words_per_minute(mut self, words_per_minute: u32) -> Self {
        self.words_per_minute = words_per_minute;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every slug in the store, in file name order.
    ///
    /// A missing content directory is an empty store.
    pub fn all_slugs(&self) -> Vec<String> {
        if !self.root.is_dir() {
            tracing::debug!("Content directory not found: {}", self.root.display());
            return Vec::new();
        }

        let mut slugs: Vec<String> = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(slug) = self.slug_for(entry.path()) else {
                continue;
            };

            if !slugs.contains(&slug) {
                slugs.push(slug);
            }
        }

        slugs
    }

    /// Load a post, reporting why it could not be loaded.
    pub fn load(&self, slug: &str) -> Result<Post, LoadError> {
        if !is_valid_slug(slug) {
            return Err(LoadError::NotFound(slug.to_string()));
        }

        let Some(path) = self.path_for(slug) else {
            return Err(LoadError::NotFound(slug.to_string()));
        };

        let source = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            slug: slug.to_string(),
            source,
        })?;

        let (frontmatter, body) =
            extract_frontmatter(&source).map_err(|source| LoadError::Frontmatter {
                slug: slug.to_string(),
                source,
            })?;

        Ok(Post::new(slug, frontmatter, body, self.words_per_minute))
    }

    /// Load a post by slug.
    ///
    /// Every failure, including malformed frontmatter, comes back as `None`.
    pub fn get_post_by_slug(&self, slug: &str) -> Option<Post> {
        match self.load(slug) {
            Ok(post) => Some(post),
            Err(LoadError::NotFound(_)) => {
                tracing::debug!("Post not found: {}", slug);
                None
            }
            Err(e) => {
                tracing::warn!("Error reading post {}: {}", slug, e);
                None
            }
        }
    }

    /// Every loadable post as a summary, newest first.
    pub fn get_all_posts(&self) -> Vec<PostSummary> {
        let mut posts: Vec<PostSummary> = self
            .all_slugs()
            .iter()
            .filter_map(|slug| self.get_post_by_slug(slug))
            .map(Post::into_summary)
            .collect();

        sort_by_date(&mut posts);
        posts
    }

    /// Posts carrying `tag`, compared case-insensitively, newest first.
    pub fn get_posts_by_tag(&self, tag: &str) -> Vec<PostSummary> {
        self.get_all_posts()
            .into_iter()
            .filter(|post| post.has_tag(tag))
            .collect()
    }

    /// Distinct tags across all posts with their post counts.
    pub fn tags(&self) -> Vec<TagCount> {
        count_tags(&self.get_all_posts())
    }

    fn slug_for(&self, path: &Path) -> Option<String> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        if !self.extensions.iter().any(|e| e == ext) {
            return None;
        }

        let stem = path.file_stem().and_then(|s| s.to_str())?;
        is_valid_slug(stem).then(|| stem.to_string())
    }

    fn path_for(&self, slug: &str) -> Option<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", slug, ext)))
            .find(|path| path.is_file())
    }
}

/// Slugs name a file directly inside the store.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\', '\0'])
        && slug != ".."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::PublishDate;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_post(dir: &Path, slug: &str, date: &str, tags: &str) {
        let source = format!(
            "---\ntitle: {slug} title\ndescription: About {slug}\ndate: {date}\nauthor: Jane\ntags: {tags}\n---\n\n# {slug}\n\nSome body text here.\n"
        );
        fs::write(dir.join(format!("{}.mdx", slug)), source).unwrap();
    }

    fn slugs(posts: &[PostSummary]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn missing_directory_is_an_empty_store() {
        let temp = tempdir().unwrap();
        let store = ContentStore::new(temp.path().join("nope"));

        assert!(store.all_slugs().is_empty());
        assert!(store.get_all_posts().is_empty());
        assert!(store.tags().is_empty());
    }

    #[test]
    fn empty_directory_is_an_empty_store() {
        let temp = tempdir().unwrap();
        let store = ContentStore::new(temp.path());

        assert!(store.all_slugs().is_empty());
        assert!(store.get_all_posts().is_empty());
        assert!(store.get_posts_by_tag("x").is_empty());
    }

    #[test]
    fn unreadable_post_is_absent() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "good", "2024-01-01", "[x]");
        fs::write(temp.path().join("bad.mdx"), b"---\xff\xfe").unwrap();
        let store = ContentStore::new(temp.path());

        assert!(matches!(
            store.load("bad"),
            Err(LoadError::Io { ref slug, .. }) if slug == "bad"
        ));
        assert!(store.get_post_by_slug("bad").is_none());
        assert_eq!(slugs(&store.get_all_posts()), vec!["good"]);
    }

    #[test]
    fn numeric_tags_keep_the_post() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "y", "2024-01-01", "[2024, rust]");
        let store = ContentStore::new(temp.path());

        let post = store.get_post_by_slug("y").unwrap();
        assert_eq!(post.tags, vec!["2024", "rust"]);
        assert_eq!(slugs(&store.get_posts_by_tag("2024")), vec!["y"]);
    }

    #[test]
    fn lists_only_matching_extensions() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "b-post", "2024-01-01", "[]");
        write_post(temp.path(), "a-post", "2024-01-01", "[]");
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();
        fs::write(temp.path().join(".hidden.mdx"), "ignored").unwrap();
        fs::create_dir(temp.path().join("drafts.mdx")).unwrap();

        let store = ContentStore::new(temp.path());

        assert_eq!(store.all_slugs(), vec!["a-post", "b-post"]);
    }

    #[test]
    fn extra_extensions_do_not_duplicate_slugs() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "same", "2024-01-01", "[]");
        fs::write(temp.path().join("same.md"), "---\n---\n").unwrap();
        fs::write(temp.path().join("other.md"), "x").unwrap();

        let store = ContentStore::new(temp.path()).with_extensions(["mdx", ".md"]);

        assert_eq!(store.all_slugs(), vec!["other", "same"]);
        assert_eq!(store.get_post_by_slug("same").unwrap().title, "same title");
    }

    #[test]
    fn loads_post_by_slug() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "hello", "2024-01-01", "[rust, web]");

        let store = ContentStore::new(temp.path());
        let post = store.get_post_by_slug("hello").unwrap();

        assert_eq!(post.slug, "hello");
        assert_eq!(post.title, "hello title");
        assert_eq!(post.description, "About hello");
        assert_eq!(post.author, "Jane");
        assert_eq!(post.date, PublishDate::from_ymd(2024, 1, 1).unwrap());
        assert_eq!(post.tags, vec!["rust", "web"]);
        assert!(post.content.starts_with("# hello"));
        assert_eq!(post.reading_time.to_string(), "1 min read");
    }

    #[test]
    fn missing_slug_is_absent() {
        let temp = tempdir().unwrap();
        let store = ContentStore::new(temp.path());

        assert!(store.get_post_by_slug("missing").is_none());
        assert!(matches!(store.load("missing"), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn path_traversal_is_not_found() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("blog");
        fs::create_dir(&content).unwrap();
        write_post(temp.path(), "secret", "2024-01-01", "[]");

        let store = ContentStore::new(&content);

        for slug in ["../secret", "..", "", ".hidden", "a/b", "a\\b"] {
            assert!(
                matches!(store.load(slug), Err(LoadError::NotFound(_))),
                "slug {:?} should be rejected",
                slug
            );
        }
    }

    #[test]
    fn malformed_metadata_is_absent() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("no-title.mdx"),
            "---\ndescription: x\ndate: 2024-01-01\nauthor: y\n---\nbody",
        )
        .unwrap();
        fs::write(temp.path().join("no-frontmatter.mdx"), "# Hello").unwrap();

        let store = ContentStore::new(temp.path());

        assert!(store.get_post_by_slug("no-title").is_none());
        assert!(store.get_post_by_slug("no-frontmatter").is_none());
        assert!(matches!(
            store.load("no-title"),
            Err(LoadError::Frontmatter {
                source: FrontmatterError::MissingField("title"),
                ..
            })
        ));
    }

    #[test]
    fn collection_is_sorted_and_skips_broken_posts() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "a", "2024-01-01", "[x]");
        write_post(temp.path(), "b", "2024-06-01", "[x, y]");
        fs::write(temp.path().join("broken.mdx"), "---\ntitle: [\n---\n").unwrap();

        let store = ContentStore::new(temp.path());

        assert_eq!(slugs(&store.get_all_posts()), vec!["b", "a"]);
        assert_eq!(slugs(&store.get_posts_by_tag("y")), vec!["b"]);
        assert_eq!(slugs(&store.get_posts_by_tag("X")), vec!["b", "a"]);
        assert!(store.get_post_by_slug("missing").is_none());
    }

    #[test]
    fn equal_dates_follow_file_name_order() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "charlie", "2024-03-01", "[]");
        write_post(temp.path(), "alpha", "2024-03-01", "[]");
        write_post(temp.path(), "bravo", "2024-03-01", "[]");

        let store = ContentStore::new(temp.path());

        assert_eq!(
            slugs(&store.get_all_posts()),
            vec!["alpha", "bravo", "charlie"]
        );
    }

    #[test]
    fn tag_filter_ignores_case() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "ops", "2024-01-01", "[DevOps]");

        let store = ContentStore::new(temp.path());

        assert_eq!(slugs(&store.get_posts_by_tag("devops")), vec!["ops"]);
    }

    #[test]
    fn summaries_match_loaded_posts() {
        let temp = tempdir().unwrap();
        write_post(temp.path(), "a", "2024-01-01", "[x]");
        write_post(temp.path(), "b", "2024-06-01", "[x, y]");

        let store = ContentStore::new(temp.path());

        for summary in store.get_all_posts() {
            let post = store.get_post_by_slug(&summary.slug).unwrap();
            assert_eq!(post.summary(), summary);
        }
    }

    #[test]
    fn custom_reading_speed_is_applied() {
        let temp = tempdir().unwrap();
        let body = "word ".repeat(300);
        fs::write(
            temp.path().join("long.mdx"),
            format!("---\ntitle: T\ndescription: D\ndate: 2024-01-01\nauthor: A\n---\n{body}"),
        )
        .unwrap();

        let store = ContentStore::new(temp.path()).with_words_per_minute(100);

        assert_eq!(store.get_post_by_slug("long").unwrap().reading_time.minutes, 3);
    }
}
