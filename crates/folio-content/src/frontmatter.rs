//! Frontmatter extraction and validation.
//!
//! Every post starts with a YAML block between `---` fences:
//!
//! ```markdown
//! ---
//! title: Shipping faster with ISR
//! description: How incremental regeneration keeps pages fresh
//! date: 2024-06-01
//! author: Jane Doe
//! tags: [nextjs, performance]
//! ---
//!
//! Body markdown starts here.
//! ```
//!
//! `title`, `description`, `date`, and `author` are required. `tags` is
//! optional and may be a list or a single value; numeric and boolean tags are
//! kept as text. Unknown keys are ignored.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated frontmatter of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frontmatter {
    /// Post title
    pub title: String,

    /// Short summary shown on cards and in page metadata
    pub description: String,

    /// Publish date, used for ordering
    pub date: PublishDate,

    /// Author display name
    pub author: String,

    /// Tags in declaration order, without duplicates
    pub tags: Vec<String>,
}

/// Frontmatter as written in the file, before validation.
#[derive(Debug, Deserialize)]
struct RawFrontmatter {
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    author: Option<String>,
    #[serde(default)]
    tags: Option<serde_yaml::Value>,
}

impl RawFrontmatter {
    fn validate(self) -> Result<Frontmatter, FrontmatterError> {
        let title = required("title", self.title)?;
        let description = required("description", self.description)?;
        let author = required("author", self.author)?;
        let date = required("date", self.date)?.parse()?;

        let raw_tags = match self.tags {
            None | Some(serde_yaml::Value::Null) => Vec::new(),
            Some(serde_yaml::Value::Sequence(items)) => items
                .into_iter()
                .filter_map(|item| scalar_tag(item).transpose())
                .collect::<Result<Vec<_>, _>>()?,
            Some(value) => scalar_tag(value)?.into_iter().collect(),
        };

        let mut tags: Vec<String> = Vec::with_capacity(raw_tags.len());
        for tag in raw_tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        Ok(Frontmatter {
            title,
            description,
            date,
            author,
            tags,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, FrontmatterError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(FrontmatterError::MissingField(field)),
    }
}

/// A tag is any YAML scalar; numbers and booleans keep their written form.
fn scalar_tag(value: serde_yaml::Value) -> Result<Option<String>, FrontmatterError> {
    use serde_yaml::Value;

    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Tagged(tagged) => scalar_tag(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err(FrontmatterError::InvalidTags),
    }
}

/// Split a post into its raw YAML header and markdown body.
///
/// The file must open with a `---` line; the header runs until the next line
/// consisting only of `---`.
pub fn split_frontmatter(source: &str) -> Result<(&str, &str), FrontmatterError> {
    let trimmed = source.trim_start_matches('\u{feff}').trim_start();

    let Some(after_open) = trimmed.strip_prefix("---") else {
        return Err(FrontmatterError::Missing);
    };

    // The opening fence must be alone on its line
    let after_open = match after_open.find('\n') {
        Some(pos) if after_open[..pos].trim().is_empty() => &after_open[pos + 1..],
        Some(_) => return Err(FrontmatterError::Missing),
        None => return Err(FrontmatterError::Unclosed),
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok((yaml, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed)
}

/// Parse and validate a raw YAML header.
pub fn parse_frontmatter(yaml: &str) -> Result<Frontmatter, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Err(FrontmatterError::MissingField("title"));
    }

    let raw: RawFrontmatter =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    raw.validate()
}

/// Extract frontmatter from a post.
///
/// Returns the validated frontmatter and the body that follows the header.
pub fn extract_frontmatter(source: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let (yaml, body) = split_frontmatter(source)?;
    Ok((parse_frontmatter(yaml)?, body))
}

/// Publish date of a post.
///
/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339 timestamps, and naive
/// `YYYY-MM-DDTHH:MM:SS` timestamps (read as UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PublishDate(DateTime<Utc>);

impl PublishDate {
    /// Build a date at midnight UTC.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Self(dt.and_utc()))
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Long form used on post pages, e.g. `June 1, 2024`.
    pub fn format_long(&self) -> String {
        self.0.format("%B %-d, %Y").to_string()
    }

    /// Short form used on cards, e.g. `Jun 1, 2024`.
    pub fn format_short(&self) -> String {
        self.0.format("%b %-d, %Y").to_string()
    }

    /// Machine-readable date for `<time datetime>` and sitemaps.
    pub fn to_iso_date(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl FromStr for PublishDate {
    type Err = FrontmatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self(dt.and_utc()));
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self(dt.and_utc()));
            }
        }

        Err(FrontmatterError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for PublishDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_date())
    }
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Missing frontmatter block - file must start with ---")]
    Missing,

    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Missing required frontmatter field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date in frontmatter: {0}")]
    InvalidDate(String),

    #[error("Tags must be a scalar or a list of scalars")]
    InvalidTags,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const POST: &str = r#"---
title: Shipping faster
description: Notes on regeneration
date: 2024-06-01
author: Jane Doe
tags: [nextjs, Performance]
---

# Shipping faster
"#;

    #[test]
    fn extracts_valid_frontmatter() {
        let (fm, body) = extract_frontmatter(POST).unwrap();

        assert_eq!(fm.title, "Shipping faster");
        assert_eq!(fm.description, "Notes on regeneration");
        assert_eq!(fm.author, "Jane Doe");
        assert_eq!(fm.date, PublishDate::from_ymd(2024, 6, 1).unwrap());
        assert_eq!(fm.tags, vec!["nextjs", "Performance"]);
        assert!(body.starts_with("# Shipping faster"));
    }

    #[test]
    fn tags_default_to_empty() {
        let yaml = "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\n";
        let fm = parse_frontmatter(yaml).unwrap();
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn single_tag_string_is_accepted() {
        let yaml = "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\ntags: rust\n";
        let fm = parse_frontmatter(yaml).unwrap();
        assert_eq!(fm.tags, vec!["rust"]);
    }

    #[test]
    fn duplicate_and_blank_tags_are_dropped() {
        let yaml =
            "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\ntags: [x, '', y, x, ' y ']\n";
        let fm = parse_frontmatter(yaml).unwrap();
        assert_eq!(fm.tags, vec!["x", "y"]);
    }

    #[test]
    fn numeric_and_boolean_tags_become_strings() {
        let yaml =
            "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\ntags: [2024, rust, true, 1.5]\n";
        let fm = parse_frontmatter(yaml).unwrap();
        assert_eq!(fm.tags, vec!["2024", "rust", "true", "1.5"]);
    }

    #[test]
    fn single_numeric_tag_is_accepted() {
        let yaml = "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\ntags: 2024\n";
        let fm = parse_frontmatter(yaml).unwrap();
        assert_eq!(fm.tags, vec!["2024"]);
    }

    #[test]
    fn null_tags_are_empty() {
        let yaml = "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\ntags: [~, x]\n";
        let fm = parse_frontmatter(yaml).unwrap();
        assert_eq!(fm.tags, vec!["x"]);

        let yaml = "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\ntags:\n";
        assert!(parse_frontmatter(yaml).unwrap().tags.is_empty());
    }

    #[test]
    fn nested_tags_are_rejected() {
        let yaml =
            "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\ntags: [[a, b], c]\n";
        assert!(matches!(
            parse_frontmatter(yaml),
            Err(FrontmatterError::InvalidTags)
        ));

        let yaml = "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\ntags: {a: 1}\n";
        assert!(matches!(
            parse_frontmatter(yaml),
            Err(FrontmatterError::InvalidTags)
        ));
    }

    #[test]
    fn ignores_unknown_fields() {
        let yaml = "title: A\ndescription: B\ndate: 2024-01-01\nauthor: C\ncover: /img.png\n";
        assert!(parse_frontmatter(yaml).is_ok());
    }

    #[test]
    fn errors_on_missing_required_field() {
        let yaml = "title: A\ndate: 2024-01-01\nauthor: C\n";
        let result = parse_frontmatter(yaml);
        assert!(matches!(
            result,
            Err(FrontmatterError::MissingField("description"))
        ));
    }

    #[test]
    fn errors_on_blank_required_field() {
        let yaml = "title: '  '\ndescription: B\ndate: 2024-01-01\nauthor: C\n";
        let result = parse_frontmatter(yaml);
        assert!(matches!(result, Err(FrontmatterError::MissingField("title"))));
    }

    #[test]
    fn errors_on_invalid_date() {
        let yaml = "title: A\ndescription: B\ndate: next tuesday\nauthor: C\n";
        let result = parse_frontmatter(yaml);
        assert!(matches!(result, Err(FrontmatterError::InvalidDate(_))));
    }

    #[test]
    fn errors_on_missing_frontmatter() {
        let result = split_frontmatter("# Just Markdown\n\nNo frontmatter here.");
        assert!(matches!(result, Err(FrontmatterError::Missing)));
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let result = split_frontmatter("---\ntitle: Test\n# No closing");
        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let result = extract_frontmatter("---\ntitle: [invalid yaml\n---\n");
        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn closing_fence_must_be_its_own_line() {
        let source = "---\ntitle: a --- b\n---\nbody";
        let (yaml, body) = split_frontmatter(source).unwrap();
        assert_eq!(yaml, "title: a --- b\n");
        assert_eq!(body, "body");
    }

    #[test]
    fn handles_crlf_line_endings() {
        let source = "---\r\ntitle: A\r\n---\r\n\r\nBody";
        let (yaml, body) = split_frontmatter(source).unwrap();
        assert_eq!(yaml, "title: A\r\n");
        assert_eq!(body, "Body");
    }

    #[test]
    fn parses_date_formats() {
        let midnight = PublishDate::from_ymd(2024, 1, 15).unwrap();
        assert_eq!("2024-01-15".parse::<PublishDate>().unwrap(), midnight);

        let rfc = "2024-01-15T10:30:00+02:00".parse::<PublishDate>().unwrap();
        assert_eq!(rfc.as_datetime().to_rfc3339(), "2024-01-15T08:30:00+00:00");

        let naive = "2024-01-15T08:30:00".parse::<PublishDate>().unwrap();
        assert_eq!(naive, rfc);
    }

    #[test]
    fn formats_dates_for_display() {
        let date = PublishDate::from_ymd(2024, 6, 1).unwrap();
        assert_eq!(date.format_long(), "June 1, 2024");
        assert_eq!(date.format_short(), "Jun 1, 2024");
        assert_eq!(date.to_string(), "2024-06-01");
    }
}
