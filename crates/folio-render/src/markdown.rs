//! Markdown to HTML with an ordered list of post-processing passes.
//!
//! The body is parsed into a `pulldown-cmark` event stream, run through each
//! [`Pass`] in order, and serialized to HTML. The default passes are:
//!
//! 1. [`HighlightCode`] - syntax highlight fenced code blocks
//! 2. [`HeadingIds`] - give every heading a unique slug id
//! 3. [`AutolinkHeadings`] - wrap heading content in a link to its id
//!
//! Autolinking only sees ids assigned by an earlier pass, so the order matters.

use std::collections::HashMap;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::highlight::{escape_html, Highlighter};

/// A rendering pass over the markdown event stream.
pub trait Pass: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Transform the event stream.
    fn apply<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>>;
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Rendered post body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer with a fixed pass pipeline.
pub struct MarkdownRenderer {
    options: Options,
    passes: Vec<Box<dyn Pass>>,
}

impl MarkdownRenderer {
    /// Create a renderer with the default passes.
    pub fn new() -> Self {
        Self::with_passes(vec![
            Box::new(HighlightCode::new()),
            Box::new(HeadingIds),
            Box::new(AutolinkHeadings),
        ])
    }

    /// Create a renderer running `passes` in order.
    pub fn with_passes(passes: Vec<Box<dyn Pass>>) -> Self {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;

        Self { options, passes }
    }

    /// Names of the installed passes, in run order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Render markdown source to HTML.
    pub fn render(&self, source: &str) -> RenderedBody {
        let mut events: Vec<Event<'_>> = Parser::new_ext(source, self.options).collect();

        for pass in &self.passes {
            events = pass.apply(events);
            tracing::trace!("Applied pass {}", pass.name());
        }

        let toc = collect_toc(&events);

        let mut html_output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());

        RenderedBody {
            html: html_output,
            toc,
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces code blocks with highlighted HTML.
pub struct HighlightCode {
    highlighter: Highlighter,
}

impl HighlightCode {
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::new(),
        }
    }
}

impl Default for HighlightCode {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for HighlightCode {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn apply<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        let mut current: Option<(String, String)> = None; // (info, source)

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let info = match kind {
                        CodeBlockKind::Fenced(info) => info.to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                    current = Some((info, String::new()));
                }

                Event::Text(text) if current.is_some() => {
                    if let Some((_, ref mut source)) = current {
                        source.push_str(&text);
                    }
                }

                Event::End(TagEnd::CodeBlock) => {
                    if let Some((info, source)) = current.take() {
                        let html = self.highlighter.render_block(&source, &info);
                        out.push(Event::Html(CowStr::from(html)));
                    }
                }

                other => out.push(other),
            }
        }

        out
    }
}

/// Assigns slug ids to headings that do not declare one.
pub struct HeadingIds;

impl Pass for HeadingIds {
    fn name(&self) -> &'static str {
        "heading-ids"
    }

    fn apply<'a>(&self, mut events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut slugger = Slugger::default();

        // Explicit {#ids} are reserved up front so generated ids avoid them
        for event in &events {
            if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
                slugger.reserve(id);
            }
        }

        for i in 0..events.len() {
            if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
                continue;
            }

            let text = heading_text(&events[i + 1..]);
            let slug = slugger.slug(&text);

            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(slug));
            }
        }

        events
    }
}

/// Wraps heading content in `<a class="anchor" href="#id">`.
pub struct AutolinkHeadings;

impl Pass for AutolinkHeadings {
    fn name(&self) -> &'static str {
        "autolink-headings"
    }

    fn apply<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len() + 8);
        let mut open = false;

        for event in events {
            match event {
                Event::Start(Tag::Heading { id: Some(ref id), .. }) => {
                    let anchor = format!(r##"<a class="anchor" href="#{}">"##, escape_html(id));
                    out.push(event);
                    out.push(Event::InlineHtml(CowStr::from(anchor)));
                    open = true;
                }

                Event::End(TagEnd::Heading(_)) if open => {
                    out.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
                    out.push(event);
                    open = false;
                }

                other => out.push(other),
            }
        }

        out
    }
}

/// Plain text of a heading, given the events that follow its start tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

fn collect_toc(events: &[Event<'_>]) -> Vec<TocEntry> {
    events
        .iter()
        .enumerate()
        .filter_map(|(i, event)| match event {
            Event::Start(Tag::Heading {
                level,
                id: Some(id),
                ..
            }) => Some(TocEntry {
                title: heading_text(&events[i + 1..]),
                id: id.to_string(),
                level: *level as u8,
            }),
            _ => None,
        })
        .collect()
}

/// Generates unique GitHub-style slugs within one document.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Mark an id as taken without generating it.
    pub fn reserve(&mut self, id: &str) {
        self.seen.entry(id.to_string()).or_insert(0);
    }

    /// Slug for `text`, suffixed with `-1`, `-2`, ... on repeats.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() {
            "section".to_string()
        } else {
            base
        };

        let mut candidate = base.clone();
        while let Some(count) = self.seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{}-{}", base, count);
        }

        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
