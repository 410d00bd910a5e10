//! Regex-based syntax highlighting for fenced code blocks.
//!
//! Output uses highlight.js class names (`hljs-keyword`, `hljs-string`, ...)
//! so any hljs theme can style it.

use std::collections::HashMap;

use regex::Regex;

/// Programming language of a code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    Rust,
    TypeScript,
    JavaScript,
    Bash,
    Json,
    Python,
    Css,
    Html,
    Toml,
    Yaml,
    #[default]
    Unknown,
}

impl Language {
    /// Parse language from code fence info string.
    pub fn from_info(info: &str) -> Self {
        match fence_token(info).as_str() {
            "rust" | "rs" => Self::Rust,
            "ts" | "typescript" | "tsx" => Self::TypeScript,
            "js" | "javascript" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "bash" | "sh" | "shell" | "zsh" | "console" => Self::Bash,
            "json" | "jsonc" => Self::Json,
            "py" | "python" => Self::Python,
            "css" => Self::Css,
            "html" | "xml" | "svg" => Self::Html,
            "toml" => Self::Toml,
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Unknown,
        }
    }

    const ALL: [Language; 10] = [
        Self::Rust,
        Self::TypeScript,
        Self::JavaScript,
        Self::Bash,
        Self::Json,
        Self::Python,
        Self::Css,
        Self::Html,
        Self::Toml,
        Self::Yaml,
    ];
}

/// First word of a fence info string, lowercased and limited to class-safe
/// characters.
fn fence_token(info: &str) -> String {
    info.split_whitespace()
        .next()
        .unwrap_or("")
        .trim_start_matches('{')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '#' | '_'))
        .collect::<String>()
        .to_lowercase()
}

/// Token classes emitted by the highlighter, in match priority order.
const TOKEN_CLASSES: [&str; 6] = ["comment", "string", "name", "number", "literal", "keyword"];

struct Grammar {
    comment: Option<&'static str>,
    string: Option<&'static str>,
    name: Option<&'static str>,
    number: Option<&'static str>,
    literals: &'static [&'static str],
    keywords: &'static [&'static str],
}

const C_COMMENT: &str = r"//[^\n]*|/\*[\s\S]*?\*/";
const HASH_COMMENT: &str = r"#[^\n]*";
const DOUBLE_QUOTED: &str = r#""(?:[^"\\\n]|\\.)*""#;
const QUOTED: &str = r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#;
const JS_STRING: &str = r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|`(?:[^`\\]|\\.)*`"#;
const NUMBER: &str = r"\b\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?\b";

fn grammar(language: Language) -> Option<Grammar> {
    let grammar = match language {
        Language::Rust => Grammar {
            comment: Some(C_COMMENT),
            string: Some(DOUBLE_QUOTED),
            name: None,
            number: Some(NUMBER),
            literals: &["true", "false", "None", "Some", "Ok", "Err", "Self", "self"],
            keywords: &[
                "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
                "enum", "extern", "fn", "for", "if", "impl", "in", "let", "loop", "match",
                "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super",
                "trait", "type", "unsafe", "use", "where", "while",
            ],
        },
        Language::TypeScript | Language::JavaScript => Grammar {
            comment: Some(C_COMMENT),
            string: Some(JS_STRING),
            name: None,
            number: Some(NUMBER),
            literals: &["true", "false", "null", "undefined", "this"],
            keywords: &[
                "as", "async", "await", "break", "case", "catch", "class", "const", "continue",
                "default", "delete", "do", "else", "enum", "export", "extends", "finally",
                "for", "from", "function", "if", "implements", "import", "in", "instanceof",
                "interface", "let", "new", "of", "private", "public", "readonly", "return",
                "static", "switch", "throw", "try", "type", "typeof", "var", "void", "while",
                "yield",
            ],
        },
        Language::Bash => Grammar {
            comment: Some(HASH_COMMENT),
            string: Some(QUOTED),
            name: None,
            number: None,
            literals: &[],
            keywords: &[
                "case", "do", "done", "elif", "else", "esac", "export", "fi", "for",
                "function", "if", "in", "local", "return", "then", "until", "while",
            ],
        },
        Language::Json => Grammar {
            comment: None,
            string: Some(DOUBLE_QUOTED),
            name: None,
            number: Some(r"-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b"),
            literals: &["true", "false", "null"],
            keywords: &[],
        },
        Language::Python => Grammar {
            comment: Some(HASH_COMMENT),
            string: Some(QUOTED),
            name: None,
            number: Some(NUMBER),
            literals: &["True", "False", "None", "self"],
            keywords: &[
                "and", "as", "assert", "async", "await", "break", "class", "continue", "def",
                "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
                "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise",
                "return", "try", "while", "with", "yield",
            ],
        },
        Language::Css => Grammar {
            comment: Some(r"/\*[\s\S]*?\*/"),
            string: Some(QUOTED),
            name: Some(r"@[\w-]+"),
            number: Some(r"#[0-9a-fA-F]{3,8}\b|-?\b\d+(?:\.\d+)?(?:px|em|rem|vh|vw|ms|s|%)?"),
            literals: &["important", "inherit", "initial", "none", "auto"],
            keywords: &[],
        },
        Language::Html => Grammar {
            comment: Some(r"<!--[\s\S]*?-->"),
            string: Some(QUOTED),
            name: Some(r"</?[A-Za-z][\w:-]*"),
            number: None,
            literals: &[],
            keywords: &[],
        },
        Language::Toml => Grammar {
            comment: Some(HASH_COMMENT),
            string: Some(QUOTED),
            name: Some(r"(?m)^\s*\[\[?[^\]\n]+\]\]?"),
            number: Some(NUMBER),
            literals: &["true", "false"],
            keywords: &[],
        },
        Language::Yaml => Grammar {
            comment: Some(HASH_COMMENT),
            string: Some(QUOTED),
            name: Some(r"(?m)^\s*[\w.-]+:"),
            number: Some(NUMBER),
            literals: &["true", "false", "null", "yes", "no"],
            keywords: &[],
        },
        Language::Unknown => return None,
    };

    Some(grammar)
}

impl Grammar {
    fn to_regex(&self) -> Result<Regex, regex::Error> {
        let word_list = |words: &[&str]| format!(r"\b(?:{})\b", words.join("|"));

        let mut alternatives: Vec<String> = Vec::new();
        let mut push = |class: &str, pattern: Option<String>| {
            if let Some(pattern) = pattern {
                alternatives.push(format!("(?P<{}>{})", class, pattern));
            }
        };

        push("comment", self.comment.map(str::to_string));
        push("string", self.string.map(str::to_string));
        push("name", self.name.map(str::to_string));
        push("number", self.number.map(str::to_string));
        push(
            "literal",
            (!self.literals.is_empty()).then(|| word_list(self.literals)),
        );
        push(
            "keyword",
            (!self.keywords.is_empty()).then(|| word_list(self.keywords)),
        );

        Regex::new(&alternatives.join("|"))
    }
}

/// Compiled grammars for every supported language.
pub struct Highlighter {
    grammars: HashMap<Language, Regex>,
}

impl Highlighter {
    pub fn new() -> Self {
        let grammars = Language::ALL
            .into_iter()
            .filter_map(|lang| grammar(lang).map(|g| (lang, g)))
            .map(|(lang, g)| {
                let regex = g.to_regex().expect("Built-in grammar must compile");
                (lang, regex)
            })
            .collect();

        Self { grammars }
    }

    /// Highlight `code`, returning escaped HTML with token spans.
    ///
    /// Unsupported languages are escaped without spans.
    pub fn highlight(&self, code: &str, language: Language) -> String {
        let Some(regex) = self.grammars.get(&language) else {
            return escape_html(code);
        };

        let mut out = String::with_capacity(code.len() + code.len() / 2);
        let mut last = 0;

        for caps in regex.captures_iter(code) {
            let Some((class, m)) = TOKEN_CLASSES
                .iter()
                .find_map(|class| caps.name(class).map(|m| (*class, m)))
            else {
                continue;
            };

            out.push_str(&escape_html(&code[last..m.start()]));
            out.push_str(&format!(
                r#"<span class="hljs-{}">{}</span>"#,
                class,
                escape_html(m.as_str())
            ));
            last = m.end();
        }

        out.push_str(&escape_html(&code[last..]));
        out
    }

    /// Render a complete `<pre><code>` block for a fence info string.
    pub fn render_block(&self, code: &str, info: &str) -> String {
        let token = fence_token(info);
        let language = Language::from_info(info);

        let class = match (token.is_empty(), language) {
            (true, _) => String::new(),
            (false, Language::Unknown) => format!(r#" class="language-{}""#, token),
            (false, _) => format!(r#" class="hljs language-{}""#, token),
        };

        format!(
            "<pre><code{}>{}</code></pre>\n",
            class,
            self.highlight(code, language)
        )
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
