//! Reading time estimation.

use std::fmt;

use serde::Serialize;

/// Average adult reading speed used when none is configured.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Estimated time to read a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadingTime {
    /// Number of words counted in the body
    pub words: usize,

    /// Whole minutes, rounded up
    pub minutes: u32,
}

impl ReadingTime {
    /// Estimate reading time for markdown source.
    ///
    /// A word is any whitespace-delimited token containing an alphanumeric
    /// character. CJK ideographs are not space-separated, so each one counts
    /// as a word on its own.
    pub fn estimate(text: &str, words_per_minute: u32) -> Self {
        let words = count_words(text);
        let wpm = f64::from(words_per_minute.max(1));

        // Hundredths first, then up to a whole minute
        let exact = words as f64 / wpm;
        let rounded = (exact * 100.0).round() / 100.0;

        Self {
            words,
            minutes: rounded.ceil() as u32,
        }
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min read", self.minutes)
    }
}

fn count_words(text: &str) -> usize {
    text.split_whitespace()
        .map(|token| {
            let cjk = token.chars().filter(|c| is_cjk(*c)).count();
            let has_word = token.chars().any(|c| c.is_alphanumeric() && !is_cjk(c));
            cjk + usize::from(has_word)
        })
        .sum()
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30ff}'   // Hiragana, Katakana
        | '\u{3400}'..='\u{4dbf}' // CJK Extension A
        | '\u{4e00}'..='\u{9fff}' // CJK Unified Ideographs
        | '\u{ac00}'..='\u{d7af}' // Hangul syllables
        | '\u{f900}'..='\u{faff}' // CJK Compatibility Ideographs
    )
}
