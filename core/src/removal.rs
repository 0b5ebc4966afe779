//! Heuristic removal of a known fragment from raw surface content.
//!
//! A fragment is removed by trying, in order, until one pattern matches:
//!
//! 1. fragment followed by a blank line  → single newline
//! 2. fragment followed by one newline   → single newline
//! 3. newline, fragment, newline         → single newline
//! 4. bare fragment                      → nothing
//!
//! Whitespace between the fragment and the newlines is swallowed too. After a
//! successful removal, runs of three or more newlines collapse to two and the
//! result is trimmed. Text typed by the user that is byte-identical to a
//! fragment cannot be told apart and is removed as well.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline-run regex"));

/// Compiled removal patterns for one fragment, in the order they are tried.
#[derive(Debug, Clone)]
pub struct RemovalPatterns {
    ordered: [(Regex, &'static str); 4],
}

impl RemovalPatterns {
    pub fn new(fragment: &str) -> Result<Self, regex::Error> {
        let p = regex::escape(fragment);
        Ok(Self {
            ordered: [
                (Regex::new(&format!(r"{p}\s*\n\s*\n"))?, "\n"),
                (Regex::new(&format!(r"{p}\s*\n"))?, "\n"),
                (Regex::new(&format!(r"\n\s*{p}\s*\n"))?, "\n"),
                (Regex::new(&p)?, ""),
            ],
        })
    }

    /// Remove every occurrence using the first pattern that matches.
    /// Content without any occurrence comes back unchanged.
    #[must_use]
    pub fn strip<'a>(&self, content: &'a str) -> Cow<'a, str> {
        for (pattern, replacement) in &self.ordered {
            if let Cow::Owned(replaced) = pattern.replace_all(content, *replacement) {
                return Cow::Owned(tidy(&replaced));
            }
        }
        Cow::Borrowed(content)
    }
}

/// Remove `fragment` from `content` with freshly compiled patterns.
///
/// Falls back to a literal bare removal if the patterns cannot be compiled
/// (only possible for fragments large enough to exceed the regex size limit).
#[must_use]
pub fn strip_fragment(content: &str, fragment: &str) -> String {
    if fragment.is_empty() {
        return content.to_string();
    }
    match RemovalPatterns::new(fragment) {
        Ok(patterns) => patterns.strip(content).into_owned(),
        Err(err) => {
            tracing::debug!("removal patterns unavailable ({err}); using literal removal");
            strip_literal(content, fragment)
        }
    }
}

pub(crate) fn strip_literal(content: &str, fragment: &str) -> String {
    if content.contains(fragment) {
        tidy(&content.replace(fragment, ""))
    } else {
        content.to_string()
    }
}

fn tidy(content: &str) -> String {
    EXCESS_NEWLINES
        .replace_all(content, "\n\n")
        .trim()
        .to_string()
}
