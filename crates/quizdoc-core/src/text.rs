//! Text utilities shared by the renderer and the classifier
//!
//! Content-start detection finds where the meaningful text of a paragraph
//! begins once conventional prefixes ("Câu 1.", "HL:", "A.") are cut off.

use std::sync::OnceLock;

use regex::Regex;

/// A conventional paragraph prefix removed before rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// `Câu N.` / `Câu N:` question number (first paragraph only)
    Question,
    /// `HL:` shared-material marker
    Material,
    /// `A.` choice letter
    Option,
    /// `a)` / `a.` true/false statement label (first paragraph only)
    Statement,
    /// `Giải thích:` / `Hướng dẫn giải:` label (first paragraph only)
    ExplanationLabel,
    /// `##` fill-in answer marker (first paragraph only)
    BlankMarker,
}

/// Prefixes cut from ordinary question content, in match order
pub const CONTENT_PREFIXES: &[Prefix] = &[Prefix::Question, Prefix::Material, Prefix::Option];

impl Prefix {
    fn regex(self) -> &'static Regex {
        static QUESTION_RE: OnceLock<Regex> = OnceLock::new();
        static MATERIAL_RE: OnceLock<Regex> = OnceLock::new();
        static OPTION_RE: OnceLock<Regex> = OnceLock::new();
        static STATEMENT_RE: OnceLock<Regex> = OnceLock::new();
        static LABEL_RE: OnceLock<Regex> = OnceLock::new();
        static MARKER_RE: OnceLock<Regex> = OnceLock::new();

        match self {
            Prefix::Question => {
                QUESTION_RE.get_or_init(|| Regex::new(r"(?i)^c[âa]u\s*\d+[.:]\s*").unwrap())
            }
            Prefix::Material => MATERIAL_RE.get_or_init(|| Regex::new(r"(?i)^HL:\s*").unwrap()),
            Prefix::Option => OPTION_RE.get_or_init(|| Regex::new(r"^[A-Z]\.\s*").unwrap()),
            Prefix::Statement => {
                STATEMENT_RE.get_or_init(|| Regex::new(r"^[a-z][.)]\s*").unwrap())
            }
            Prefix::ExplanationLabel => LABEL_RE.get_or_init(|| {
                Regex::new(r"(?i)^(?:giải\s+thích|hướng\s+dẫn\s+giải)\s*[:：]\s*").unwrap()
            }),
            Prefix::BlankMarker => MARKER_RE.get_or_init(|| Regex::new(r"^#+\s*").unwrap()),
        }
    }

    /// Only tested against the first paragraph of a block sequence
    fn first_only(self) -> bool {
        matches!(
            self,
            Prefix::Question | Prefix::Statement | Prefix::ExplanationLabel | Prefix::BlankMarker
        )
    }
}

/// Character offset where a paragraph's content starts
///
/// Each prefix is tried once, in order, against the text remaining after
/// the previous cuts.
///
/// ```
/// use quizdoc_core::text::{content_start, CONTENT_PREFIXES};
///
/// assert_eq!(content_start("Câu 1. Tính", 0, CONTENT_PREFIXES), 7);
/// assert_eq!(content_start("Câu 1. Tính", 1, CONTENT_PREFIXES), 0);
/// assert_eq!(content_start("B. 4", 3, CONTENT_PREFIXES), 3);
/// ```
pub fn content_start(text: &str, paragraph_index: usize, prefixes: &[Prefix]) -> usize {
    let mut offset = 0;
    for prefix in prefixes {
        if prefix.first_only() && paragraph_index > 0 {
            continue;
        }
        if let Some(m) = prefix.regex().find(&text[offset..]) {
            offset += m.end();
        }
    }
    text[..offset].chars().count()
}

/// Escape the five HTML-special characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_html`], plus `&nbsp;`
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Remove every markup tag
pub fn strip_tags(html: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap());
    re.replace_all(html, "").into_owned()
}

/// Visible text of a markup fragment
pub fn html_to_text(html: &str) -> String {
    unescape_html(&strip_tags(html))
}

/// Bare `http(s)://` URLs in a text, in order
pub fn find_urls(text: &str) -> Vec<&str> {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    let re = URL_RE.get_or_init(|| Regex::new(r"https?://[^\s]+").unwrap());
    re.find_iter(text).map(|m| m.as_str()).collect()
}
