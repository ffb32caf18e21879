//! Fill-in-the-blank questions
//!
//! Every `[[...]]` span of the statement is a blank. The statement is laid
//! out as a title, intro lines and an answer area in which each blank is
//! replaced by an `<input>` box numbered from 1.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{is_blank_html, Classification, PreparedQuestion};
use crate::error::{ClassifyError, Result};
use crate::model::{Answer, AnswerType};
use crate::render::Renderer;
use crate::text::{content_start, escape_html, html_to_text, Prefix, CONTENT_PREFIXES};

/// Title for blanks expecting words
pub const TEXT_TITLE: &str = "Điền đáp án thích hợp vào ô trống";
/// Title for blanks expecting numbers only
pub const NUMBER_TITLE: &str =
    "Điền đáp án thích hợp vào ô trống (chỉ sử dụng chữ số, dấu \",\" và dấu \"-\")";

fn blank_re() -> &'static Regex {
    static BLANK_RE: OnceLock<Regex> = OnceLock::new();
    BLANK_RE.get_or_init(|| Regex::new(r"\[\[(.*?)\]\]").unwrap())
}

/// Normalize a typed answer: straight quotes, `|` alternatives as `[-]`
pub fn normalize_answer(answer: &str) -> String {
    answer
        .trim()
        .replace(&['\u{2018}', '\u{2019}'][..], "'")
        .replace(&['\u{201C}', '\u{201D}'][..], "\"")
        .replace('|', "[-]")
}

/// Whether a title line has real text once markup and the number are gone
fn is_meaningful_title(line: &str) -> bool {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER_RE.get_or_init(|| Regex::new(r"(?i)c[âa]u\s*\d+[:.]?").unwrap());
    let text = html_to_text(line);
    re.replace_all(&text, "").trim().chars().count() > 3
}

fn default_title(answers: &[String]) -> &'static str {
    if answers.iter().any(|a| a.chars().any(char::is_alphabetic)) {
        TEXT_TITLE
    } else {
        NUMBER_TITLE
    }
}

fn input_box(number: usize) -> String {
    format!(
        r#"<span class="ans-span-second"></span><input class="can-resize-second" type="text" id="mathplay-answer-{}">"#,
        number
    )
}

pub(super) fn classify(
    renderer: &Renderer<'_>,
    question: &PreparedQuestion<'_>,
    default_title_subject: bool,
) -> Result<Classification> {
    let re = blank_re();
    let lines = renderer.lines(&question.content, CONTENT_PREFIXES);

    let answers: Vec<String> = lines
        .iter()
        .flat_map(|line| re.captures_iter(line).map(|c| c[1].to_string()))
        .map(|raw| normalize_answer(&html_to_text(&raw)))
        .collect();
    if answers.is_empty() {
        return Err(ClassifyError::NoBlanks);
    }

    let (title, body) = match lines.split_first() {
        Some((first, rest)) if !re.is_match(first) => {
            if !is_meaningful_title(first) {
                (default_title(&answers).to_string(), rest)
            } else if default_title_subject {
                (default_title(&answers).to_string(), &lines[..])
            } else {
                (first.clone(), rest)
            }
        }
        _ => (default_title(&answers).to_string(), &lines[..]),
    };

    let split = body
        .iter()
        .position(|line| re.is_match(line))
        .or_else(|| body.iter().position(|line| !line.trim().is_empty()))
        .unwrap_or(body.len());

    let mut content = format!(r#"<div class="title">{}</div>"#, title);
    for line in body[..split].iter().filter(|l| !l.trim().is_empty()) {
        content.push_str(&format!(r#"<div class="content">{}</div>"#, line));
    }

    content.push_str(r#"<div class="answer-input">"#);
    let mut number = 0;
    for line in &body[split..] {
        let replaced = re.replace_all(line, |_: &Captures| {
            number += 1;
            input_box(number)
        });
        if replaced.trim().is_empty() {
            continue;
        }
        if replaced.contains("<center>") {
            content.push_str(&format!("<div>{}</div>", replaced));
        } else {
            content.push_str(&format!(r#"<div class="line">{}</div>"#, replaced));
        }
    }
    content.push_str("</div>");

    let explanation = explanation(renderer, question);
    let explanation = if is_blank_html(&explanation) {
        format!(
            "Đáp án đúng theo thứ tự là: {}",
            escape_html(&answers.join(","))
        )
    } else {
        explanation
    };

    Ok(Classification {
        answer_type: AnswerType::FillBlank,
        content,
        answers: answers
            .iter()
            .enumerate()
            .map(|(i, a)| Answer::new(i, escape_html(a), true))
            .collect(),
        explanation,
    })
}

/// Key paragraph past its `##` marker, then the rest of the solution
fn explanation(renderer: &Renderer<'_>, question: &PreparedQuestion<'_>) -> String {
    let key_has_text = content_start(&question.answer_key, 0, &[Prefix::BlankMarker])
        < question.answer_key.chars().count();

    if key_has_text {
        let blocks: Vec<_> = question
            .solution
            .iter()
            .chain(question.extra.iter())
            .copied()
            .collect();
        renderer.content(&blocks, &[Prefix::BlankMarker])
    } else {
        let blocks = question.explanation_blocks();
        if blocks.is_empty() {
            return String::new();
        }
        renderer.content(&blocks, &[])
    }
}
