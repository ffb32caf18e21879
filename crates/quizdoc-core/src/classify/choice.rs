//! Single-choice questions

use std::sync::OnceLock;

use regex::Regex;

use super::{is_blank_html, split_items, with_audio, Classification, PreparedQuestion};
use crate::error::{ClassifyError, Result};
use crate::model::{Answer, AnswerType};
use crate::render::Renderer;
use crate::text::{Prefix, CONTENT_PREFIXES};

/// Explanation used when the solution has no text after the key
pub const DEFAULT_EXPLANATION: &str = "Đáp án đúng";

fn is_option_start(text: &str) -> bool {
    static OPTION_RE: OnceLock<Regex> = OnceLock::new();
    let re = OPTION_RE.get_or_init(|| Regex::new(r"^[A-Z]\.").unwrap());
    re.is_match(text)
}

pub(super) fn classify(
    renderer: &Renderer<'_>,
    question: &PreparedQuestion<'_>,
) -> Result<Classification> {
    let (intro, options) = split_items(&question.content, is_option_start);
    if options.is_empty() {
        return Err(ClassifyError::NoOptions);
    }

    // Every digit of the key is a 1-based option number
    let selected: Vec<u32> = question
        .answer_key
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    let answers: Vec<Answer> = options
        .iter()
        .enumerate()
        .map(|(i, blocks)| {
            Answer::new(
                i,
                renderer.blocks(blocks, CONTENT_PREFIXES),
                selected.contains(&(i as u32 + 1)),
            )
        })
        .collect();
    if !answers.iter().any(|a| a.is_correct) {
        return Err(ClassifyError::NoCorrectOption {
            key: question.answer_key.clone(),
            options: answers.len(),
        });
    }

    let explanation_blocks = question.explanation_blocks();
    let explanation = renderer.content(&explanation_blocks, &[Prefix::ExplanationLabel]);
    let explanation = if is_blank_html(&explanation) {
        DEFAULT_EXPLANATION.to_string()
    } else {
        explanation
    };

    Ok(Classification {
        answer_type: AnswerType::SingleChoice,
        content: with_audio(
            renderer.content(&intro, CONTENT_PREFIXES),
            question.audio.as_deref(),
        ),
        answers,
        explanation,
    })
}
