//! True/false statement sets

use std::sync::OnceLock;

use regex::Regex;

use super::{split_items, with_audio, Classification, PreparedQuestion};
use crate::error::{ClassifyError, Result};
use crate::model::{Answer, AnswerType};
use crate::render::Renderer;
use crate::text::{Prefix, CONTENT_PREFIXES};

fn is_statement_start(text: &str) -> bool {
    static STATEMENT_RE: OnceLock<Regex> = OnceLock::new();
    let re = STATEMENT_RE.get_or_init(|| Regex::new(r"^[a-z][.)]").unwrap());
    re.is_match(text)
}

pub(super) fn classify(
    renderer: &Renderer<'_>,
    question: &PreparedQuestion<'_>,
) -> Result<Classification> {
    let (intro, statements) = split_items(&question.content, is_statement_start);
    if statements.is_empty() {
        return Err(ClassifyError::NoStatements);
    }

    let key: Vec<char> = question.answer_key.chars().collect();
    if key.len() != statements.len() {
        return Err(ClassifyError::AnswerCountMismatch {
            key: key.len(),
            statements: statements.len(),
        });
    }

    let answers = statements
        .iter()
        .zip(&key)
        .enumerate()
        .map(|(i, (blocks, flag))| {
            Answer::new(i, renderer.blocks(blocks, &[Prefix::Statement]), *flag == '1')
        })
        .collect();

    let explanation_blocks = question.explanation_blocks();
    let explanation = if explanation_blocks.is_empty() {
        String::new()
    } else {
        renderer.content(&explanation_blocks, &[])
    };

    Ok(Classification {
        answer_type: AnswerType::TrueFalseSet,
        content: with_audio(
            renderer.content(&intro, CONTENT_PREFIXES),
            question.audio.as_deref(),
        ),
        answers,
        explanation,
    })
}
