//! Open-ended questions

use super::links::audio_player;
use super::{Classification, PreparedQuestion};
use crate::model::{Answer, AnswerType};
use crate::render::Renderer;
use crate::text::CONTENT_PREFIXES;

pub(super) fn classify(renderer: &Renderer<'_>, question: &PreparedQuestion<'_>) -> Classification {
    let mut content = renderer.content(&question.content, CONTENT_PREFIXES);
    if let Some(url) = &question.audio {
        content.push_str(&format!(r#"<div class="content">{}</div>"#, audio_player(url)));
    }

    let solution: Vec<_> = question
        .solution
        .iter()
        .chain(question.extra.iter())
        .copied()
        .collect();

    Classification {
        answer_type: AnswerType::OpenEnded,
        content,
        answers: vec![Answer::new(0, "", true)],
        explanation: renderer.content(&solution, &[]),
    }
}
