//! Question classification
//!
//! A question's blocks are split into the statement and the solution
//! segments (at `Lời giải` paragraphs). The first solution paragraph is
//! the answer key and decides the answer type:
//!
//! | key                  | type           |
//! |----------------------|----------------|
//! | `1010` (2+ of 0/1)   | TrueFalseSet   |
//! | `2`, `13`            | SingleChoice   |
//! | `## ...`             | FillBlank      |
//! | anything else        | OpenEnded      |
//!
//! Subjects of the specialized family go to a [`SpecializedClassifier`]
//! when one is installed.

mod choice;
mod fill_blank;
pub mod links;
mod open_ended;
mod true_false;

use std::sync::OnceLock;

use quizdoc_ast::Block;
use regex::Regex;

use crate::config::SubjectSettings;
use crate::diagnostics::ConversionError;
use crate::error::{ClassifyError, Result};
use crate::model::{Answer, AnswerType, Media, QuestionMeta, QuestionResult};
use crate::render::Renderer;
use crate::segment::QuestionBlock;
use crate::text::{find_urls, html_to_text, Prefix};

pub use fill_blank::normalize_answer;
use links::{audio_player, classify_links, is_speech_link};

/// A question split into its parts, ready for variant extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedQuestion<'a> {
    /// Statement blocks, starting with the `Câu N` paragraph
    pub content: Vec<&'a Block>,
    /// First solution segment up to the hint marker; the key comes first
    pub solution: Vec<&'a Block>,
    /// Blocks of any further `Lời giải` segments
    pub extra: Vec<&'a Block>,
    /// Blocks after the `###` hint marker
    pub hint: Vec<&'a Block>,
    /// Recording announced by an `Audio:` line
    pub audio: Option<String>,
    /// Plain text of the first solution paragraph
    pub answer_key: String,
}

impl<'a> PreparedQuestion<'a> {
    /// Solution blocks after the answer key
    pub fn explanation_blocks(&self) -> Vec<&'a Block> {
        self.solution
            .iter()
            .skip(1)
            .chain(self.extra.iter())
            .copied()
            .collect()
    }
}

/// Variant-specific part of a question result
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub answer_type: AnswerType,
    pub content: String,
    pub answers: Vec<Answer>,
    pub explanation: String,
}

/// Classifier for the specialized subject family
pub trait SpecializedClassifier {
    /// Classify one prepared question of `subject`
    fn classify_specialized(
        &self,
        question: &PreparedQuestion<'_>,
        subject: &str,
        renderer: &Renderer<'_>,
    ) -> Result<Classification>;
}

/// Answer type selected by an answer key
pub fn answer_type_for_key(key: &str) -> AnswerType {
    let key = key.trim();
    if key.chars().count() >= 2 && key.chars().all(|c| c == '0' || c == '1') {
        AnswerType::TrueFalseSet
    } else if key.starts_with(|c: char| c.is_ascii_digit()) {
        AnswerType::SingleChoice
    } else if key.starts_with("##") {
        AnswerType::FillBlank
    } else {
        AnswerType::OpenEnded
    }
}

/// Whether a paragraph text is a `Lời giải` marker
pub fn is_solution_marker(text: &str) -> bool {
    static SOLUTION_RE: OnceLock<Regex> = OnceLock::new();
    // Accept decomposed diacritics as well
    let re = SOLUTION_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*l(?:ờ|ơ\x{300}|o\x{31B}\x{300})i\s+gi(?:ả|a\x{309})i\s*[:：]?").unwrap()
    });
    re.is_match(text)
}

/// Split question blocks at solution markers
///
/// The first block always belongs to the statement; marker paragraphs
/// are consumed.
pub fn split_segments<'a>(blocks: &[&'a Block]) -> Vec<Vec<&'a Block>> {
    let mut segments: Vec<Vec<&'a Block>> = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            if let Block::Paragraph(p) = block {
                if is_solution_marker(&p.plain_text()) {
                    segments.push(Vec::new());
                    continue;
                }
            }
        }
        match segments.last_mut() {
            Some(segment) => segment.push(*block),
            None => segments.push(vec![*block]),
        }
    }
    segments
}

/// Split statement blocks into the intro and the items opened by `opens`
///
/// The first block is always part of the intro. Blocks following an
/// item start attach to that item.
pub(crate) fn split_items<'a>(
    blocks: &[&'a Block],
    opens: impl Fn(&str) -> bool,
) -> (Vec<&'a Block>, Vec<Vec<&'a Block>>) {
    let mut intro = Vec::new();
    let mut items: Vec<Vec<&'a Block>> = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        let starts_item = index > 0
            && matches!(block, Block::Paragraph(p) if opens(p.plain_text().trim()));
        if starts_item {
            items.push(vec![*block]);
        } else if let Some(item) = items.last_mut() {
            item.push(*block);
        } else {
            intro.push(*block);
        }
    }
    (intro, items)
}

/// Rendered markup with no visible text and no image
pub(crate) fn is_blank_html(html: &str) -> bool {
    html_to_text(html).trim().is_empty() && !html.contains("<img")
}

/// Append the audio player after the statement
pub(crate) fn with_audio(content: String, audio: Option<&str>) -> String {
    match audio {
        Some(url) => content + &audio_player(url),
        None => content,
    }
}

fn without_urls(text: &str, urls: &[&str]) -> String {
    urls.iter()
        .fold(text.to_string(), |acc, url| acc.replace(url, ""))
        .trim()
        .to_string()
}

/// Classifies questions of one document
pub struct Classifier<'a> {
    renderer: Renderer<'a>,
    subjects: &'a SubjectSettings,
    specialized: Option<&'a dyn SpecializedClassifier>,
}

impl<'a> Classifier<'a> {
    pub fn new(renderer: Renderer<'a>, subjects: &'a SubjectSettings) -> Self {
        Self {
            renderer,
            subjects,
            specialized: None,
        }
    }

    /// Install a classifier for the specialized subject family
    pub fn with_specialized(mut self, specialized: &'a dyn SpecializedClassifier) -> Self {
        self.specialized = Some(specialized);
        self
    }

    /// Classify one question
    ///
    /// Never fails: a question that cannot be classified yields a
    /// placeholder and an error diagnostic. Dropped links are reported as
    /// warnings.
    pub fn classify(
        &self,
        question: &QuestionBlock<'_>,
        meta: QuestionMeta,
        index: usize,
        errors: &mut Vec<ConversionError>,
    ) -> QuestionResult {
        let mut warnings = Vec::new();
        let outcome = self.try_classify(&question.blocks, &meta.subject, &mut warnings);

        for warning in warnings {
            log::warn!("Câu {}: {}", index, warning);
            errors.push(ConversionError::warning(warning).with_question(index));
        }

        match outcome {
            Ok((classification, media, hint)) => QuestionResult {
                index,
                meta,
                answer_type: classification.answer_type,
                media,
                hint,
                content: classification.content,
                answers: classification.answers,
                explanation: classification.explanation,
            },
            Err(err) => {
                let message = err.to_string();
                log::warn!("Câu {}: {}", index, message);
                errors.push(ConversionError::error(message.clone()).with_question(index));
                QuestionResult::placeholder(index, meta, &message)
            }
        }
    }

    fn try_classify(
        &self,
        blocks: &[&Block],
        subject: &str,
        warnings: &mut Vec<String>,
    ) -> Result<(Classification, Media, Option<String>)> {
        let (question, media) = prepare(blocks, warnings)?;
        let answer_type = answer_type_for_key(&question.answer_key);
        log::debug!("Answer key {:?} -> {}", question.answer_key, answer_type.label());

        let classification = match self.specialized {
            Some(specialized) if self.subjects.is_specialized(subject) => {
                specialized.classify_specialized(&question, subject, &self.renderer)?
            }
            _ => {
                if self.subjects.is_specialized(subject) {
                    log::debug!("No specialized classifier for {}, using standard rules", subject);
                }
                match answer_type {
                    AnswerType::SingleChoice => choice::classify(&self.renderer, &question)?,
                    AnswerType::TrueFalseSet => true_false::classify(&self.renderer, &question)?,
                    AnswerType::FillBlank => fill_blank::classify(
                        &self.renderer,
                        &question,
                        self.subjects.uses_default_title(subject),
                    )?,
                    AnswerType::OpenEnded => open_ended::classify(&self.renderer, &question),
                }
            }
        };

        let hint = (!question.hint.is_empty())
            .then(|| self.renderer.content(&question.hint, &[Prefix::BlankMarker]));
        Ok((classification, media, hint))
    }
}

/// Split a question and pull the media links out of it
pub fn prepare<'a>(
    blocks: &[&'a Block],
    warnings: &mut Vec<String>,
) -> Result<(PreparedQuestion<'a>, Media)> {
    let mut segments = split_segments(blocks).into_iter();
    let (Some(statement), Some(solution)) = (segments.next(), segments.next()) else {
        let first: String = blocks
            .first()
            .map(|b| b.plain_text())
            .unwrap_or_default()
            .trim()
            .chars()
            .take(50)
            .collect();
        return Err(ClassifyError::MissingSolution(first));
    };
    let extra: Vec<&Block> = segments.flatten().collect();

    let mut question = PreparedQuestion {
        extra,
        ..Default::default()
    };
    let mut links: Vec<String> = Vec::new();
    let mut awaiting_audio = false;

    for block in statement {
        let Block::Paragraph(para) = block else {
            question.content.push(block);
            continue;
        };
        let text = para.plain_text();
        let text = text.trim();

        if awaiting_audio {
            awaiting_audio = false;
            if let Some(url) = find_urls(text).first() {
                question.audio = Some(url.to_string());
                continue;
            }
        }

        if let Some(rest) = text.strip_prefix("Audio:") {
            let url = find_urls(rest)
                .first()
                .map(|u| u.to_string())
                .or_else(|| Some(rest.trim().to_string()).filter(|r| !r.is_empty()));
            match url {
                Some(url) if question.audio.is_some() => {
                    warnings.push(format!("Chỉ được 1 link Audio: {}", url))
                }
                Some(url) => question.audio = Some(url),
                None => awaiting_audio = true,
            }
            continue;
        }

        let bare = find_urls(text);
        let found = bare
            .iter()
            .copied()
            .chain(para.hyperlinks())
            .map(str::to_string);
        for url in found {
            if !links.contains(&url) {
                links.push(url);
            }
        }
        if !bare.is_empty() && without_urls(text, &bare).is_empty() {
            continue;
        }
        question.content.push(block);
    }

    let mut media = Media::default();
    warnings.extend(classify_links(&links, &mut media));

    let mut in_hint = false;
    for (index, block) in solution.into_iter().enumerate() {
        if index > 0 {
            if let Block::Paragraph(para) = block {
                let text = para.plain_text();
                let text = text.trim();
                if text.starts_with("###") {
                    in_hint = true;
                    if text.trim_start_matches('#').trim().is_empty() {
                        continue;
                    }
                }

                let urls = find_urls(text);
                for url in urls.iter().filter(|u| is_speech_link(u)) {
                    if media.explain_speech_url.is_some() {
                        warnings.push(format!("HDG chỉ được có 1 link TTS: {}", url));
                    } else {
                        media.explain_speech_url = Some(url.to_string());
                    }
                }
                if !urls.is_empty() && without_urls(text, &urls).is_empty() {
                    continue;
                }
            }
        }
        if in_hint {
            question.hint.push(block);
        } else {
            question.solution.push(block);
        }
    }

    question.answer_key = question
        .solution
        .first()
        .map(|b| b.plain_text().trim().to_string())
        .unwrap_or_default();

    Ok((question, media))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSettings;
    use quizdoc_ast::{NoImages, Paragraph, Run, Table, TableCell};

    fn para(text: &str) -> Block {
        Block::Paragraph(Paragraph::from_text(text))
    }

    fn meta(subject: &str) -> QuestionMeta {
        QuestionMeta {
            subject: subject.to_string(),
            tag: format!("{}_X", subject),
            post_type: "1".to_string(),
            level_code: "NB".to_string(),
            level: 0,
        }
    }

    fn classify_in(subject: &str, blocks: &[Block]) -> (QuestionResult, Vec<ConversionError>) {
        let render = RenderSettings::default();
        let subjects = SubjectSettings::default();
        let classifier = Classifier::new(Renderer::new(&NoImages, &render), &subjects);
        let question = QuestionBlock {
            tag: "T".to_string(),
            blocks: blocks.iter().collect(),
        };
        let mut errors = Vec::new();
        let result = classifier.classify(&question, meta(subject), 0, &mut errors);
        (result, errors)
    }

    fn classify(blocks: &[Block]) -> (QuestionResult, Vec<ConversionError>) {
        classify_in("TOANTHCS", blocks)
    }

    fn flags(result: &QuestionResult) -> Vec<bool> {
        result.answers.iter().map(|a| a.is_correct).collect()
    }

    #[test]
    fn test_answer_type_for_key() {
        assert_eq!(answer_type_for_key("1010"), AnswerType::TrueFalseSet);
        assert_eq!(answer_type_for_key("10"), AnswerType::TrueFalseSet);
        assert_eq!(answer_type_for_key("1"), AnswerType::SingleChoice);
        assert_eq!(answer_type_for_key("0"), AnswerType::SingleChoice);
        assert_eq!(answer_type_for_key("12"), AnswerType::SingleChoice);
        assert_eq!(answer_type_for_key("## 4"), AnswerType::FillBlank);
        assert_eq!(answer_type_for_key("Ta có x = 2"), AnswerType::OpenEnded);
        assert_eq!(answer_type_for_key(""), AnswerType::OpenEnded);
    }

    #[test]
    fn test_solution_marker() {
        assert!(is_solution_marker("Lời giải"));
        assert!(is_solution_marker("  lời giải:"));
        assert!(is_solution_marker("LỜI GIẢI："));
        assert!(is_solution_marker("Lo\u{31B}\u{300}i gia\u{309}i"));
        assert!(!is_solution_marker("Giải"));
    }

    #[test]
    fn test_split_segments() {
        let blocks = [para("Câu 1. x"), para("y"), para("Lời giải"), para("1"), para("Lời giải"), para("z")];
        let refs: Vec<&Block> = blocks.iter().collect();
        let segments = split_segments(&refs);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].len(), 1);
        assert_eq!(segments[2][0].plain_text(), "z");
    }

    #[test]
    fn test_missing_solution_gives_placeholder() {
        let (result, errors) = classify(&[para("Câu 1. Không có lời giải"), para("A. 1")]);
        assert_eq!(result.answer_type, AnswerType::OpenEnded);
        assert!(result.content.is_empty());
        assert!(result.explanation.starts_with("Lỗi: Thiếu &#039;Lời giải&#039; trong câu: Câu 1."));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].question_index, Some(0));
    }

    #[test]
    fn test_single_choice() {
        let (result, errors) = classify(&[
            para("Câu 1. 1 + 1 = ?"),
            para("A. 1"),
            para("B. 2"),
            para("C. 3"),
            para("D. 4"),
            para("Lời giải"),
            para("2"),
            para("Giải thích: 1 + 1 = 2"),
        ]);
        assert!(errors.is_empty());
        assert_eq!(result.answer_type, AnswerType::SingleChoice);
        assert_eq!(result.content, r#"<div class="content">1 + 1 = ?</div>"#);
        assert_eq!(flags(&result), vec![false, true, false, false]);
        assert_eq!(result.answers[1].content, "2");
        assert_eq!(result.explanation, r#"<div class="content">1 + 1 = 2</div>"#);
    }

    #[test]
    fn test_single_choice_default_explanation_and_continuation() {
        let (result, _) = classify(&[
            para("Câu 2. Chọn"),
            para("A. x"),
            para("tiếp x"),
            para("B. y"),
            para("Lời giải"),
            para("13"),
        ]);
        assert_eq!(result.answers[0].content, "x<br>tiếp x");
        assert_eq!(flags(&result), vec![true, false]);
        assert_eq!(result.explanation, "Đáp án đúng");
    }

    #[test]
    fn test_single_choice_key_out_of_range() {
        let (result, errors) = classify(&[para("Câu 1. x"), para("A. 1"), para("Lời giải"), para("5")]);
        assert!(result.answers.is_empty());
        assert!(errors[0].message.contains("'5'"));
    }

    #[test]
    fn test_true_false() {
        let (result, errors) = classify(&[
            para("Câu 3. Xét tính đúng sai"),
            para("a) 2 là số chẵn"),
            para("b) 3 là số chẵn"),
            para("c. 4 là số chẵn"),
            para("d) 5 là số chẵn"),
            para("Lời giải"),
            para("1010"),
        ]);
        assert!(errors.is_empty());
        assert_eq!(result.answer_type, AnswerType::TrueFalseSet);
        assert_eq!(flags(&result), vec![true, false, true, false]);
        assert_eq!(result.answers[0].content, "2 là số chẵn");
        assert_eq!(result.answers[2].content, "4 là số chẵn");
        assert_eq!(result.explanation, "");
    }

    #[test]
    fn test_true_false_count_mismatch() {
        let (result, errors) = classify(&[
            para("Câu 3. x"),
            para("a) p"),
            para("b) q"),
            para("Lời giải"),
            para("101"),
        ]);
        assert_eq!(errors[0].message, "Số đáp án không khớp: 3 vs 2");
        assert!(result.explanation.contains("Số đáp án không khớp"));
    }

    #[test]
    fn test_fill_blank() {
        let (result, errors) = classify(&[para("Câu 4. 2 + 2 = [[4]]"), para("Lời giải"), para("##")]);
        assert!(errors.is_empty());
        assert_eq!(result.answer_type, AnswerType::FillBlank);
        assert_eq!(result.answers.len(), 1);
        assert_eq!(result.answers[0].content, "4");
        assert_eq!(result.content.matches("<input").count(), 1);
        assert_eq!(result.explanation, "Đáp án đúng theo thứ tự là: 4");
    }

    #[test]
    fn test_open_ended() {
        let (result, _) = classify(&[
            para("Câu 5. Trình bày"),
            para("Lời giải"),
            para("Ta có"),
            para("Kết luận"),
        ]);
        assert_eq!(result.answer_type, AnswerType::OpenEnded);
        assert_eq!(result.answers, vec![Answer::new(0, "", true)]);
        assert_eq!(result.explanation, r#"<div class="content">Ta có<br>Kết luận</div>"#);
    }

    #[test]
    fn test_links_and_audio_extracted() {
        let (result, errors) = classify(&[
            para("Câu 6. Nghe"),
            para("Audio:"),
            para("https://cdn.x/nghe.mp3"),
            para("https://cdn.x/doc.mp3"),
            Block::Paragraph(Paragraph::from_runs(vec![
                Run::text("Xem video").with_hyperlink("https://youtu.be/abc"),
            ])),
            para("https://cdn.x/khac.mp3"),
            para("A. x"),
            para("Lời giải"),
            para("1"),
            para("https://cdn.x/giai.mp3"),
        ]);
        assert_eq!(result.media.speech_url.as_deref(), Some("https://cdn.x/doc.mp3"));
        assert_eq!(result.media.video.as_ref().unwrap().code, "abc");
        assert_eq!(result.media.explain_speech_url.as_deref(), Some("https://cdn.x/giai.mp3"));
        assert!(result.content.contains(r#"<source src="https://cdn.x/nghe.mp3""#));
        assert!(result.content.contains("Xem video"));
        assert!(!result.content.contains("doc.mp3"));
        assert_eq!(result.explanation, "Đáp án đúng");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("khac.mp3"));
    }

    #[test]
    fn test_hint_section() {
        let (result, _) = classify(&[
            para("Câu 7. x"),
            para("A. 1"),
            para("Lời giải"),
            para("1"),
            para("Vì vậy"),
            para("###"),
            para("Gợi ý"),
        ]);
        assert_eq!(result.explanation, r#"<div class="content">Vì vậy</div>"#);
        assert_eq!(result.hint.as_deref(), Some(r#"<div class="content">Gợi ý</div>"#));
    }

    #[test]
    fn test_table_key_gives_open_ended() {
        let table = Block::Table(Table::from_rows(vec![vec![TableCell::from_text("1")]]));
        let (result, _) = classify(&[para("Câu 8. x"), para("Lời giải"), table]);
        assert_eq!(result.answer_type, AnswerType::OpenEnded);
        assert!(result.explanation.contains("<table"));
    }

    struct Fixed;

    impl SpecializedClassifier for Fixed {
        fn classify_specialized(
            &self,
            question: &PreparedQuestion<'_>,
            subject: &str,
            _renderer: &Renderer<'_>,
        ) -> Result<Classification> {
            if question.answer_key == "9" {
                return Err(ClassifyError::Specialized(format!("{} không hỗ trợ", subject)));
            }
            Ok(Classification {
                answer_type: AnswerType::OpenEnded,
                content: format!("{}:{}", subject, question.answer_key),
                answers: Vec::new(),
                explanation: String::new(),
            })
        }
    }

    #[test]
    fn test_specialized_routing() {
        let render = RenderSettings::default();
        let subjects = SubjectSettings::default();
        let fixed = Fixed;
        let classifier =
            Classifier::new(Renderer::new(&NoImages, &render), &subjects).with_specialized(&fixed);
        let blocks = [para("Câu 1. x"), para("Lời giải"), para("1")];
        let question = QuestionBlock {
            tag: "T".to_string(),
            blocks: blocks.iter().collect(),
        };
        let mut errors = Vec::new();

        let result = classifier.classify(&question, meta("TINHOCTHPT"), 0, &mut errors);
        assert_eq!(result.content, "TINHOCTHPT:1");

        // Standard rules: a single-choice key without options
        let result = classifier.classify(&question, meta("TOANTHPT"), 1, &mut errors);
        assert!(result.explanation.starts_with("Lỗi: "));
        assert_eq!(errors.len(), 1);

        let blocks = [para("Câu 1. x"), para("Lời giải"), para("9")];
        let question = QuestionBlock {
            tag: "T".to_string(),
            blocks: blocks.iter().collect(),
        };
        let result = classifier.classify(&question, meta("TINHOC3"), 2, &mut errors);
        assert_eq!(result.explanation, "Lỗi: TINHOC3 không hỗ trợ");
    }

    #[test]
    fn test_specialized_without_classifier_uses_standard_rules() {
        let (result, _) = classify_in(
            "TINHOC",
            &[para("Câu 1. x"), para("A. a"), para("B. b"), para("Lời giải"), para("2")],
        );
        assert_eq!(result.answer_type, AnswerType::SingleChoice);
        assert_eq!(flags(&result), vec![false, true]);
    }
}
