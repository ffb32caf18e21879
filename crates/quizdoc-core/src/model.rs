//! Conversion result tree
//!
//! The assembler produces either a flat list of questions or a list of
//! shared materials, each embedding its own questions. Both serialize to
//! the question-bank XML through [`crate::xml`].

use serde::Serialize;

use crate::diagnostics::ConversionError;
use crate::text::escape_html;

/// Answer-type variant of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnswerType {
    /// Lettered options, one or more correct
    SingleChoice,
    /// Ordered statements, each true or false
    TrueFalseSet,
    /// Inline `[[...]]` blanks
    FillBlank,
    /// Free-form answer
    OpenEnded,
}

impl AnswerType {
    /// `typeAnswer` code in the question bank
    pub fn type_code(&self) -> u8 {
        match self {
            AnswerType::SingleChoice => 0,
            AnswerType::TrueFalseSet => 1,
            AnswerType::OpenEnded => 3,
            AnswerType::FillBlank => 5,
        }
    }

    /// `template` code in the question bank
    pub fn template(&self) -> u8 {
        match self {
            AnswerType::FillBlank => 23,
            _ => 0,
        }
    }

    /// Short Vietnamese label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            AnswerType::SingleChoice => "TN",
            AnswerType::TrueFalseSet => "DS",
            AnswerType::FillBlank => "DT",
            AnswerType::OpenEnded => "TL",
        }
    }
}

/// One answer entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    /// 0-based position
    pub index: usize,
    /// Answer markup
    pub content: String,
    /// Whether this entry is correct
    pub is_correct: bool,
}

impl Answer {
    pub fn new(index: usize, content: impl Into<String>, is_correct: bool) -> Self {
        Self {
            index,
            content: content.into(),
            is_correct,
        }
    }
}

/// Hosting service of an embedded video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VideoProvider {
    Vimeo,
    YouTube,
}

impl VideoProvider {
    /// `typeContentMedia` code
    pub fn code(&self) -> &'static str {
        match self {
            VideoProvider::Vimeo => "CodeVimeo",
            VideoProvider::YouTube => "CodeYouTuBe",
        }
    }
}

/// Embedded video reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    /// Provider-specific video code
    pub code: String,
    pub provider: VideoProvider,
}

/// External media attached to a question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Media {
    /// Spoken version of the statement (`urlSpeechContent`)
    pub speech_url: Option<String>,
    /// Video shown with the statement
    pub video: Option<Video>,
    /// Spoken version of the explanation (`urlSpeechExplain`)
    pub explain_speech_url: Option<String>,
}

/// Classification fields shared by every question of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionMeta {
    /// Subject code (compound tag up to the first `_`)
    pub subject: String,
    /// Knowledge tag from the header
    pub tag: String,
    /// Post type from the header
    pub post_type: String,
    /// Knowledge level code (NB, TH, VD, VDC)
    pub level_code: String,
    /// Knowledge level rank, 0 to 3
    pub level: u8,
}

/// A classified question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    /// Global question index within the run
    pub index: usize,
    pub meta: QuestionMeta,
    pub answer_type: AnswerType,
    pub media: Media,
    /// Hint section of the solution, if any
    pub hint: Option<String>,
    /// Statement markup
    pub content: String,
    pub answers: Vec<Answer>,
    /// Explanation markup
    pub explanation: String,
}

impl QuestionResult {
    /// Stand-in for a question that failed to classify
    ///
    /// Keeps the question count and order intact; the explanation carries
    /// the error message, escaped since it may quote document text.
    pub fn placeholder(index: usize, meta: QuestionMeta, message: &str) -> Self {
        Self {
            index,
            meta,
            answer_type: AnswerType::OpenEnded,
            media: Media::default(),
            hint: None,
            content: String::new(),
            answers: Vec::new(),
            explanation: format!("Lỗi: {}", escape_html(message)),
        }
    }
}

/// A shared material block with its questions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialResult {
    /// 0-based material index (`groupQuestionMaterial`)
    pub index: usize,
    /// Subject of the first owning group with questions
    pub subject_id: String,
    /// Tag of the first owning group with questions
    pub knowledge_id: String,
    /// Material markup
    pub content: String,
    pub questions: Vec<QuestionResult>,
}

/// Result tree of one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConversionOutput {
    /// `<questions>` root
    Questions(Vec<QuestionResult>),
    /// `<itemDocuments>` root
    Materials(Vec<MaterialResult>),
}

impl ConversionOutput {
    /// Total number of questions in the tree
    pub fn question_count(&self) -> usize {
        match self {
            ConversionOutput::Questions(qs) => qs.len(),
            ConversionOutput::Materials(ms) => ms.iter().map(|m| m.questions.len()).sum(),
        }
    }

    /// All questions in encounter order
    pub fn questions(&self) -> Vec<&QuestionResult> {
        match self {
            ConversionOutput::Questions(qs) => qs.iter().collect(),
            ConversionOutput::Materials(ms) => ms.iter().flat_map(|m| m.questions.iter()).collect(),
        }
    }
}

/// Output of one conversion run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub output: ConversionOutput,
    pub errors: Vec<ConversionError>,
}

impl ConversionReport {
    /// Whether any diagnostic is an error or worse
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| e.is_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> QuestionMeta {
        QuestionMeta {
            subject: "TOANTHPT".to_string(),
            tag: "TOANTHPT_DS".to_string(),
            post_type: "1".to_string(),
            level_code: "NB".to_string(),
            level: 0,
        }
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(AnswerType::SingleChoice.type_code(), 0);
        assert_eq!(AnswerType::TrueFalseSet.type_code(), 1);
        assert_eq!(AnswerType::OpenEnded.type_code(), 3);
        assert_eq!(AnswerType::FillBlank.type_code(), 5);
        assert_eq!(AnswerType::FillBlank.template(), 23);
        assert_eq!(AnswerType::OpenEnded.template(), 0);
    }

    #[test]
    fn test_placeholder() {
        let q = QuestionResult::placeholder(4, meta(), "Thiếu 'Lời giải' trong câu: Câu 5");
        assert_eq!(q.index, 4);
        assert!(q.content.is_empty());
        assert!(q.answers.is_empty());
        assert!(q.explanation.starts_with("Lỗi: Thiếu"));
    }

    #[test]
    fn test_placeholder_escapes_quoted_text() {
        let q = QuestionResult::placeholder(0, meta(), "Thiếu 'Lời giải' trong câu: a<b và b>c & d");
        assert_eq!(
            q.explanation,
            "Lỗi: Thiếu &#039;Lời giải&#039; trong câu: a&lt;b và b&gt;c &amp; d"
        );
    }

    #[test]
    fn test_question_count_across_materials() {
        let q = QuestionResult::placeholder(0, meta(), "x");
        let output = ConversionOutput::Materials(vec![
            MaterialResult {
                index: 0,
                subject_id: "TOANTHPT".to_string(),
                knowledge_id: "TOANTHPT_DS".to_string(),
                content: String::new(),
                questions: vec![q.clone(), q.clone()],
            },
            MaterialResult {
                index: 1,
                subject_id: String::new(),
                knowledge_id: String::new(),
                content: String::new(),
                questions: vec![q],
            },
        ]);
        assert_eq!(output.question_count(), 3);
        assert_eq!(output.questions().len(), 3);
    }

    #[test]
    fn test_video_provider_codes() {
        assert_eq!(VideoProvider::Vimeo.code(), "CodeVimeo");
        assert_eq!(VideoProvider::YouTube.code(), "CodeYouTuBe");
    }
}
