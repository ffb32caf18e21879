//! Document segmentation
//!
//! A single pass over the body blocks splits the document into groups
//! (opened by `[tag, posttype, level]` headers), questions (opened by
//! `Câu N` paragraphs) and shared materials (opened by `HL:` paragraphs).
//!
//! [`Segmenter`] is the scanner state; feed it blocks in order with
//! [`Segmenter::push`] and collect the result with [`Segmenter::finish`].

use std::sync::OnceLock;

use quizdoc_ast::Block;
use regex::Regex;

use crate::diagnostics::ConversionError;
use crate::model::QuestionMeta;

/// Knowledge level codes, in rank order
pub const LEVEL_CODES: [&str; 4] = ["NB", "TH", "VD", "VDC"];

/// Raw blocks of one question
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBlock<'a> {
    /// Header tag in force when the question started
    pub tag: String,
    /// Blocks from the `Câu N` paragraph up to the next question
    pub blocks: Vec<&'a Block>,
}

/// Questions sharing one classification header
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub meta: QuestionMeta,
    pub questions: Vec<QuestionBlock<'a>>,
}

impl Group<'_> {
    /// Same classification, no questions
    fn continuation(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            questions: Vec::new(),
        }
    }
}

/// Shared material and the groups whose questions refer to it
#[derive(Debug, Clone, PartialEq)]
pub struct SharedMaterial<'a> {
    /// Material blocks, starting with the `HL:` paragraph
    pub content: Vec<&'a Block>,
    /// Owning groups
    pub groups: Vec<Group<'a>>,
}

/// Segmented document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation<'a> {
    /// Groups, when the document has no shared material
    pub groups: Vec<Group<'a>>,
    /// Shared materials in document order
    pub materials: Vec<SharedMaterial<'a>>,
    /// Malformed headers
    pub errors: Vec<ConversionError>,
}

impl Segmentation<'_> {
    /// Whether the result is rooted at shared materials
    pub fn has_materials(&self) -> bool {
        !self.materials.is_empty()
    }
}

/// A parsed `[tag, posttype, level]` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub tag: String,
    pub post_type: String,
    pub level_code: String,
    pub level: u8,
}

impl Header {
    /// Parse a header paragraph text
    ///
    /// Returns `None` when the text is not bracketed at all, and an error
    /// when it is bracketed but does not have exactly three fields.
    pub fn parse(text: &str) -> Option<Result<Self, ConversionError>> {
        let text = text.trim();
        if !(text.starts_with('[') && text.ends_with(']')) || text.starts_with("[[") {
            return None;
        }

        let inner: String = text.chars().filter(|c| *c != '[' && *c != ']').collect();
        let fields: Vec<&str> = inner.split(',').map(str::trim).collect();
        let [tag, post_type, level] = fields.as_slice() else {
            return Some(Err(ConversionError::error(format!(
                "Sai format header: {}",
                text
            ))));
        };

        let upper = level.to_uppercase();
        let (level_code, level) = match LEVEL_CODES.iter().position(|c| *c == upper) {
            Some(rank) => (upper, rank as u8),
            None => (LEVEL_CODES[0].to_string(), 0),
        };

        Some(Ok(Self {
            tag: tag.to_string(),
            post_type: post_type.to_string(),
            level_code,
            level,
        }))
    }

    /// Subject code: the tag up to its first `_`
    pub fn subject(&self) -> &str {
        self.tag.split('_').next().unwrap_or_default()
    }

    fn meta(&self) -> QuestionMeta {
        QuestionMeta {
            subject: self.subject().to_string(),
            tag: self.tag.clone(),
            post_type: self.post_type.clone(),
            level_code: self.level_code.clone(),
            level: self.level,
        }
    }
}

/// Whether a paragraph text opens a new question
pub fn is_question_start(text: &str) -> bool {
    static QUESTION_RE: OnceLock<Regex> = OnceLock::new();
    let re = QUESTION_RE.get_or_init(|| Regex::new(r"(?i)^c[âa]u\s*\d").unwrap());
    re.is_match(text.trim_start())
}

/// Whether a paragraph text opens a shared material
pub fn is_material_start(text: &str) -> bool {
    text.trim_start().starts_with("HL:")
}

/// Scanner state of the segmentation pass
#[derive(Debug, Default)]
pub struct Segmenter<'a> {
    /// Live group list; owned by the open material, if any
    groups: Vec<Group<'a>>,
    materials: Vec<SharedMaterial<'a>>,
    in_material: bool,
    current_tag: Option<String>,
    errors: Vec<ConversionError>,
}

impl<'a> Segmenter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment a whole block sequence
    pub fn segment(blocks: &'a [Block]) -> Segmentation<'a> {
        blocks
            .iter()
            .fold(Self::new(), |mut segmenter, block| {
                segmenter.push(block);
                segmenter
            })
            .finish()
    }

    /// Feed the next block
    pub fn push(&mut self, block: &'a Block) {
        let para = match block {
            Block::Table(_) => {
                self.append(block);
                return;
            }
            Block::Paragraph(p) if p.is_empty() => return,
            Block::Paragraph(p) => p,
        };

        let text = para.plain_text();
        let text = text.trim();

        if let Some(header) = Header::parse(text) {
            self.in_material = false;
            match header {
                Ok(header) => self.open_group(header),
                Err(err) => {
                    log::warn!("{}", err.message);
                    self.errors.push(err);
                }
            }
            return;
        }

        if is_material_start(text) {
            self.open_material(block);
            return;
        }

        if is_question_start(text) {
            self.in_material = false;
            self.open_question(block);
            return;
        }

        self.append(block);
    }

    /// Close the scan
    pub fn finish(mut self) -> Segmentation<'a> {
        if let Some(material) = self.materials.last_mut() {
            material.groups = std::mem::take(&mut self.groups);
        }
        Segmentation {
            groups: self.groups,
            materials: self.materials,
            errors: self.errors,
        }
    }

    fn open_group(&mut self, header: Header) {
        log::debug!("Group {} ({}, {})", header.tag, header.post_type, header.level_code);
        self.current_tag = Some(header.tag.clone());
        self.groups.push(Group {
            meta: header.meta(),
            questions: Vec::new(),
        });
    }

    fn open_material(&mut self, block: &'a Block) {
        if let Some(previous) = self.materials.last_mut() {
            // The previous material keeps its groups; scanning continues
            // under the last classification with no questions
            let continuation = self.groups.last().map(Group::continuation);
            previous.groups = std::mem::take(&mut self.groups);
            self.groups.extend(continuation);
        }
        log::debug!("Shared material {}", self.materials.len());
        self.materials.push(SharedMaterial {
            content: vec![block],
            groups: Vec::new(),
        });
        self.in_material = true;
    }

    fn open_question(&mut self, block: &'a Block) {
        let Some(group) = self.groups.last_mut() else {
            log::warn!("Question outside any group dropped: {}", block.plain_text());
            return;
        };
        let tag = self
            .current_tag
            .clone()
            .unwrap_or_else(|| group.meta.tag.clone());
        group.questions.push(QuestionBlock {
            tag,
            blocks: vec![block],
        });
    }

    fn append(&mut self, block: &'a Block) {
        if self.in_material {
            if let Some(material) = self.materials.last_mut() {
                material.content.push(block);
                return;
            }
        }
        match self.groups.last_mut().and_then(|g| g.questions.last_mut()) {
            Some(question) => question.blocks.push(block),
            None => log::debug!("Block before the first question dropped"),
        }
    }
}
