//! Output assembly
//!
//! [`Assembler`] drives one conversion run: segment the blocks, classify
//! every question in encounter order and build the result tree. The
//! question index is a counter local to the run, so converting the same
//! input twice gives identical output.

use quizdoc_ast::{Block, DocumentSource, ImageResolver};

use crate::classify::{Classifier, SpecializedClassifier};
use crate::config::Settings;
use crate::diagnostics::ConversionError;
use crate::model::{ConversionOutput, ConversionReport, MaterialResult, QuestionMeta, QuestionResult};
use crate::render::Renderer;
use crate::segment::{Group, Segmenter};
use crate::text::Prefix;

/// Converts block trees into result trees
pub struct Assembler<'a> {
    settings: &'a Settings,
    specialized: Option<&'a dyn SpecializedClassifier>,
}

impl<'a> Assembler<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            specialized: None,
        }
    }

    /// Install a classifier for the specialized subject family
    pub fn with_specialized(mut self, specialized: &'a dyn SpecializedClassifier) -> Self {
        self.specialized = Some(specialized);
        self
    }

    /// Load and convert a document
    ///
    /// A source that cannot produce its blocks yields an empty result and a
    /// single fatal error.
    pub fn convert_source<S: DocumentSource>(&self, source: &S) -> ConversionReport {
        match source.load_blocks() {
            Ok(blocks) => self.convert(&blocks, source),
            Err(err) => {
                log::error!("Cannot read document: {}", err);
                ConversionReport {
                    output: ConversionOutput::Questions(Vec::new()),
                    errors: vec![ConversionError::fatal(format!(
                        "Không đọc được tài liệu: {}",
                        err
                    ))],
                }
            }
        }
    }

    /// Convert a block tree
    pub fn convert(&self, blocks: &[Block], images: &dyn ImageResolver) -> ConversionReport {
        let renderer = Renderer::new(images, &self.settings.render);
        let mut classifier = Classifier::new(renderer, &self.settings.subjects);
        if let Some(specialized) = self.specialized {
            classifier = classifier.with_specialized(specialized);
        }

        let segmentation = Segmenter::segment(blocks);
        let mut errors = segmentation.errors;
        let mut next_index = 0;

        let output = if segmentation.materials.is_empty() {
            ConversionOutput::Questions(classify_groups(
                &classifier,
                &segmentation.groups,
                &mut next_index,
                &mut errors,
            ))
        } else {
            let materials = segmentation
                .materials
                .iter()
                .enumerate()
                .map(|(index, material)| {
                    let owners: Vec<&Group> = material
                        .groups
                        .iter()
                        .filter(|g| !g.questions.is_empty())
                        .collect();
                    let (subject_id, knowledge_id) = owners
                        .first()
                        .map(|g| (g.meta.subject.clone(), g.meta.tag.clone()))
                        .unwrap_or_default();
                    MaterialResult {
                        index,
                        subject_id,
                        knowledge_id,
                        content: renderer.blocks(&material.content, &[Prefix::Material]),
                        questions: classify_groups(
                            &classifier,
                            &material.groups,
                            &mut next_index,
                            &mut errors,
                        ),
                    }
                })
                .collect();
            ConversionOutput::Materials(materials)
        };

        log::info!(
            "Converted {} question(s), {} problem(s)",
            output.question_count(),
            errors.len()
        );
        ConversionReport { output, errors }
    }
}

fn classify_groups(
    classifier: &Classifier<'_>,
    groups: &[Group<'_>],
    next_index: &mut usize,
    errors: &mut Vec<ConversionError>,
) -> Vec<QuestionResult> {
    let mut results = Vec::new();
    for group in groups {
        for question in &group.questions {
            let meta = QuestionMeta {
                tag: question.tag.clone(),
                ..group.meta.clone()
            };
            results.push(classifier.classify(question, meta, *next_index, errors));
            *next_index += 1;
        }
    }
    results
}
