//! quizdoc-core - exam-question documents to question-bank XML
//!
//! Core library for quizdoc. It takes the block tree of a document written
//! under the exam convention (bracketed headers, `Câu N` questions,
//! `Lời giải` solutions, `HL:` shared materials) and produces the
//! question-bank result tree plus a list of conversion problems.
//!
//! # Example
//!
//! ```
//! use quizdoc_ast::{Block, NoImages, Paragraph};
//! use quizdoc_core::{convert, to_xml, Settings};
//!
//! let blocks: Vec<Block> = [
//!     "[TOANTHPT_DS, 1, NB]",
//!     "Câu 1. 1 + 1 = ?",
//!     "A. 1",
//!     "B. 2",
//!     "Lời giải",
//!     "2",
//! ]
//! .iter()
//! .map(|t| Block::Paragraph(Paragraph::from_text(*t)))
//! .collect();
//!
//! let report = convert(&blocks, &NoImages, &Settings::default());
//! assert!(report.errors.is_empty());
//!
//! let xml = to_xml(&report.output, false);
//! assert!(xml.contains("<typeAnswer>0</typeAnswer>"));
//! assert!(xml.contains("<isanswer>TRUE</isanswer>"));
//! ```

pub mod assemble;
pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod model;
pub mod render;
pub mod segment;
pub mod text;
pub mod xml;

// Re-export main types and functions
pub use assemble::Assembler;
pub use classify::{Classification, Classifier, PreparedQuestion, SpecializedClassifier};
pub use config::{ConfigError, Settings};
pub use diagnostics::{ConversionError, Severity};
pub use error::{ClassifyError, Result};
pub use model::{
    Answer, AnswerType, ConversionOutput, ConversionReport, MaterialResult, Media,
    QuestionMeta, QuestionResult, Video, VideoProvider,
};
pub use render::Renderer;
pub use segment::{Segmentation, Segmenter};
pub use xml::{post_process, to_xml, write_xml};

use quizdoc_ast::{Block, ImageResolver};

/// Convert a block tree with the given settings
pub fn convert(blocks: &[Block], images: &dyn ImageResolver, settings: &Settings) -> ConversionReport {
    Assembler::new(settings).convert(blocks, images)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
