//! # quizdoc-ooxml
//!
//! DOCX reading for quizdoc.
//!
//! This crate provides functionality to:
//! - Unpack a DOCX archive
//! - Parse `word/document.xml` into paragraphs, runs and tables
//! - Resolve hyperlink targets and embedded image payloads
//! - Convert the result into a `quizdoc-ast` block tree
//!
//! ## Example: Loading Blocks
//!
//! ```no_run
//! use quizdoc_ast::DocumentSource;
//! use quizdoc_ooxml::DocxSource;
//!
//! let source = DocxSource::open("questions.docx")?;
//! for block in source.to_blocks()? {
//!     println!("{:?}", block);
//! }
//! # Ok::<(), quizdoc_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod conversion;
pub mod document;
pub mod error;
pub mod image;
pub mod relationships;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use archive::OoxmlArchive;
pub use conversion::{ConversionContext, DocxSource, ToAst};
pub use document::{Block, Document, Hyperlink, Paragraph, ParagraphChild, Run, Table, TableCell, TableRow};
pub use error::{OoxmlError, Result};
pub use relationships::Relationships;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
