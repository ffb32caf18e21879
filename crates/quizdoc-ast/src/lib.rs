//! quizdoc-ast - Block and run model
//!
//! This crate provides the read-only view of a word-processing document
//! that the converter consumes: paragraphs made of styled runs, tables
//! made of raw cells with span metadata, and the interfaces used to load
//! a block tree and resolve embedded image payloads.

pub mod block;
pub mod document;
pub mod inline;

pub use block::{Alignment, Block, Paragraph, Table, TableCell, TableRow, VMerge};
pub use document::{Document, DocumentSource, ImageData, ImageResolver, NoImages, SourceError};
pub use inline::{ImageRef, Run, RunStyle};

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
