//! Document root and input interfaces
//!
//! The converter core never opens files. It receives a block tree through
//! [`DocumentSource`] and fetches image payloads through [`ImageResolver`].
//! [`Document`] is the in-memory implementation of both.

use std::collections::HashMap;

use crate::block::Block;

/// Error type returned by a failing [`DocumentSource`]
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Resolved image payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// MIME type (e.g. "image/png")
    pub mime_type: String,
}

impl ImageData {
    /// Create an image payload
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Looks up image payloads by reference id
pub trait ImageResolver {
    /// Resolve an image reference, `None` when the payload is unavailable
    fn resolve_image(&self, ref_id: &str) -> Option<ImageData>;
}

/// Resolver for block trees without images
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageResolver for NoImages {
    fn resolve_image(&self, _ref_id: &str) -> Option<ImageData> {
        None
    }
}

impl ImageResolver for HashMap<String, ImageData> {
    fn resolve_image(&self, ref_id: &str) -> Option<ImageData> {
        self.get(ref_id).cloned()
    }
}

/// Supplies the block tree of one document
pub trait DocumentSource: ImageResolver {
    /// Load the ordered body blocks
    fn load_blocks(&self) -> Result<Vec<Block>, SourceError>;
}

/// An in-memory document
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Document content blocks
    pub blocks: Vec<Block>,
    /// Image payloads keyed by reference id
    pub images: HashMap<String, ImageData>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from blocks
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            images: HashMap::new(),
        }
    }

    /// Add a block to the document
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Register an image payload
    pub fn add_image(&mut self, ref_id: impl Into<String>, image: ImageData) {
        self.images.insert(ref_id.into(), image);
    }

    /// Check if the document is empty (no blocks)
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl ImageResolver for Document {
    fn resolve_image(&self, ref_id: &str) -> Option<ImageData> {
        self.images.resolve_image(ref_id)
    }
}

impl DocumentSource for Document {
    fn load_blocks(&self) -> Result<Vec<Block>, SourceError> {
        Ok(self.blocks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Paragraph;

    #[test]
    fn test_document_source_returns_blocks() {
        let mut doc = Document::new();
        doc.push(Block::Paragraph(Paragraph::from_text("Câu 1. x")));
        let blocks = doc.load_blocks().unwrap();
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_document_resolves_images() {
        let mut doc = Document::new();
        doc.add_image("rId1", ImageData::new(vec![1, 2, 3], "image/png"));
        assert_eq!(doc.resolve_image("rId1").unwrap().bytes, vec![1, 2, 3]);
        assert!(doc.resolve_image("rId2").is_none());
    }

    #[test]
    fn test_no_images_resolver() {
        assert!(NoImages.resolve_image("rId1").is_none());
    }
}
