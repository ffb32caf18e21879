//! Conversion from OOXML types to quizdoc-ast types
//!
//! This module provides the bridge between the low-level OOXML parsing
//! and the block tree consumed by the converter core.

use std::path::Path;

use quizdoc_ast::{
    Alignment, Block as AstBlock, DocumentSource, ImageData, ImageRef, ImageResolver,
    Paragraph as AstParagraph, Run as AstRun, RunStyle, SourceError, Table as AstTable,
    TableCell as AstTableCell, TableRow as AstTableRow,
};

use crate::archive::OoxmlArchive;
use crate::document::{Block, Document, Paragraph, ParagraphChild, Run, Table, TableCell, TableRow};
use crate::error::Result;
use crate::image::{content_type_for_path, part_path, Image};
use crate::relationships::Relationships;

/// Context for conversion, holding relationship information
#[derive(Default)]
pub struct ConversionContext<'a> {
    /// Relationships for resolving hyperlink targets
    pub relationships: Option<&'a Relationships>,
}

impl<'a> ConversionContext<'a> {
    /// Create a new context without relationships
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with relationship information
    pub fn with_relationships(relationships: &'a Relationships) -> Self {
        Self {
            relationships: Some(relationships),
        }
    }

    /// Resolve a hyperlink relationship to its external URL
    pub fn hyperlink_target(&self, id: &str) -> Option<String> {
        let rel = self.relationships?.get(id)?;
        if rel.is_external() || rel.target.starts_with("http") {
            Some(rel.target.clone())
        } else {
            None
        }
    }
}

/// Trait for converting OOXML types to AST types
pub trait ToAst {
    /// The AST type this converts to
    type Output;

    /// Convert to AST representation
    fn to_ast(&self, ctx: &ConversionContext) -> Self::Output;
}

// =============================================================================
// Run -> Run conversion
// =============================================================================

impl ToAst for Image {
    type Output = ImageRef;

    fn to_ast(&self, _ctx: &ConversionContext) -> Self::Output {
        ImageRef {
            ref_id: self.rel_id.clone(),
            width_emu: self.width_emu,
            height_emu: self.height_emu,
        }
    }
}

impl ToAst for Run {
    /// A text run followed by one image run per drawing
    type Output = Vec<AstRun>;

    fn to_ast(&self, ctx: &ConversionContext) -> Self::Output {
        let style = RunStyle {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            superscript: self.superscript,
            subscript: self.subscript,
            strikethrough: self.strike,
        };

        let mut runs = Vec::with_capacity(1 + self.images.len());
        if !self.text.is_empty() {
            runs.push(AstRun::text(self.text.clone()).with_style(style));
        }
        runs.extend(self.images.iter().map(|img| AstRun::image(img.to_ast(ctx))));
        runs
    }
}

// =============================================================================
// Paragraph -> Paragraph conversion
// =============================================================================

impl ToAst for Paragraph {
    type Output = AstParagraph;

    fn to_ast(&self, ctx: &ConversionContext) -> Self::Output {
        let mut runs = Vec::new();
        for child in &self.children {
            match child {
                ParagraphChild::Run(run) => runs.extend(run.to_ast(ctx)),
                ParagraphChild::Hyperlink(link) => {
                    let target = link.id.as_deref().and_then(|id| ctx.hyperlink_target(id));
                    for run in &link.runs {
                        runs.extend(run.to_ast(ctx).into_iter().map(|r| match &target {
                            Some(url) => r.with_hyperlink(url.clone()),
                            None => r,
                        }));
                    }
                }
            }
        }

        AstParagraph {
            runs,
            alignment: self.alignment.as_deref().and_then(Alignment::from_ooxml),
        }
    }
}

// =============================================================================
// Table -> Table conversion
// =============================================================================

impl ToAst for TableCell {
    type Output = AstTableCell;

    fn to_ast(&self, ctx: &ConversionContext) -> Self::Output {
        AstTableCell {
            blocks: self.blocks.iter().map(|b| b.to_ast(ctx)).collect(),
            col_span: self.grid_span.max(1),
            v_merge: self.v_merge,
        }
    }
}

impl ToAst for TableRow {
    type Output = AstTableRow;

    fn to_ast(&self, ctx: &ConversionContext) -> Self::Output {
        AstTableRow {
            cells: self.cells.iter().map(|c| c.to_ast(ctx)).collect(),
        }
    }
}

impl ToAst for Table {
    type Output = AstTable;

    fn to_ast(&self, ctx: &ConversionContext) -> Self::Output {
        AstTable {
            rows: self.rows.iter().map(|r| r.to_ast(ctx)).collect(),
        }
    }
}

// =============================================================================
// Block / Document conversion
// =============================================================================

impl ToAst for Block {
    type Output = AstBlock;

    fn to_ast(&self, ctx: &ConversionContext) -> Self::Output {
        match self {
            Block::Paragraph(p) => AstBlock::Paragraph(p.to_ast(ctx)),
            Block::Table(t) => AstBlock::Table(t.to_ast(ctx)),
        }
    }
}

impl ToAst for Document {
    type Output = Vec<AstBlock>;

    fn to_ast(&self, ctx: &ConversionContext) -> Self::Output {
        self.blocks.iter().map(|b| b.to_ast(ctx)).collect()
    }
}

// =============================================================================
// DOCX document source
// =============================================================================

/// A DOCX file exposed as a [`DocumentSource`]
#[derive(Debug)]
pub struct DocxSource {
    archive: OoxmlArchive,
    relationships: Relationships,
}

impl DocxSource {
    /// Open a DOCX file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Wrap an unpacked archive
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let relationships = match archive.document_rels_xml() {
            Some(xml) => Relationships::parse(xml)?,
            None => Relationships::new(),
        };
        Ok(Self {
            archive,
            relationships,
        })
    }

    /// Parse `word/document.xml`
    pub fn document(&self) -> Result<Document> {
        Document::parse(self.archive.document_xml()?)
    }

    /// Parse the body and convert it into a block tree
    pub fn to_blocks(&self) -> Result<Vec<AstBlock>> {
        let document = self.document()?;
        let ctx = ConversionContext::with_relationships(&self.relationships);
        let blocks = document.to_ast(&ctx);
        log::debug!("Loaded {} body blocks", blocks.len());
        Ok(blocks)
    }

    /// Document relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }
}

impl ImageResolver for DocxSource {
    fn resolve_image(&self, ref_id: &str) -> Option<ImageData> {
        let Some(target) = self.relationships.target(ref_id) else {
            log::warn!("Image relationship {} not found", ref_id);
            return None;
        };
        let path = part_path(target);
        match self.archive.get(&path) {
            Some(bytes) => Some(ImageData::new(bytes.to_vec(), content_type_for_path(&path))),
            None => {
                log::warn!("Image part {} missing from archive", path);
                None
            }
        }
    }
}

impl DocumentSource for DocxSource {
    fn load_blocks(&self) -> std::result::Result<Vec<AstBlock>, SourceError> {
        Ok(self.to_blocks()?)
    }
}
