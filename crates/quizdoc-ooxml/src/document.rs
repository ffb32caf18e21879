//! Document content parsing (word/document.xml)
//!
//! This module parses the main document content and extracts
//! paragraphs, runs and (possibly nested) tables in body order.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use quizdoc_ast::VMerge;

use crate::error::{OoxmlError, Result};
use crate::image::Image;

/// A parsed Word document
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Document body blocks
    pub blocks: Vec<Block>,
}

/// Block-level elements
#[derive(Debug, Clone)]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}

/// A paragraph with its content and alignment
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// Raw `w:jc` value
    pub alignment: Option<String>,
    /// Children (runs and hyperlinks)
    pub children: Vec<ParagraphChild>,
}

/// Child elements of a paragraph
#[derive(Debug, Clone)]
pub enum ParagraphChild {
    /// A text run
    Run(Run),
    /// A hyperlink
    Hyperlink(Hyperlink),
}

/// A hyperlink with its target and content
#[derive(Debug, Clone, Default)]
pub struct Hyperlink {
    /// Relationship ID for external URLs (r:id)
    pub id: Option<String>,
    /// Internal anchor name (w:anchor)
    pub anchor: Option<String>,
    /// Child runs inside the hyperlink
    pub runs: Vec<Run>,
}

/// A text run with formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    /// The text content (tabs and breaks as `\t` / `\n`)
    pub text: String,
    /// Whether the text is bold
    pub bold: bool,
    /// Whether the text is italic
    pub italic: bool,
    /// Whether the text is underlined
    pub underline: bool,
    /// Whether the text is raised
    pub superscript: bool,
    /// Whether the text is lowered
    pub subscript: bool,
    /// Whether the text is struck through
    pub strike: bool,
    /// Images drawn inside the run
    pub images: Vec<Image>,
}

/// A table
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Table rows
    pub rows: Vec<TableRow>,
}

/// A table row
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    /// Cells in this row
    pub cells: Vec<TableCell>,
}

/// A table cell
#[derive(Debug, Clone)]
pub struct TableCell {
    /// Paragraphs and nested tables in this cell
    pub blocks: Vec<Block>,
    /// `w:gridSpan`, at least 1
    pub grid_span: usize,
    /// `w:vMerge` marker
    pub v_merge: VMerge,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            grid_span: 1,
            v_merge: VMerge::None,
        }
    }
}

/// Elements whose whole subtree is ignored
///
/// Text boxes would otherwise interleave their paragraphs with the
/// enclosing one, and `mc:Fallback` duplicates the preferred drawing.
const SKIPPED: &[&[u8]] = &[b"txbxContent", b"Fallback", b"footnoteReference"];

impl Document {
    /// Parse a document from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        // Don't trim text - preserve whitespace in runs
        reader.config_mut().trim_text(false);

        let mut state = ParseState::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => state.open(e),
                Ok(Event::Empty(ref e)) => {
                    state.open(e);
                    state.close(e.local_name().as_ref());
                }
                Ok(Event::End(ref e)) => state.close(e.local_name().as_ref()),
                Ok(Event::Text(ref e)) => {
                    // Only capture text inside <w:t> elements, not <w:instrText>
                    if state.in_text && state.skip_depth == 0 {
                        if let Some(ref mut run) = state.run {
                            let text = e.unescape().unwrap_or_default();
                            run.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !state.tables.is_empty() {
            return Err(OoxmlError::InvalidStructure(
                "unterminated table in document body".to_string(),
            ));
        }

        Ok(Document {
            blocks: state.blocks,
        })
    }

    /// Get all top-level paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Get plain text of the top-level paragraphs
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Paragraph {
    /// Get plain text of this paragraph
    pub fn plain_text(&self) -> String {
        self.runs().map(|r| r.text.as_str()).collect()
    }

    /// Get all runs (flattening hyperlinks)
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.children.iter().flat_map(|child| match child {
            ParagraphChild::Run(run) => std::slice::from_ref(run).iter(),
            ParagraphChild::Hyperlink(hyperlink) => hyperlink.runs.iter(),
        })
    }
}

// Builder types for constructing elements during parsing

#[derive(Default)]
struct TableBuilder {
    rows: Vec<TableRow>,
    current_row: Option<TableRowBuilder>,
}

#[derive(Default)]
struct TableRowBuilder {
    cells: Vec<TableCell>,
    current_cell: Option<TableCell>,
}

impl TableBuilder {
    fn cell_mut(&mut self) -> Option<&mut TableCell> {
        self.current_row
            .as_mut()
            .and_then(|row| row.current_cell.as_mut())
    }
}

/// Parser state shared by start, empty and end events
#[derive(Default)]
struct ParseState {
    blocks: Vec<Block>,
    in_body: bool,
    skip_depth: u32,
    in_text: bool,
    paragraph: Option<Paragraph>,
    hyperlink: Option<Hyperlink>,
    run: Option<Run>,
    image: Option<Image>,
    /// Open tables, innermost last
    tables: Vec<TableBuilder>,
}

impl ParseState {
    fn open(&mut self, e: &BytesStart) {
        let name = e.local_name();
        let name = name.as_ref();

        if SKIPPED.contains(&name) {
            self.skip_depth += 1;
            return;
        }
        if self.skip_depth > 0 {
            return;
        }

        match name {
            b"body" => self.in_body = true,
            b"p" if self.in_body => self.paragraph = Some(Paragraph::default()),
            b"jc" if self.run.is_none() => {
                if let Some(ref mut para) = self.paragraph {
                    para.alignment = get_attr(e, b"val");
                }
            }
            b"hyperlink" if self.paragraph.is_some() => {
                self.hyperlink = Some(Hyperlink {
                    id: get_attr(e, b"id"),
                    anchor: get_attr(e, b"anchor"),
                    runs: Vec::new(),
                });
            }
            b"r" if self.paragraph.is_some() => self.run = Some(Run::default()),
            b"b" | b"i" | b"strike" | b"dstrike" => {
                if let Some(ref mut run) = self.run {
                    let on = toggle_value(e);
                    match name {
                        b"b" => run.bold = on,
                        b"i" => run.italic = on,
                        _ => run.strike = on,
                    }
                }
            }
            b"u" => {
                if let Some(ref mut run) = self.run {
                    run.underline = get_attr(e, b"val").map_or(true, |v| v != "none");
                }
            }
            b"vertAlign" => {
                if let Some(ref mut run) = self.run {
                    let val = get_attr(e, b"val");
                    run.superscript = val.as_deref() == Some("superscript");
                    run.subscript = val.as_deref() == Some("subscript");
                }
            }
            b"t" if self.run.is_some() => self.in_text = true,
            b"tab" | b"br" | b"cr" => {
                // w:tab also appears in w:tabs (paragraph tab stops) where no run is open
                if let Some(ref mut run) = self.run {
                    run.text.push(if name == b"tab" { '\t' } else { '\n' });
                }
            }
            b"drawing" if self.run.is_some() => self.image = Some(Image::default()),
            b"extent" => {
                if let Some(ref mut image) = self.image {
                    image.width_emu = get_attr(e, b"cx").and_then(|v| v.parse().ok());
                    image.height_emu = get_attr(e, b"cy").and_then(|v| v.parse().ok());
                }
            }
            b"blip" => {
                if let (Some(image), Some(rel_id)) = (&mut self.image, get_attr(e, b"embed")) {
                    image.rel_id = rel_id;
                }
            }
            b"imagedata" => {
                // VML image inside w:pict
                if let (Some(run), Some(rel_id)) = (&mut self.run, get_attr(e, b"id")) {
                    run.images.push(Image {
                        rel_id,
                        ..Default::default()
                    });
                }
            }
            b"tbl" if self.in_body => self.tables.push(TableBuilder::default()),
            b"tr" => {
                if let Some(table) = self.tables.last_mut() {
                    table.current_row = Some(TableRowBuilder::default());
                }
            }
            b"tc" => {
                if let Some(row) = self.tables.last_mut().and_then(|t| t.current_row.as_mut()) {
                    row.current_cell = Some(TableCell::default());
                }
            }
            b"gridSpan" if self.paragraph.is_none() => {
                if let Some(cell) = self.tables.last_mut().and_then(|t| t.cell_mut()) {
                    cell.grid_span = get_attr(e, b"val")
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(1)
                        .max(1);
                }
            }
            b"vMerge" if self.paragraph.is_none() => {
                if let Some(cell) = self.tables.last_mut().and_then(|t| t.cell_mut()) {
                    cell.v_merge = match get_attr(e, b"val").as_deref() {
                        Some("restart") => VMerge::Start,
                        _ => VMerge::Continue,
                    };
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        if SKIPPED.contains(&name) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }

        match name {
            b"body" => self.in_body = false,
            b"t" => self.in_text = false,
            b"drawing" => {
                if let Some(image) = self.image.take() {
                    match self.run {
                        Some(ref mut run) if !image.rel_id.is_empty() => run.images.push(image),
                        _ => log::debug!("Dropping drawing without an embedded picture"),
                    }
                }
            }
            b"r" => {
                if let Some(run) = self.run.take() {
                    if run.text.is_empty() && run.images.is_empty() {
                        return;
                    }
                    if let Some(ref mut hyperlink) = self.hyperlink {
                        hyperlink.runs.push(run);
                    } else if let Some(ref mut para) = self.paragraph {
                        para.children.push(ParagraphChild::Run(run));
                    }
                }
            }
            b"hyperlink" => {
                if let (Some(hyperlink), Some(para)) = (self.hyperlink.take(), &mut self.paragraph) {
                    para.children.push(ParagraphChild::Hyperlink(hyperlink));
                }
            }
            b"p" => {
                if let Some(para) = self.paragraph.take() {
                    self.push_block(Block::Paragraph(para));
                }
            }
            b"tc" => {
                if let Some(row) = self.tables.last_mut().and_then(|t| t.current_row.as_mut()) {
                    if let Some(cell) = row.current_cell.take() {
                        row.cells.push(cell);
                    }
                }
            }
            b"tr" => {
                if let Some(table) = self.tables.last_mut() {
                    if let Some(row) = table.current_row.take() {
                        table.rows.push(TableRow { cells: row.cells });
                    }
                }
            }
            b"tbl" => {
                if let Some(table) = self.tables.pop() {
                    self.push_block(Block::Table(Table { rows: table.rows }));
                }
            }
            _ => {}
        }
    }

    /// Append a finished block to the innermost open cell, or the body
    fn push_block(&mut self, block: Block) {
        match self.tables.last_mut() {
            Some(table) => match table.cell_mut() {
                Some(cell) => cell.blocks.push(block),
                None => log::warn!("Dropping block outside of a table cell"),
            },
            None => self.blocks.push(block),
        }
    }
}

// Helper functions

/// Get an attribute by local name, ignoring its namespace prefix
fn get_attr(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Value of an on/off property such as `<w:b w:val="0"/>`
fn toggle_value(e: &BytesStart) -> bool {
    !matches!(
        get_attr(e, b"val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}
