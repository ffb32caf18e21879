//! Block-level elements for document structure
//!
//! The document body is a flat sequence of paragraphs and tables. Table
//! cells hold blocks of their own, so tables can nest.

use serde::{Deserialize, Serialize};

use crate::inline::Run;

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// A paragraph of runs
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}

impl Block {
    /// The paragraph, if this block is one
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    /// Plain text of a paragraph block; tables yield an empty string
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text(),
            Block::Table(_) => String::new(),
        }
    }
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// CSS `text-align` value
    pub fn css_value(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Parse an OOXML `w:jc` value
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" | "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Runs in document order
    pub runs: Vec<Run>,
    /// Explicit alignment, if the paragraph declares one
    pub alignment: Option<Alignment>,
}

impl Paragraph {
    /// Create an empty paragraph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph holding a single plain run
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::text(text)],
            alignment: None,
        }
    }

    /// Create a paragraph from runs
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            alignment: None,
        }
    }

    /// Set the alignment
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Concatenated text of all runs
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// A paragraph with no runs at all
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Whether any run carries an embedded image
    pub fn has_images(&self) -> bool {
        self.runs.iter().any(|r| r.image.is_some())
    }

    /// Distinct hyperlink targets in run order
    pub fn hyperlinks(&self) -> Vec<&str> {
        let mut links: Vec<&str> = Vec::new();
        for url in self.runs.iter().filter_map(|r| r.hyperlink.as_deref()) {
            if !links.contains(&url) {
                links.push(url);
            }
        }
        links
    }
}

/// Vertical merge state of a raw table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VMerge {
    /// Not part of a vertical merge
    #[default]
    None,
    /// First cell of a vertical merge
    Start,
    /// Continues the merged cell above
    Continue,
}

/// A table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Raw rows
    pub rows: Vec<TableRow>,
}

/// A raw table row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Raw cells in this row
    pub cells: Vec<TableCell>,
}

/// A raw table cell, before span resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content
    pub blocks: Vec<Block>,
    /// Declared horizontal span (`w:gridSpan`), at least 1
    pub col_span: usize,
    /// Vertical merge marker
    pub v_merge: VMerge,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            col_span: 1,
            v_merge: VMerge::None,
        }
    }
}

impl TableCell {
    /// Create a cell with a single text paragraph
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![Block::Paragraph(Paragraph::from_text(text))],
            ..Default::default()
        }
    }

    /// Set the horizontal span
    pub fn with_col_span(mut self, span: usize) -> Self {
        self.col_span = span.max(1);
        self
    }

    /// Set the vertical merge marker
    pub fn with_v_merge(mut self, v_merge: VMerge) -> Self {
        self.v_merge = v_merge;
        self
    }

    /// A vertical-merge continuation cell
    pub fn continuation() -> Self {
        Self {
            v_merge: VMerge::Continue,
            ..Default::default()
        }
    }
}

impl Table {
    /// Build a table from rows of cells
    pub fn from_rows(rows: Vec<Vec<TableCell>>) -> Self {
        Self {
            rows: rows.into_iter().map(|cells| TableRow { cells }).collect(),
        }
    }
}
