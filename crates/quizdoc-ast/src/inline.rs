//! Run-level elements for paragraph content
//!
//! A run is a span of text sharing one style record. It may instead (or
//! additionally) carry a reference to one embedded image.

use serde::{Deserialize, Serialize};

/// Character formatting shared by every character of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RunStyle {
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
    /// Superscript text
    pub superscript: bool,
    /// Subscript text
    pub subscript: bool,
    /// Struck-through text
    pub strikethrough: bool,
}

impl RunStyle {
    /// Plain, unformatted style
    pub fn plain() -> Self {
        Self::default()
    }

    /// Check whether no formatting flag is set
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Reference to an embedded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Reference id handed to the image resolver (e.g. "rId7")
    pub ref_id: String,
    /// Declared display width in EMUs
    pub width_emu: Option<i64>,
    /// Declared display height in EMUs
    pub height_emu: Option<i64>,
}

impl ImageRef {
    /// Create a reference without declared dimensions
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            width_emu: None,
            height_emu: None,
        }
    }

    /// Set the declared dimensions in EMUs
    pub fn with_size_emu(mut self, width: i64, height: i64) -> Self {
        self.width_emu = Some(width);
        self.height_emu = Some(height);
        self
    }
}

/// A text run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    /// The text content (empty for image-only runs)
    pub text: String,
    /// Character formatting
    pub style: RunStyle,
    /// Embedded image carried by this run
    pub image: Option<ImageRef>,
    /// Target URL when the run sits inside a hyperlink field
    pub hyperlink: Option<String>,
}

impl Run {
    /// Create a plain text run
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create an image-only run
    pub fn image(image: ImageRef) -> Self {
        Self {
            image: Some(image),
            ..Default::default()
        }
    }

    /// Replace the style
    pub fn with_style(mut self, style: RunStyle) -> Self {
        self.style = style;
        self
    }

    /// Mark the run bold
    pub fn bold(mut self) -> Self {
        self.style.bold = true;
        self
    }

    /// Mark the run italic
    pub fn italic(mut self) -> Self {
        self.style.italic = true;
        self
    }

    /// Mark the run underlined
    pub fn underline(mut self) -> Self {
        self.style.underline = true;
        self
    }

    /// Attach a hyperlink target
    pub fn with_hyperlink(mut self, url: impl Into<String>) -> Self {
        self.hyperlink = Some(url.into());
        self
    }

    /// Number of characters in the run text
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
