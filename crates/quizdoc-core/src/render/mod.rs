//! Content rendering
//!
//! [`Renderer`] turns block sequences into the flat markup stored in the
//! question bank. Paragraph renderings are joined with `<br>`; runs of
//! paragraphs sharing an explicit non-left alignment are grouped into one
//! `text-align` container; `$...$` spans are marked as math last.

mod run;
mod table;

use std::sync::OnceLock;

use quizdoc_ast::{Alignment, Block, ImageResolver, Paragraph};
use regex::Regex;

use crate::config::RenderSettings;
use crate::text::{content_start, Prefix};

pub use run::{render_image, render_runs, render_text, wrap_style, EMU_PER_PIXEL};

/// Markup renderer for one document
#[derive(Clone, Copy)]
pub struct Renderer<'a> {
    images: &'a dyn ImageResolver,
    settings: &'a RenderSettings,
}

impl<'a> Renderer<'a> {
    /// Create a renderer over an image resolver
    pub fn new(images: &'a dyn ImageResolver, settings: &'a RenderSettings) -> Self {
        Self { images, settings }
    }

    /// Render one paragraph
    ///
    /// `index` is the paragraph's position in the sequence being rendered;
    /// first-only prefixes are cut at index 0 only.
    pub fn paragraph(&self, para: &Paragraph, index: usize, prefixes: &[Prefix]) -> String {
        let skip = content_start(&para.plain_text(), index, prefixes);
        let mut html = render_runs(&para.runs, skip);

        for image in para.runs.iter().filter_map(|r| r.image.as_ref()) {
            match render_image(image, self.images) {
                Some(img) => html.push_str(&img),
                None => log::warn!("Image {} not found, skipped", image.ref_id),
            }
        }

        html.trim().to_string()
    }

    /// Render a block sequence, math spans included
    pub fn blocks(&self, blocks: &[&Block], prefixes: &[Prefix]) -> String {
        wrap_math(&self.join_blocks(blocks, prefixes))
    }

    /// Render a block sequence inside a `<div class="content">` wrapper
    pub fn content(&self, blocks: &[&Block], prefixes: &[Prefix]) -> String {
        format!(r#"<div class="content">{}</div>"#, self.blocks(blocks, prefixes))
    }

    /// Render each block on its own, math spans included
    pub fn lines(&self, blocks: &[&Block], prefixes: &[Prefix]) -> Vec<String> {
        blocks
            .iter()
            .enumerate()
            .map(|(index, block)| {
                let html = match block {
                    Block::Paragraph(p) => self.paragraph(p, index, prefixes),
                    Block::Table(t) => self.table(t),
                };
                wrap_math(&html)
            })
            .collect()
    }

    pub(crate) fn join_blocks(&self, blocks: &[&Block], prefixes: &[Prefix]) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut aligned: Option<(Alignment, Vec<String>)> = None;

        for (index, block) in blocks.iter().enumerate() {
            let (alignment, html) = match block {
                Block::Paragraph(p) => (self.container_alignment(p), self.paragraph(p, index, prefixes)),
                Block::Table(t) => (None, self.table(t)),
            };

            if let (Some((current, items)), Some(a)) = (aligned.as_mut(), alignment) {
                if *current == a {
                    items.push(html);
                    continue;
                }
            }
            if let Some((a, items)) = aligned.take() {
                parts.push(align_container(a, &items));
            }
            match alignment {
                Some(a) => aligned = Some((a, vec![html])),
                None => parts.push(html),
            }
        }

        if let Some((a, items)) = aligned {
            parts.push(align_container(a, &items));
        }
        parts.join("<br>")
    }

    fn container_alignment(&self, para: &Paragraph) -> Option<Alignment> {
        if !self.settings.align_containers {
            return None;
        }
        para.alignment.filter(|a| *a != Alignment::Left)
    }
}

fn align_container(alignment: Alignment, items: &[String]) -> String {
    format!(
        r#"<div style="text-align:{};">{}</div>"#,
        alignment.css_value(),
        items.join("<br>")
    )
}

/// Mark `$...$` spans as math
pub fn wrap_math(html: &str) -> String {
    static MATH_RE: OnceLock<Regex> = OnceLock::new();
    let re = MATH_RE.get_or_init(|| Regex::new(r"\$[^$]*\$").unwrap());
    re.replace_all(html, r#" <span class="math-tex">$0</span>"#)
        .into_owned()
}
