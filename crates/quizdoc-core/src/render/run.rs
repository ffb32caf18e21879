//! Run rendering
//!
//! Turns runs into markup fragments. Adjacent runs with the same style
//! are merged before escaping, so `<b>` in the text always comes out as
//! `&lt;b&gt;` once, whatever the run boundaries were.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quizdoc_ast::{ImageRef, ImageResolver, Run, RunStyle};

use crate::text::escape_html;

/// EMUs per pixel at 96 DPI
pub const EMU_PER_PIXEL: i64 = 9525;

/// Wrap already-escaped markup in the tags of a style
///
/// Bold is innermost, strikethrough outermost.
pub fn wrap_style(html: &str, style: &RunStyle) -> String {
    let mut out = html.to_string();
    let tags = [
        (style.bold, "strong"),
        (style.italic, "i"),
        (style.underline, "u"),
        (style.superscript, "sup"),
        (style.subscript, "sub"),
        (style.strikethrough, "strike"),
    ];
    for (_, tag) in tags.iter().filter(|(on, _)| *on) {
        out = format!("<{tag}>{out}</{tag}>");
    }
    out
}

/// Escape and wrap one piece of text
pub fn render_text(text: &str, style: &RunStyle) -> String {
    let escaped = escape_html(text).replace('\n', "<br>");
    wrap_style(&escaped, style)
}

/// Inline `<img>` fragment for an image reference
///
/// Returns `None` when the resolver has no payload for the reference.
pub fn render_image(image: &ImageRef, resolver: &dyn ImageResolver) -> Option<String> {
    let data = resolver.resolve_image(&image.ref_id)?;
    let src = format!("data:{};base64,{}", data.mime_type, STANDARD.encode(&data.bytes));
    let html = match (image.width_emu, image.height_emu) {
        (Some(w), Some(h)) => format!(
            r#"<center><img src="{}" width="{}" height="{}" /></center>"#,
            src,
            w / EMU_PER_PIXEL,
            h / EMU_PER_PIXEL
        ),
        _ => format!(r#"<center><img src="{}" /></center>"#, src),
    };
    Some(html)
}

/// Render the text of a run sequence, dropping the first `skip` characters
pub fn render_runs(runs: &[Run], skip: usize) -> String {
    let mut html = String::new();
    let mut buffer = String::new();
    let mut current: Option<RunStyle> = None;
    let mut pos = 0;

    for run in runs {
        let start = pos;
        pos += run.char_len();
        if pos <= skip || run.text.is_empty() {
            continue;
        }

        let text = if start < skip {
            let cut = run
                .text
                .char_indices()
                .nth(skip - start)
                .map_or(run.text.len(), |(i, _)| i);
            &run.text[cut..]
        } else {
            run.text.as_str()
        };

        if let Some(style) = current {
            if style != run.style {
                html.push_str(&render_text(&buffer, &style));
                buffer.clear();
            }
        }
        buffer.push_str(text);
        current = Some(run.style);
    }

    if let Some(style) = current {
        if !buffer.is_empty() {
            html.push_str(&render_text(&buffer, &style));
        }
    }
    html
}
