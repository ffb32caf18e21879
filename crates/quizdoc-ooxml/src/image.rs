//! Embedded image helpers
//!
//! Drawings reference their payload through a relationship id. The
//! relationship target is a path relative to the `word/` folder.

/// Image reference collected from a `w:drawing` or VML `v:imagedata`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    /// Relationship id of the image part (`r:embed` / `r:id`)
    pub rel_id: String,
    /// Display width in EMUs (`wp:extent cx`)
    pub width_emu: Option<i64>,
    /// Display height in EMUs (`wp:extent cy`)
    pub height_emu: Option<i64>,
}

/// Get the content type for an image extension
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        "tiff" | "tif" => "image/tiff",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Content type derived from a part path's extension
pub fn content_type_for_path(path: &str) -> &'static str {
    match path.rsplit_once('.') {
        Some((_, ext)) => content_type_for_extension(ext),
        None => "application/octet-stream",
    }
}

/// Resolve a relationship target of `word/document.xml` to a package path
pub fn part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = vec!["word"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for_extension("PNG"), "image/png");
        assert_eq!(content_type_for_extension("jpeg"), "image/jpeg");
        assert_eq!(content_type_for_extension("xyz"), "application/octet-stream");
        assert_eq!(content_type_for_path("word/media/image3.gif"), "image/gif");
        assert_eq!(content_type_for_path("word/media/blob"), "application/octet-stream");
    }

    #[test]
    fn test_part_path() {
        assert_eq!(part_path("media/image1.png"), "word/media/image1.png");
        assert_eq!(part_path("../media/image1.png"), "media/image1.png");
        assert_eq!(part_path("/word/media/image2.jpeg"), "word/media/image2.jpeg");
        assert_eq!(part_path("./media/a.png"), "word/media/a.png");
    }
}
