//! Shared test utilities for quizdoc-ooxml
//!
//! [`DocxBuilder`] assembles small DOCX packages in memory so tests in
//! this and downstream crates can exercise the full reading path.

use crate::archive::{OoxmlArchive, DOCUMENT_PART, DOCUMENT_RELS_PART};
use crate::error::Result;
use crate::relationships::Relationships;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Builder for in-memory DOCX packages
///
/// # Example
/// ```
/// use quizdoc_ooxml::test_utils::DocxBuilder;
/// use quizdoc_ooxml::DocxSource;
///
/// let bytes = DocxBuilder::new()
///     .paragraph("[TOANTHPT,TN,NB]")
///     .paragraph("Câu 1. 1 + 1 = ?")
///     .build()
///     .unwrap();
/// let archive = quizdoc_ooxml::OoxmlArchive::from_reader(std::io::Cursor::new(bytes)).unwrap();
/// let source = DocxSource::from_archive(archive).unwrap();
/// assert_eq!(source.to_blocks().unwrap().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct DocxBuilder {
    body: String,
    relationships: Vec<String>,
    media: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain paragraph
    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape(text)
        ));
        self
    }

    /// Append raw WordprocessingML to the body
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Append a paragraph holding one inline picture
    pub fn image_paragraph(mut self, rel_id: &str, cx: i64, cy: i64) -> Self {
        self.body.push_str(&format!(
            concat!(
                r#"<w:p><w:r><w:drawing><wp:inline>"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="1" name="Picture"/>"#,
                r#"<a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="{id}"/>"#,
                r#"</pic:blipFill></pic:pic></a:graphicData></a:graphic>"#,
                r#"</wp:inline></w:drawing></w:r></w:p>"#
            ),
            cx = cx,
            cy = cy,
            id = rel_id
        ));
        self
    }

    /// Register an image part and its relationship
    pub fn media(mut self, rel_id: &str, name: &str, bytes: Vec<u8>) -> Self {
        self.relationships.push(format!(
            r#"<Relationship Id="{}" Type="{}" Target="media/{}"/>"#,
            rel_id,
            Relationships::TYPE_IMAGE,
            name
        ));
        self.media.push((format!("word/media/{}", name), bytes));
        self
    }

    /// Register an external hyperlink relationship
    pub fn hyperlink(mut self, rel_id: &str, url: &str) -> Self {
        self.relationships.push(format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}" TargetMode="External"/>"#,
            rel_id,
            Relationships::TYPE_HYPERLINK,
            escape(url)
        ));
        self
    }

    /// Zip the package
    pub fn build(self) -> Result<Vec<u8>> {
        let mut archive = OoxmlArchive::new();
        archive.set_string("[Content_Types].xml", CONTENT_TYPES);
        archive.set_string("_rels/.rels", PACKAGE_RELS);
        archive.set_string(
            DOCUMENT_RELS_PART,
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                self.relationships.concat()
            ),
        );
        archive.set_string(
            DOCUMENT_PART,
            format!(
                concat!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
                    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
                    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
                    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
                    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                    r#"<w:body>{}</w:body></w:document>"#
                ),
                self.body
            ),
        );
        for (path, bytes) in self.media {
            archive.set(path, bytes);
        }
        archive.to_bytes()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
