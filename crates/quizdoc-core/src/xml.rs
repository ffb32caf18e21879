//! Question-bank XML output
//!
//! [`write_xml`] serializes a result tree with every text node escaped, so
//! the markup stored in questions first appears as `&lt;strong&gt;`.
//! [`post_process`] then turns the whitelisted tags back into real markup
//! and tidies `math-tex` spans. [`to_xml`] does both.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::model::{ConversionOutput, MaterialResult, QuestionResult};

/// Tags restored by [`post_process`]
pub const TAG_WHITELIST: &[&str] = &[
    "strong", "b", "em", "i", "u", "sub", "sup", "strike", "br", "center", "img", "table", "tr",
    "td", "div", "span", "audio", "source", "input", "label", "select", "option", "blockquote",
    "li", "font", "a", "p",
];

/// Serialize and post-process a result tree
pub fn to_xml(output: &ConversionOutput, pretty: bool) -> String {
    post_process(&write_xml(output, pretty))
}

/// Serialize a result tree with escaped text nodes
pub fn write_xml(output: &ConversionOutput, pretty: bool) -> String {
    let mut writer = XmlWriter::new(pretty);
    writer.output.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    writer.newline();

    match output {
        ConversionOutput::Questions(questions) => {
            writer.list("questions", questions, XmlWriter::question);
        }
        ConversionOutput::Materials(materials) => {
            writer.list("itemDocuments", materials, XmlWriter::material);
        }
    }
    writer.output
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

struct XmlWriter {
    output: String,
    pretty: bool,
    depth: usize,
}

impl XmlWriter {
    fn new(pretty: bool) -> Self {
        Self {
            output: String::new(),
            pretty,
            depth: 0,
        }
    }

    fn newline(&mut self) {
        if self.pretty {
            self.output.push('\n');
        }
    }

    fn indent(&mut self) {
        if self.pretty {
            self.output.push_str(&"  ".repeat(self.depth));
        }
    }

    fn open(&mut self, name: &str) {
        self.indent();
        self.output.push_str(&format!("<{}>", name));
        self.newline();
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth -= 1;
        self.indent();
        self.output.push_str(&format!("</{}>", name));
        self.newline();
    }

    fn empty(&mut self, name: &str) {
        self.indent();
        self.output.push_str(&format!("<{}/>", name));
        self.newline();
    }

    fn text(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.empty(name);
            return;
        }
        self.indent();
        self.output
            .push_str(&format!("<{}>{}</{}>", name, escape_xml(value), name));
        self.newline();
    }

    fn list<T>(&mut self, name: &str, items: &[T], write: fn(&mut Self, &T)) {
        if items.is_empty() {
            self.empty(name);
            return;
        }
        self.open(name);
        for item in items {
            write(self, item);
        }
        self.close(name);
    }

    fn question(&mut self, q: &QuestionResult) {
        self.open("question");
        self.text("indexGroupQuestionMaterial", &q.index.to_string());
        self.text("subject", &q.meta.subject);
        self.text("tag", &q.meta.tag);
        self.text("posttype", &q.meta.post_type);
        self.text("knowledgelevel", &q.meta.level_code);
        self.text("levelquestion", &q.meta.level.to_string());

        if let Some(url) = &q.media.speech_url {
            self.text("urlSpeechContent", url);
        }
        if let Some(video) = &q.media.video {
            self.text("contentMedia", &video.code);
            self.text("typeContentMedia", video.provider.code());
        }
        if let Some(url) = &q.media.explain_speech_url {
            self.text("urlSpeechExplain", url);
        }

        self.text("typeAnswer", &q.answer_type.type_code().to_string());
        self.text("typeViewContent", "0");
        self.text("template", &q.answer_type.template().to_string());
        if let Some(hint) = &q.hint {
            self.text("hintQuestion", hint);
        }
        self.text("contentquestion", &q.content);

        self.list("listanswers", &q.answers, |w, answer| {
            w.open("answer");
            w.text("index", &answer.index.to_string());
            w.text("content", &answer.content);
            w.text("isanswer", if answer.is_correct { "TRUE" } else { "FALSE" });
            w.close("answer");
        });

        self.text("explainquestion", &q.explanation);
        self.close("question");
    }

    fn material(&mut self, m: &MaterialResult) {
        self.open("itemDocument");
        self.text("subjectId", &m.subject_id);
        self.text("knowledgeId", &m.knowledge_id);
        self.text("groupQuestionMaterial", &m.index.to_string());
        self.text("contentHtml", &m.content);
        self.list("listQuestion", &m.questions, XmlWriter::question);
        self.close("itemDocument");
    }
}

/// Elements whose text is rendered markup
///
/// Every other element holds plain text and is left as written.
pub const MARKUP_ELEMENTS: &[&str] = &[
    "contentquestion",
    "explainquestion",
    "hintQuestion",
    "content",
    "contentHtml",
];

/// Restore whitelisted markup and normalize math spans
///
/// Only the text of [`MARKUP_ELEMENTS`] is touched. Text that was escaped
/// by the renderer ends up escaped exactly once: `&amp;lt;b&amp;gt;`
/// becomes `&lt;b&gt;`.
pub fn post_process(xml: &str) -> String {
    static FIELD_RE: OnceLock<Regex> = OnceLock::new();
    static MATH_RE: OnceLock<Regex> = OnceLock::new();

    // Escaped text holds no `<`, so the first `</` closes the element
    let field_re = FIELD_RE.get_or_init(|| {
        Regex::new(&format!(r"<({})>([^<]*)</", MARKUP_ELEMENTS.join("|"))).unwrap()
    });
    let restored = field_re.replace_all(xml, |caps: &Captures| {
        format!("<{}>{}</", &caps[1], restore_markup(&caps[2]))
    });

    let math_re =
        MATH_RE.get_or_init(|| Regex::new(r#"(?s)<span class="math-tex">(.*?)</span>"#).unwrap());
    math_re
        .replace_all(&restored, |caps: &Captures| {
            let mut inner = caps[1].to_string();
            for tag in ["<strong>", "</strong>", "<i>", "</i>", "<u>", "</u>", "<br>"] {
                inner = inner.replace(tag, "");
            }
            let inner = inner.replace('%', "\\%").replace("\\frac", "\\dfrac");
            format!(r#"<span class="math-tex">{}</span>"#, inner)
        })
        .into_owned()
}

fn restore_markup(text: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re = TAG_RE.get_or_init(|| {
        Regex::new(&format!(
            r"&lt;(/?)({})\b((?:[^&]|&quot;|&amp;)*?)&gt;",
            TAG_WHITELIST.join("|")
        ))
        .unwrap()
    });
    tag_re
        .replace_all(text, |caps: &Captures| {
            format!("<{}{}{}>", &caps[1], &caps[2], caps[3].replace("&quot;", "\""))
        })
        .replace("&amp;", "&")
}
