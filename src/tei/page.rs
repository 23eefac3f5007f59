//! Page surfaces: image references, OCR content and overlay markup.

use std::collections::BTreeMap;

use crate::bind::{Binding, Cursor, ElementView};
use crate::error::Result;
use crate::layout::{ZoneStyle, zone_style};
use crate::tei::Graphic;
use crate::tei::zone::Zone;
use crate::xml::{NodeId, XmlTree};

/// One facsimile page (`surface type="page"`).
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    cur: Cursor<'a>,
}

impl<'a> ElementView<'a> for Page<'a> {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
        Self {
            cur: Cursor::new(tree, node),
        }
    }
}

impl<'a> Page<'a> {
    const ID: Binding = Binding::scalar("@xml:id");
    const LABEL: Binding = Binding::scalar("@n");
    const GRAPHICS: Binding = Binding::list("t:graphic");
    const IMAGES_BY_REND: Binding = Binding::keyed("t:graphic", "@rend");
    const LINES: Binding = Binding::list(r#".//t:zone[@type="textLine" or @type="line"]"#);
    const IMAGE_HIGHLIGHTS: Binding = Binding::list(r#"t:zone[@type="image-annotation-highlight"]"#);
    const ANNOTATION_COUNT: Binding = Binding::count(
        r#".//t:anchor[@type="text-annotation-highlight-start"]|.//t:zone[@type="image-annotation-highlight"]"#,
    );

    pub fn id(&self) -> Result<Option<String>> {
        self.cur.text(&Self::ID)
    }

    /// Page sequence label (`n` attribute). Usually a plain number but
    /// the vocabulary does not require one.
    pub fn label(&self) -> Result<Option<String>> {
        self.cur.text(&Self::LABEL)
    }

    /// Label parsed as a page number: leading digits only, so "12r"
    /// reads as 12 and a non-numeric or absent label as 0.
    pub fn number(&self) -> Result<i64> {
        let label = self.label()?.unwrap_or_default();
        let digits: &str = {
            let trimmed = label.trim();
            let end = trimmed
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(trimmed.len());
            &trimmed[..end]
        };
        Ok(digits.parse().unwrap_or(0))
    }

    /// The same surface viewed as a zone, for geometry math.
    pub fn zone(&self) -> Zone<'a> {
        Zone::bind(self.cur.tree(), self.cur.node())
    }

    /// Image resources for this page, in document order.
    pub fn images(&self) -> Result<Vec<Graphic<'a>>> {
        self.cur.views(&Self::GRAPHICS)
    }

    /// Image resources keyed by their rendition label (`rend`
    /// attribute): `page`, `thumbnail`, `small-thumbnail`, `json`, ...
    pub fn images_by_rendition(&self) -> Result<BTreeMap<String, Graphic<'a>>> {
        self.cur.keyed_views(&Self::IMAGES_BY_REND)
    }

    /// OCR line zones at any depth, in document order.
    pub fn lines(&self) -> Result<Vec<Zone<'a>>> {
        self.cur.views(&Self::LINES)
    }

    /// Image-annotation highlight zones (direct children only).
    pub fn image_highlights(&self) -> Result<Vec<Zone<'a>>> {
        self.cur.views(&Self::IMAGE_HIGHLIGHTS)
    }

    /// Number of annotations anchored on this page, counting both
    /// text-range anchors and image highlights.
    pub fn annotation_count(&self) -> Result<usize> {
        self.cur.count(&Self::ANNOTATION_COUNT)
    }

    /// Renders the OCR overlay for this page: absolutely positioned
    /// line and word containers followed by image-highlight spans,
    /// ready to embed over the page image.
    pub fn html(&self) -> Result<String> {
        let mut out = String::new();

        for line in self.lines()? {
            let words = line.word_zones()?;
            let style = zone_style(&line)?;

            out.push_str("<div class=\"ocr-line");
            // lines that carry their own text are styled as text
            if words.is_empty() {
                out.push_str(" ocrtext");
            }
            out.push('"');
            if let Some(id) = line.id()? {
                out.push_str(" id=\"");
                escape(&id, &mut out);
                out.push('"');
            }
            push_style(&style, &mut out);
            out.push_str(">\n");

            if words.is_empty() {
                out.push_str("  <span>");
                if let Some(text) = line.text()? {
                    escape(&text, &mut out);
                }
                out.push_str("</span>\n");
            } else {
                for word in words {
                    let word_style = zone_style(&word)?;
                    out.push_str("  <div class=\"ocr-zone ocrtext\"");
                    push_style(&word_style, &mut out);
                    out.push_str("><span>");
                    if let Some(text) = word.text()? {
                        escape(&text, &mut out);
                    }
                    out.push_str("</span></div>\n");
                }
            }
            out.push_str("</div>\n");
        }

        for highlight in self.image_highlights()? {
            let style = zone_style(&highlight)?;
            out.push_str("<span class=\"annotator-hl image-annotation-highlight\"");
            if let Some(id) = highlight.highlight_id()? {
                out.push_str(" data-annotation-id=\"");
                escape(&id, &mut out);
                out.push('"');
            }
            push_style(&style, &mut out);
            out.push_str("></span>\n");
        }

        Ok(out)
    }
}

fn push_style(style: &ZoneStyle, out: &mut String) {
    if !style.is_empty() {
        out.push(' ');
        out.push_str(&style.attr_string());
    }
}

fn escape(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
