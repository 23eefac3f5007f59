//! Zone geometry: typed views over rectangular regions of a page image.

use crate::bind::{Binding, Cursor, ElementView};
use crate::error::{Error, Result};
use crate::xml::{NodeId, XmlTree};

/// Zone classification from the source vocabulary's `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    /// `textLine` (mets-alto) or `line` (abbyy) OCR lines.
    TextLine,
    /// `string` zones: single OCR words inside a line.
    Word,
    /// `image-annotation-highlight` overlay boxes.
    ImageHighlight,
    /// `page` surfaces. A page is itself a zone; it carries the same
    /// coordinate attributes and serves as the reference box for its
    /// children.
    Page,
    /// Anything else. Unrecognized kinds are rendering no-ops.
    Other,
}

impl ZoneKind {
    fn from_attr(value: Option<&str>) -> ZoneKind {
        match value {
            Some("textLine") | Some("line") => ZoneKind::TextLine,
            Some("string") => ZoneKind::Word,
            Some("image-annotation-highlight") => ZoneKind::ImageHighlight,
            Some("page") => ZoneKind::Page,
            _ => ZoneKind::Other,
        }
    }
}

/// A rectangular region in source-image pixel space.
///
/// Corner coordinates are required; everything else is optional. The
/// parent-zone and page relations are looked up from the live tree on
/// each access, never stored.
#[derive(Debug, Clone, Copy)]
pub struct Zone<'a> {
    cur: Cursor<'a>,
}

impl<'a> ElementView<'a> for Zone<'a> {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
        Self {
            cur: Cursor::new(tree, node),
        }
    }
}

impl<'a> Zone<'a> {
    const ID: Binding = Binding::scalar("@xml:id");
    const LABEL: Binding = Binding::scalar("@n");
    const KIND: Binding = Binding::scalar("@type");
    const ULX: Binding = Binding::scalar("@ulx");
    const ULY: Binding = Binding::scalar("@uly");
    const LRX: Binding = Binding::scalar("@lrx");
    const LRY: Binding = Binding::scalar("@lry");
    const HREF: Binding = Binding::scalar("@xlink:href");
    const TEXT: Binding = Binding::scalar("t:line|t:w");
    const WORD_ZONES: Binding = Binding::list(r#".//t:zone[@type="string"]"#);
    const PARENT: Binding = Binding::scalar("ancestor::t:zone");
    const PAGE: Binding = Binding::scalar(r#"ancestor::t:surface[@type="page"]"#);

    pub fn node(&self) -> NodeId {
        self.cur.node()
    }

    /// Short name for error messages: the xml:id when present.
    pub(crate) fn describe(&self) -> String {
        self.cur.describe()
    }

    pub fn id(&self) -> Result<Option<String>> {
        self.cur.text(&Self::ID)
    }

    /// Sequence-number label (`n` attribute).
    pub fn label(&self) -> Result<Option<String>> {
        self.cur.text(&Self::LABEL)
    }

    pub fn kind(&self) -> Result<ZoneKind> {
        Ok(ZoneKind::from_attr(self.cur.text(&Self::KIND)?.as_deref()))
    }

    /// A required coordinate: absence is invalid geometry, same as
    /// malformed text.
    fn coord(&self, binding: &Binding, name: &str) -> Result<f64> {
        self.cur.float(binding)?.ok_or_else(|| Error::InvalidZoneGeometry {
            zone: self.cur.describe(),
            reason: format!("missing coordinate {name}"),
        })
    }

    pub fn ulx(&self) -> Result<f64> {
        self.coord(&Self::ULX, "ulx")
    }

    pub fn uly(&self) -> Result<f64> {
        self.coord(&Self::ULY, "uly")
    }

    pub fn lrx(&self) -> Result<f64> {
        self.coord(&Self::LRX, "lrx")
    }

    pub fn lry(&self) -> Result<f64> {
        self.coord(&Self::LRY, "lry")
    }

    /// Width in pixels. Inverted coordinates are not validated, so this
    /// may be negative.
    pub fn width(&self) -> Result<f64> {
        Ok(self.lrx()? - self.ulx()?)
    }

    pub fn height(&self) -> Result<f64> {
        Ok(self.lry()? - self.uly()?)
    }

    /// Size of the longer edge.
    pub fn long_edge(&self) -> Result<f64> {
        Ok(self.width()?.max(self.height()?))
    }

    /// Raw OCR text: the `line` child for abbyy lines, the `w` child
    /// for words. Line zones built from word zones carry no text of
    /// their own.
    pub fn text(&self) -> Result<Option<String>> {
        self.cur.text(&Self::TEXT)
    }

    /// Highlight reference (`xlink:href`), present on image highlights.
    pub fn href(&self) -> Result<Option<String>> {
        self.cur.text(&Self::HREF)
    }

    /// Word zones at any depth below this zone, in document order.
    pub fn word_zones(&self) -> Result<Vec<Zone<'a>>> {
        self.cur.views(&Self::WORD_ZONES)
    }

    /// Arithmetic mean of the word-zone heights, or `None` when the
    /// zone has no word zones. "No data" is distinct from "zero
    /// height": the layout computation falls back to the zone's own
    /// height only in the former case.
    pub fn average_word_height(&self) -> Result<Option<f64>> {
        let words = self.word_zones()?;
        if words.is_empty() {
            return Ok(None);
        }
        let mut sum = 0.0;
        for word in &words {
            sum += word.height()?;
        }
        Ok(Some(sum / words.len() as f64))
    }

    /// Nearest enclosing zone element, if any. Top-level lines sit
    /// directly on the page surface and have none.
    pub fn parent_zone(&self) -> Result<Option<Zone<'a>>> {
        self.cur.view(&Self::PARENT)
    }

    /// The enclosing page surface, viewed as a zone for geometry math.
    ///
    /// Every zone must be reachable from a page in a well-formed
    /// document.
    pub fn page(&self) -> Result<Zone<'a>> {
        self.cur.view(&Self::PAGE)?.ok_or_else(|| Error::OrphanZone {
            zone: self.cur.describe(),
            expected: "page surface",
        })
    }

    /// Annotation id for image highlights: the zone id with its
    /// `highlight-` prefix stripped. Other kinds have none.
    pub fn highlight_id(&self) -> Result<Option<String>> {
        if self.kind()? != ZoneKind::ImageHighlight {
            return Ok(None);
        }
        Ok(self
            .id()?
            .map(|id| id.strip_prefix("highlight-").unwrap_or(&id).to_string()))
    }
}
