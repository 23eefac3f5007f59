//! Typed views over an annotated TEI facsimile document.
//!
//! [`TeiDocument`] owns the parsed tree. Everything else is a cheap
//! view struct borrowing from it: header metadata, bibliographic
//! records, page surfaces, OCR zones and annotation notes. Views
//! resolve their queries against the live tree on each access.

pub mod note;
pub mod page;
pub mod zone;

pub use note::{Note, Target, TargetKind};
pub use page::Page;
pub use zone::{Zone, ZoneKind};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::bind::{Binding, Cursor, ElementView};
use crate::error::{Error, Result};
use crate::xml::{NodeId, XmlTree, parse_bytes};

/// An in-memory TEI facsimile document.
pub struct TeiDocument {
    tree: XmlTree,
}

impl TeiDocument {
    /// Reads and parses a TEI file, honoring its declared encoding.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            tree: parse_bytes(bytes)?,
        })
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        Ok(Self {
            tree: crate::xml::parse(xml)?,
        })
    }

    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Root view over this document.
    pub fn facsimile(&self) -> TeiFacsimile<'_> {
        TeiFacsimile::bind(&self.tree, self.tree.document())
    }
}

/// Document-wide accessors: header metadata, pages, annotations and
/// tag definitions.
#[derive(Clone, Copy)]
pub struct TeiFacsimile<'a> {
    cur: Cursor<'a>,
}

impl<'a> ElementView<'a> for TeiFacsimile<'a> {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
        Self {
            cur: Cursor::new(tree, node),
        }
    }
}

impl<'a> TeiFacsimile<'a> {
    const TITLE_STATEMENT: Binding = Binding::scalar("//t:teiHeader/t:fileDesc/t:titleStmt");
    const TITLE: Binding = Binding::scalar(
        r#"//t:teiHeader/t:fileDesc/t:titleStmt/t:title[@type="full"]/t:title[@type="main"]"#,
    );
    const SUBTITLE: Binding = Binding::scalar(
        r#"//t:teiHeader/t:fileDesc/t:titleStmt/t:title[@type="full"]/t:title[@type="sub"]"#,
    );
    const SOURCE_BIBL: Binding =
        Binding::keyed("//t:teiHeader/t:fileDesc/t:sourceDesc/t:bibl", "@type");
    const PAGES: Binding = Binding::list(r#"//t:facsimile/t:surface[@type="page"]"#);
    const ANNOTATIONS: Binding = Binding::list(r#"//t:note[@type="annotation"]"#);
    const TAGS: Binding = Binding::keyed("//t:back/t:interpGrp/t:interp", "@xml:id");

    pub fn title_statement(&self) -> Result<TitleStatement<'a>> {
        self.cur
            .view(&Self::TITLE_STATEMENT)?
            .ok_or_else(|| Error::MissingElement("teiHeader/fileDesc/titleStmt".to_string()))
    }

    /// Main title, read through the nested `title[type="full"]`
    /// grouping. [`TitleStatement::title`] is the lenient variant.
    pub fn title(&self) -> Result<Option<String>> {
        self.cur.text(&Self::TITLE)
    }

    pub fn subtitle(&self) -> Result<Option<String>> {
        self.cur.text(&Self::SUBTITLE)
    }

    /// Bibliographic records keyed by their type, conventionally
    /// `digital` and `original`.
    pub fn source_bibl(&self) -> Result<BTreeMap<String, Bibl<'a>>> {
        self.cur.keyed_views(&Self::SOURCE_BIBL)
    }

    /// Page surfaces in document order.
    pub fn pages(&self) -> Result<Vec<Page<'a>>> {
        self.cur.views(&Self::PAGES)
    }

    /// Annotation notes in document order.
    pub fn annotations(&self) -> Result<Vec<Note<'a>>> {
        self.cur.views(&Self::ANNOTATIONS)
    }

    /// Tag definitions from the back matter, keyed by slug.
    pub fn tags(&self) -> Result<BTreeMap<String, Interp<'a>>> {
        self.cur.keyed_views(&Self::TAGS)
    }
}

/// The `titleStmt` block of the TEI header.
#[derive(Debug, Clone, Copy)]
pub struct TitleStatement<'a> {
    cur: Cursor<'a>,
}

impl<'a> ElementView<'a> for TitleStatement<'a> {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
        Self {
            cur: Cursor::new(tree, node),
        }
    }
}

impl TitleStatement<'_> {
    const TITLE: Binding = Binding::scalar(r#".//t:title[@type="main"]"#);
    const SUBTITLE: Binding = Binding::scalar(r#".//t:title[@type="sub"]"#);

    pub fn title(&self) -> Result<Option<String>> {
        self.cur.text(&Self::TITLE)
    }

    pub fn subtitle(&self) -> Result<Option<String>> {
        self.cur.text(&Self::SUBTITLE)
    }
}

/// A bibliographic record from `sourceDesc`.
#[derive(Clone, Copy)]
pub struct Bibl<'a> {
    cur: Cursor<'a>,
}

impl<'a> ElementView<'a> for Bibl<'a> {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
        Self {
            cur: Cursor::new(tree, node),
        }
    }
}

impl<'a> Bibl<'a> {
    const RECORD_TYPE: Binding = Binding::scalar("@type");
    const TITLE: Binding = Binding::scalar("t:title");
    const DATE: Binding = Binding::scalar("t:date");
    const AUTHOR: Binding = Binding::scalar("t:author");
    const REFERENCES: Binding = Binding::keyed("t:ref", "@type");

    pub fn record_type(&self) -> Result<Option<String>> {
        self.cur.text(&Self::RECORD_TYPE)
    }

    pub fn title(&self) -> Result<Option<String>> {
        self.cur.text(&Self::TITLE)
    }

    pub fn date(&self) -> Result<Option<String>> {
        self.cur.text(&Self::DATE)
    }

    pub fn author(&self) -> Result<Option<String>> {
        self.cur.text(&Self::AUTHOR)
    }

    /// Outbound references keyed by type, e.g. `digital-edition` and
    /// `pdf` on the digital record.
    pub fn references(&self) -> Result<BTreeMap<String, Ref<'a>>> {
        self.cur.keyed_views(&Self::REFERENCES)
    }
}

/// A typed link inside a bibliographic record.
#[derive(Clone, Copy)]
pub struct Ref<'a> {
    cur: Cursor<'a>,
}

impl<'a> ElementView<'a> for Ref<'a> {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
        Self {
            cur: Cursor::new(tree, node),
        }
    }
}

impl Ref<'_> {
    const REF_TYPE: Binding = Binding::scalar("@type");
    const TARGET: Binding = Binding::scalar("@target");

    pub fn ref_type(&self) -> Result<Option<String>> {
        self.cur.text(&Self::REF_TYPE)
    }

    pub fn target(&self) -> Result<Option<String>> {
        self.cur.text(&Self::TARGET)
    }
}

/// An image resource attached to a page surface.
#[derive(Clone, Copy)]
pub struct Graphic<'a> {
    cur: Cursor<'a>,
}

impl<'a> ElementView<'a> for Graphic<'a> {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
        Self {
            cur: Cursor::new(tree, node),
        }
    }
}

impl Graphic<'_> {
    const REND: Binding = Binding::scalar("@rend");
    const URL: Binding = Binding::scalar("@url");

    /// Rendition label: `page`, `thumbnail`, `small-thumbnail`, ...
    pub fn rend(&self) -> Result<Option<String>> {
        self.cur.text(&Self::REND)
    }

    pub fn url(&self) -> Result<Option<String>> {
        self.cur.text(&Self::URL)
    }
}

/// One tag definition from the back matter (`interp` element). The
/// xml:id is the tag slug; the element text is the display name.
#[derive(Clone, Copy)]
pub struct Interp<'a> {
    cur: Cursor<'a>,
}

impl<'a> ElementView<'a> for Interp<'a> {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
        Self {
            cur: Cursor::new(tree, node),
        }
    }
}

impl Interp<'_> {
    const ID: Binding = Binding::scalar("@xml:id");

    pub fn id(&self) -> Result<Option<String>> {
        self.cur.text(&Self::ID)
    }

    /// Display name of the tag.
    pub fn value(&self) -> String {
        self.cur.tree().collect_text(self.cur.node())
    }
}
