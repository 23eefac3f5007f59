//! Annotation notes and their target references.

use std::cell::OnceCell;

use crate::bind::{Binding, Cursor, ElementView};
use crate::error::{Error, Result};
use crate::tei::page::Page;
use crate::xml::{NodeId, TEI_NS, XmlTree};

/// A parsed note target.
///
/// Two forms exist: `#id` pointing at a single highlight zone, and
/// `#range(#start, #end)` spanning a run of text between two anchors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    /// Start id with its `#` stripped.
    pub start: String,
    /// End id, present only for ranges.
    pub end: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Single,
    Range,
}

impl Target {
    /// Parses a raw `target` attribute value.
    ///
    /// Ranges must use the exact `#range(a, b)` shape with a two-part
    /// `", "` separator; the inner ids may appear with or without
    /// their leading `#`.
    pub fn parse(raw: &str) -> Result<Target> {
        let malformed = || Error::MalformedTargetReference { target: raw.to_string() };

        if let Some(inner) = raw.strip_prefix("#range(") {
            let inner = inner.strip_suffix(')').ok_or_else(malformed)?;
            let parts: Vec<&str> = inner.split(", ").collect();
            let &[start, end] = parts.as_slice() else {
                return Err(malformed());
            };
            let start = strip_ref(start);
            let end = strip_ref(end);
            if start.is_empty() || end.is_empty() {
                return Err(malformed());
            }
            Ok(Target {
                kind: TargetKind::Range,
                start,
                end: Some(end),
            })
        } else if let Some(id) = raw.strip_prefix('#') {
            if id.is_empty() {
                return Err(malformed());
            }
            Ok(Target {
                kind: TargetKind::Single,
                start: id.to_string(),
                end: None,
            })
        } else {
            Err(malformed())
        }
    }
}

fn strip_ref(part: &str) -> String {
    let part = part.trim();
    part.strip_prefix('#').unwrap_or(part).to_string()
}

/// A user annotation (`note type="annotation"`).
///
/// The annotated page is resolved from the target on first use and
/// cached for the lifetime of this view; the underlying tree is
/// immutable once parsed, so the answer cannot change.
pub struct Note<'a> {
    cur: Cursor<'a>,
    page_node: OnceCell<NodeId>,
}

impl<'a> ElementView<'a> for Note<'a> {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
        Self {
            cur: Cursor::new(tree, node),
            page_node: OnceCell::new(),
        }
    }
}

impl<'a> Note<'a> {
    const ID: Binding = Binding::scalar("@xml:id");
    const AUTHOR: Binding = Binding::scalar("@resp");
    const TARGET: Binding = Binding::scalar("@target");
    const ANA: Binding = Binding::scalar("@ana");
    const MARKDOWN: Binding = Binding::scalar(r#".//t:code[@lang="markdown"]"#);

    pub fn id(&self) -> Result<String> {
        self.cur
            .text(&Self::ID)?
            .ok_or_else(|| Error::MissingElement(format!("xml:id on {}", self.cur.describe())))
    }

    /// Annotation id: the note id with its `annotation-` prefix
    /// stripped.
    pub fn annotation_id(&self) -> Result<String> {
        let id = self.id()?;
        Ok(id.strip_prefix("annotation-").unwrap_or(&id).to_string())
    }

    pub fn author(&self) -> Result<Option<String>> {
        self.cur.text(&Self::AUTHOR)
    }

    /// Raw target attribute, before parsing.
    pub fn target(&self) -> Result<String> {
        self.cur
            .text(&Self::TARGET)?
            .ok_or_else(|| Error::MissingElement(format!("target on {}", self.cur.describe())))
    }

    pub fn parsed_target(&self) -> Result<Target> {
        Target::parse(&self.target()?)
    }

    /// Markdown source of the annotation body, if any.
    pub fn markdown(&self) -> Result<Option<String>> {
        self.cur.text(&Self::MARKDOWN)
    }

    /// Tag ids from the `ana` attribute: whitespace-separated refs,
    /// each with its `#` stripped.
    pub fn tags(&self) -> Result<Vec<String>> {
        let Some(ana) = self.cur.text(&Self::ANA)? else {
            return Ok(Vec::new());
        };
        Ok(ana
            .split_whitespace()
            .map(|tag| tag.strip_prefix('#').unwrap_or(tag).to_string())
            .collect())
    }

    /// The page surface containing the target of this note.
    ///
    /// For ranges the start anchor decides; an annotation cannot span
    /// pages.
    pub fn annotated_page(&self) -> Result<Page<'a>> {
        if let Some(&node) = self.page_node.get() {
            return Ok(Page::bind(self.cur.tree(), node));
        }
        let node = self.locate_page()?;
        let _ = self.page_node.set(node);
        Ok(Page::bind(self.cur.tree(), node))
    }

    fn locate_page(&self) -> Result<NodeId> {
        let raw = self.target()?;
        let target = Target::parse(&raw)?;
        let tree = self.cur.tree();

        let unresolved = || Error::UnresolvedAnnotationTarget { target: raw.clone() };

        let referenced = tree.get_by_id(&target.start).ok_or_else(unresolved)?;
        std::iter::once(referenced)
            .chain(tree.ancestors(referenced))
            .find(|&node| {
                tree.element_name(node)
                    .is_some_and(|name| name.matches(Some(TEI_NS), "surface"))
                    && tree.attr(node, None, "type").is_some_and(|t| t == "page")
            })
            .ok_or_else(unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    #[test]
    fn test_parse_single_target() {
        let target = Target::parse("#highlight-w42").unwrap();
        assert_eq!(target.kind, TargetKind::Single);
        assert_eq!(target.start, "highlight-w42");
        assert_eq!(target.end, None);
    }

    #[test]
    fn test_parse_range_target() {
        let target = Target::parse("#range(#anchor-1, #zone.38.1)").unwrap();
        assert_eq!(target.kind, TargetKind::Range);
        assert_eq!(target.start, "anchor-1");
        assert_eq!(target.end.as_deref(), Some("zone.38.1"));
    }

    #[test]
    fn test_parse_range_inner_hash_optional() {
        let target = Target::parse("#range(a, b)").unwrap();
        assert_eq!(target.start, "a");
        assert_eq!(target.end.as_deref(), Some("b"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in [
            "",
            "w42",
            "#",
            "#range(#a)",
            "#range(#a, #b",
            "#range(#a, #b, #c)",
            "#range(#a,#b)",
            "#range(, #b)",
        ] {
            assert!(
                matches!(
                    Target::parse(raw),
                    Err(Error::MalformedTargetReference { .. })
                ),
                "accepted {raw:?}"
            );
        }
    }

    const DOC: &str = r##"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <text>
    <note type="annotation" xml:id="annotation-aaa" resp="sima" target="#highlight-aaa"
          ana="#hiking #woods">
      <code lang="markdown">Walden pond **view**</code>
    </note>
    <note type="annotation" xml:id="annotation-bbb" resp="henry"
          target="#range(#anchor-bbb, #zone.2.9)"/>
    <note type="annotation" xml:id="annotation-ccc" target="#nowhere"/>
  </text>
  <facsimile>
    <surface type="page" xml:id="page1" ulx="0" uly="0" lrx="100" lry="100">
      <zone type="image-annotation-highlight" xml:id="highlight-aaa"
            ulx="1" uly="1" lrx="2" lry="2"/>
    </surface>
    <surface type="page" xml:id="page2" ulx="0" uly="0" lrx="100" lry="100">
      <zone type="textLine" xml:id="line9" ulx="0" uly="0" lrx="9" lry="9">
        <anchor type="text-annotation-highlight-start" xml:id="anchor-bbb"/>
      </zone>
    </surface>
  </facsimile>
</TEI>"##;

    fn note<'a>(tree: &'a crate::xml::XmlTree, id: &str) -> Note<'a> {
        Note::bind(tree, tree.get_by_id(id).unwrap())
    }

    #[test]
    fn test_note_fields() {
        let tree = parse(DOC).unwrap();
        let n = note(&tree, "annotation-aaa");

        assert_eq!(n.id().unwrap(), "annotation-aaa");
        assert_eq!(n.annotation_id().unwrap(), "aaa");
        assert_eq!(n.author().unwrap().as_deref(), Some("sima"));
        assert_eq!(n.target().unwrap(), "#highlight-aaa");
        assert_eq!(
            n.markdown().unwrap().as_deref(),
            Some("Walden pond **view**")
        );
        assert_eq!(n.tags().unwrap(), vec!["hiking", "woods"]);
    }

    #[test]
    fn test_note_without_tags() {
        let tree = parse(DOC).unwrap();
        assert!(note(&tree, "annotation-bbb").tags().unwrap().is_empty());
    }

    #[test]
    fn test_annotated_page_for_highlight() {
        let tree = parse(DOC).unwrap();
        let page = note(&tree, "annotation-aaa").annotated_page().unwrap();
        assert_eq!(page.id().unwrap().as_deref(), Some("page1"));
    }

    #[test]
    fn test_annotated_page_for_range_uses_start() {
        let tree = parse(DOC).unwrap();
        let n = note(&tree, "annotation-bbb");
        let page = n.annotated_page().unwrap();
        assert_eq!(page.id().unwrap().as_deref(), Some("page2"));

        // second lookup hits the cache and agrees
        let again = n.annotated_page().unwrap();
        assert_eq!(again.id().unwrap().as_deref(), Some("page2"));
    }

    #[test]
    fn test_unresolved_target() {
        let tree = parse(DOC).unwrap();
        match note(&tree, "annotation-ccc").annotated_page().unwrap_err() {
            Error::UnresolvedAnnotationTarget { target } => assert_eq!(target, "#nowhere"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
