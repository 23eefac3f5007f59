//! Declarative attribute bindings.
//!
//! Domain views declare each field as a [`Binding`]: a path query plus a
//! collection mode. A [`Cursor`] bound to one element interprets those
//! declarations, so adding a field to a view is a declaration plus a
//! one-line accessor — no bespoke traversal code. Sub-views implement
//! [`ElementView`] and nest arbitrarily deep (a page binds lines, a line
//! binds words).

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::xml::query::{Match, Query};
use crate::xml::{NodeId, XmlTree};

/// How matches for a field are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// First match only; absence is legal.
    Scalar,
    /// Every match, in document order.
    List,
    /// Every match, keyed by a secondary query evaluated per match.
    /// Duplicate keys keep the last match.
    Keyed { key: &'static str },
    /// Number of matches.
    Count,
}

/// A field declaration: where to look and how to collect.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub query: &'static str,
    pub mode: Mode,
}

impl Binding {
    pub const fn scalar(query: &'static str) -> Self {
        Self {
            query,
            mode: Mode::Scalar,
        }
    }

    pub const fn list(query: &'static str) -> Self {
        Self {
            query,
            mode: Mode::List,
        }
    }

    pub const fn keyed(query: &'static str, key: &'static str) -> Self {
        Self {
            query,
            mode: Mode::Keyed { key },
        }
    }

    pub const fn count(query: &'static str) -> Self {
        Self {
            query,
            mode: Mode::Count,
        }
    }
}

/// A typed view over one element of the tree.
///
/// Views are cheap handles (tree reference plus node id); relations to
/// other elements are recomputed from the live tree on each access.
pub trait ElementView<'a>: Sized {
    fn bind(tree: &'a XmlTree, node: NodeId) -> Self;
}

/// Resolver for binding declarations, bound to one element.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    tree: &'a XmlTree,
    node: NodeId,
}

impl<'a> Cursor<'a> {
    pub fn new(tree: &'a XmlTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    pub fn tree(&self) -> &'a XmlTree {
        self.tree
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The bound element's `xml:id`, or its name when it has none.
    /// Used to identify the element in error messages.
    pub fn describe(&self) -> String {
        if let Some(id) = self.tree.element_id(self.node) {
            return id.to_string();
        }
        match self.tree.element_name(self.node) {
            Some(name) => format!("<{}>", name.local),
            None => "<document>".to_string(),
        }
    }

    fn matches(&self, binding: &Binding) -> Result<Vec<Match>> {
        Ok(Query::parse(binding.query)?.eval(self.tree, self.node))
    }

    fn match_text(&self, m: &Match) -> String {
        match m {
            Match::Attribute(value) => value.clone(),
            Match::Element(id) => self.tree.collect_text(*id),
        }
    }

    /// Scalar text. Absence is `None`, never an error.
    pub fn text(&self, binding: &Binding) -> Result<Option<String>> {
        Ok(self
            .matches(binding)?
            .first()
            .map(|m| self.match_text(m)))
    }

    /// Scalar integer. Malformed text is an error; absence is `None`.
    pub fn int(&self, binding: &Binding) -> Result<Option<i64>> {
        match self.text(binding)? {
            Some(text) => {
                let value = text.trim().parse::<i64>().map_err(|_| self.coercion_error(binding, &text))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Scalar float. Malformed or non-finite text is an error; absence
    /// is `None`.
    pub fn float(&self, binding: &Binding) -> Result<Option<f64>> {
        match self.text(binding)? {
            Some(text) => {
                let value = text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| self.coercion_error(binding, &text))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn coercion_error(&self, binding: &Binding, text: &str) -> Error {
        Error::InvalidZoneGeometry {
            zone: self.describe(),
            reason: format!("{} is not a number: {text:?}", binding.query),
        }
    }

    /// Number of matches.
    pub fn count(&self, binding: &Binding) -> Result<usize> {
        Ok(self.matches(binding)?.len())
    }

    /// First matched element, if any.
    pub fn element(&self, binding: &Binding) -> Result<Option<NodeId>> {
        Ok(self.matches(binding)?.into_iter().find_map(|m| match m {
            Match::Element(id) => Some(id),
            Match::Attribute(_) => None,
        }))
    }

    /// All matched elements, in document order.
    pub fn elements(&self, binding: &Binding) -> Result<Vec<NodeId>> {
        Ok(self
            .matches(binding)?
            .into_iter()
            .filter_map(|m| match m {
                Match::Element(id) => Some(id),
                Match::Attribute(_) => None,
            })
            .collect())
    }

    /// First match as a typed sub-view.
    pub fn view<T: ElementView<'a>>(&self, binding: &Binding) -> Result<Option<T>> {
        Ok(self.element(binding)?.map(|id| T::bind(self.tree, id)))
    }

    /// Every match as a typed sub-view, in document order.
    pub fn views<T: ElementView<'a>>(&self, binding: &Binding) -> Result<Vec<T>> {
        Ok(self
            .elements(binding)?
            .into_iter()
            .map(|id| T::bind(self.tree, id))
            .collect())
    }

    /// Keyed map of sub-views. The key query runs against each matched
    /// element; matches without a key value are skipped, and duplicate
    /// keys keep the last match in document order.
    pub fn keyed_views<T: ElementView<'a>>(
        &self,
        binding: &Binding,
    ) -> Result<BTreeMap<String, T>> {
        let Mode::Keyed { key } = binding.mode else {
            return Err(Error::Query {
                query: binding.query.to_string(),
                reason: "binding is not keyed".to_string(),
            });
        };
        let key_query = Query::parse(key)?;

        let mut map = BTreeMap::new();
        for id in self.elements(binding)? {
            let Some(key_match) = key_query.first(self.tree, id) else {
                continue;
            };
            map.insert(self.match_text(&key_match), T::bind(self.tree, id));
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    const DOC: &str = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <bibl type="original">
    <title>Walden</title>
    <author>Thoreau, Henry David</author>
    <date>1854</date>
    <ref type="digital-edition" target="http://example.com/books/walden/"/>
    <ref type="pdf" target="http://example.com/books/walden.pdf"/>
  </bibl>
  <surface xml:id="page1" n="3" ulx="0" uly="0" lrx="1000" lry="bogus"/>
</TEI>"#;

    struct RefView<'a> {
        cur: Cursor<'a>,
    }

    impl<'a> ElementView<'a> for RefView<'a> {
        fn bind(tree: &'a XmlTree, node: NodeId) -> Self {
            Self {
                cur: Cursor::new(tree, node),
            }
        }
    }

    impl RefView<'_> {
        const TARGET: Binding = Binding::scalar("@target");

        fn target(&self) -> Result<Option<String>> {
            self.cur.text(&Self::TARGET)
        }
    }

    fn doc_cursor(tree: &XmlTree) -> Cursor<'_> {
        Cursor::new(tree, tree.root_element().unwrap())
    }

    #[test]
    fn test_scalar_text_and_absence() {
        let tree = parse(DOC).unwrap();
        let cur = doc_cursor(&tree);

        let title = Binding::scalar("t:bibl/t:title");
        assert_eq!(cur.text(&title).unwrap(), Some("Walden".to_string()));

        let missing = Binding::scalar("t:bibl/t:edition");
        assert_eq!(cur.text(&missing).unwrap(), None);
    }

    #[test]
    fn test_int_coercion() {
        let tree = parse(DOC).unwrap();
        let page = tree.get_by_id("page1").unwrap();
        let cur = Cursor::new(&tree, page);

        assert_eq!(cur.int(&Binding::scalar("@n")).unwrap(), Some(3));
        assert_eq!(cur.int(&Binding::scalar("@missing")).unwrap(), None);
    }

    #[test]
    fn test_float_coercion_fails_fast() {
        let tree = parse(DOC).unwrap();
        let page = tree.get_by_id("page1").unwrap();
        let cur = Cursor::new(&tree, page);

        assert_eq!(cur.float(&Binding::scalar("@ulx")).unwrap(), Some(0.0));
        assert_eq!(cur.float(&Binding::scalar("@lrx")).unwrap(), Some(1000.0));

        let err = cur.float(&Binding::scalar("@lry")).unwrap_err();
        match err {
            Error::InvalidZoneGeometry { zone, reason } => {
                assert_eq!(zone, "page1");
                assert!(reason.contains("bogus"), "unexpected reason: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_list_mode() {
        let tree = parse(DOC).unwrap();
        let cur = doc_cursor(&tree);

        let refs: Vec<RefView> = cur.views(&Binding::list("t:bibl/t:ref")).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(
            refs[0].target().unwrap().as_deref(),
            Some("http://example.com/books/walden/")
        );
    }

    #[test]
    fn test_keyed_mode_and_nesting() {
        let tree = parse(DOC).unwrap();
        let cur = doc_cursor(&tree);

        let by_type = Binding::keyed("t:bibl/t:ref", "@type");
        let refs: BTreeMap<String, RefView> = cur.keyed_views(&by_type).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(
            refs["pdf"].target().unwrap().as_deref(),
            Some("http://example.com/books/walden.pdf")
        );
    }

    #[test]
    fn test_keyed_mode_last_wins() {
        let tree = parse(
            r#"<root xmlns="http://www.tei-c.org/ns/1.0">
                 <ref type="pdf" target="first"/>
                 <ref type="pdf" target="second"/>
               </root>"#,
        )
        .unwrap();
        let cur = doc_cursor(&tree);

        let by_type = Binding::keyed("t:ref", "@type");
        let refs: BTreeMap<String, RefView> = cur.keyed_views(&by_type).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs["pdf"].target().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_count_mode() {
        let tree = parse(DOC).unwrap();
        let cur = doc_cursor(&tree);

        assert_eq!(cur.count(&Binding::count(".//t:ref")).unwrap(), 2);
        assert_eq!(cur.count(&Binding::count(".//t:anchor")).unwrap(), 0);
    }
}
