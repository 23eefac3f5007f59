//! Path queries over the arena tree.
//!
//! Binding declarations locate nodes with a small path language covering
//! what the TEI facsimile vocabulary needs:
//!
//! - `@n`, `@xml:id` — attribute of the bound element
//! - `t:graphic` — child elements
//! - `t:surface/t:zone` — chained child steps
//! - `.//t:zone[@type="string"]` — descendants at any depth
//! - `//t:note[@type="annotation"]` — anywhere in the document
//! - `ancestor::t:zone` — nearest matching ancestor
//! - `t:line|t:w` — union of paths, merged in document order
//!
//! Predicates test attributes for equality and may chain alternatives
//! with `or`. The `t`, `xml` and `xlink` prefixes are recognized.

use crate::error::{Error, Result};
use crate::xml::{NodeId, TEI_NS, XML_NS, XLINK_NS, XmlTree};

/// A parsed path query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    paths: Vec<Path>,
}

#[derive(Debug, Clone, PartialEq)]
struct Path {
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    test: Test,
}

/// Where a step looks, relative to the nodes matched so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    /// `.//` — any depth below.
    Descendant,
    /// `//` — any depth below the document root.
    Document,
    /// `ancestor::` — the nearest matching ancestor.
    Ancestor,
}

#[derive(Debug, Clone, PartialEq)]
enum Test {
    Element {
        ns: Option<&'static str>,
        /// `None` is the `*` wildcard.
        local: Option<String>,
        predicates: Vec<Predicate>,
    },
    Attribute {
        ns: Option<&'static str>,
        local: String,
    },
}

/// `[@a="x" or @a="y"]` — passes when any alternative holds.
#[derive(Debug, Clone, PartialEq)]
struct Predicate {
    any_of: Vec<AttrEquals>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrEquals {
    ns: Option<&'static str>,
    local: String,
    value: String,
}

/// A single query result.
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    Element(NodeId),
    Attribute(String),
}

impl Query {
    /// Parse a query string.
    pub fn parse(input: &str) -> Result<Query> {
        let parse_err = |reason: &str| Error::Query {
            query: input.to_string(),
            reason: reason.to_string(),
        };

        let mut paths = Vec::new();
        for part in split_top_level(input, '|') {
            let part = part.trim();
            if part.is_empty() {
                return Err(parse_err("empty path"));
            }
            paths.push(parse_path(part).map_err(|reason| parse_err(&reason))?);
        }
        if paths.is_empty() {
            return Err(parse_err("empty query"));
        }
        Ok(Query { paths })
    }

    /// Evaluate against the tree, starting from `origin`.
    ///
    /// Element matches come back in document order; union branches are
    /// merged and deduplicated.
    pub fn eval(&self, tree: &XmlTree, origin: NodeId) -> Vec<Match> {
        let mut elements: Vec<NodeId> = Vec::new();
        let mut attributes: Vec<String> = Vec::new();

        for path in &self.paths {
            for m in eval_path(path, tree, origin) {
                match m {
                    Match::Element(id) => elements.push(id),
                    Match::Attribute(value) => attributes.push(value),
                }
            }
        }

        // Arena ids are assigned in document order during parsing
        elements.sort_by_key(|id| id.0);
        elements.dedup();

        let mut out: Vec<Match> = elements.into_iter().map(Match::Element).collect();
        out.extend(attributes.into_iter().map(Match::Attribute));
        out
    }

    /// Evaluate and return the first match, if any.
    pub fn first(&self, tree: &XmlTree, origin: NodeId) -> Option<Match> {
        self.eval(tree, origin).into_iter().next()
    }
}

fn eval_path(path: &Path, tree: &XmlTree, origin: NodeId) -> Vec<Match> {
    let mut current = vec![origin];

    for step in &path.steps {
        // The parser guarantees attribute steps come last
        if let Test::Attribute { ns, local } = &step.test {
            return current
                .iter()
                .filter_map(|&node| tree.attr(node, *ns, local))
                .map(|v| Match::Attribute(v.to_string()))
                .collect();
        }

        let mut next = Vec::new();
        for &node in &current {
            match step.axis {
                Axis::Child => {
                    for child in tree.children(node) {
                        if element_matches(tree, child, &step.test) {
                            next.push(child);
                        }
                    }
                }
                Axis::Descendant => {
                    for desc in tree.descendants(node) {
                        if element_matches(tree, desc, &step.test) {
                            next.push(desc);
                        }
                    }
                }
                Axis::Document => {
                    for desc in tree.descendants(tree.document()) {
                        if element_matches(tree, desc, &step.test) {
                            next.push(desc);
                        }
                    }
                }
                Axis::Ancestor => {
                    if let Some(hit) = tree
                        .ancestors(node)
                        .find(|&a| element_matches(tree, a, &step.test))
                    {
                        next.push(hit);
                    }
                }
            }
        }
        current = next;
    }

    current.into_iter().map(Match::Element).collect()
}

fn element_matches(tree: &XmlTree, id: NodeId, test: &Test) -> bool {
    let Test::Element {
        ns,
        local,
        predicates,
    } = test
    else {
        return false;
    };
    let Some(name) = tree.element_name(id) else {
        return false;
    };

    if let Some(local) = local {
        if name.local != *local || name.ns.as_deref() != *ns {
            return false;
        }
    }

    predicates.iter().all(|p| {
        p.any_of
            .iter()
            .any(|eq| tree.attr(id, eq.ns, &eq.local) == Some(eq.value.as_str()))
    })
}

/// Split on a separator, ignoring occurrences inside `[...]` predicates
/// or quoted strings.
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                c if c == sep && depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_path(input: &str) -> std::result::Result<Path, String> {
    let (axis, rest) = if let Some(rest) = input.strip_prefix(".//") {
        (Axis::Descendant, rest)
    } else if let Some(rest) = input.strip_prefix("//") {
        (Axis::Document, rest)
    } else if let Some(rest) = input.strip_prefix("ancestor::") {
        (Axis::Ancestor, rest)
    } else {
        (Axis::Child, input)
    };

    let mut steps = Vec::new();
    let raw_steps = split_top_level(rest, '/');
    for (i, raw) in raw_steps.iter().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("empty step".to_string());
        }
        let axis = if i == 0 { axis } else { Axis::Child };
        let test = parse_test(raw)?;

        if matches!(test, Test::Attribute { .. }) {
            if i + 1 != raw_steps.len() {
                return Err("attribute step must be last".to_string());
            }
            if axis != Axis::Child {
                return Err("attribute step cannot take an axis".to_string());
            }
        }
        steps.push(Step { axis, test });
    }

    Ok(Path { steps })
}

fn parse_test(input: &str) -> std::result::Result<Test, String> {
    if let Some(name) = input.strip_prefix('@') {
        let (ns, local) = parse_name(name)?;
        let local = local.ok_or("attribute name cannot be a wildcard")?;
        return Ok(Test::Attribute { ns, local });
    }

    let name_end = input.find('[').unwrap_or(input.len());
    let (ns, local) = parse_name(input[..name_end].trim())?;

    let mut predicates = Vec::new();
    let mut rest = &input[name_end..];
    while let Some(inner) = rest.strip_prefix('[') {
        let close = find_close(inner).ok_or("unterminated predicate")?;
        predicates.push(parse_predicate(&inner[..close])?);
        rest = &inner[close + 1..];
    }
    if !rest.is_empty() {
        return Err(format!("unexpected trailing input {rest:?}"));
    }

    Ok(Test::Element {
        ns,
        local,
        predicates,
    })
}

/// Position of the `]` closing a predicate whose `[` was consumed.
fn find_close(input: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                ']' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

fn parse_predicate(input: &str) -> std::result::Result<Predicate, String> {
    let mut any_of = Vec::new();
    for clause in input.split(" or ") {
        let clause = clause.trim();
        let clause = clause
            .strip_prefix('@')
            .ok_or_else(|| format!("predicate must test an attribute: {clause:?}"))?;
        let (name, value) = clause
            .split_once('=')
            .ok_or_else(|| format!("predicate must compare with '=': {clause:?}"))?;

        let (ns, local) = parse_name(name.trim())?;
        let local = local.ok_or("predicate attribute cannot be a wildcard")?;

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .ok_or_else(|| format!("predicate value must be quoted: {value:?}"))?;

        any_of.push(AttrEquals {
            ns,
            local,
            value: value.to_string(),
        });
    }
    Ok(Predicate { any_of })
}

/// Resolve `prefix:local`, bare `local`, or the `*` wildcard.
fn parse_name(
    input: &str,
) -> std::result::Result<(Option<&'static str>, Option<String>), String> {
    if input == "*" {
        return Ok((None, None));
    }
    if input.is_empty() {
        return Err("empty name".to_string());
    }
    match input.split_once(':') {
        Some((prefix, local)) => {
            let ns = match prefix {
                "t" => TEI_NS,
                "xml" => XML_NS,
                "xlink" => XLINK_NS,
                other => return Err(format!("unknown prefix {other:?}")),
            };
            Ok((Some(ns), Some(local.to_string())))
        }
        None => Ok((None, Some(input.to_string()))),
    }
}
