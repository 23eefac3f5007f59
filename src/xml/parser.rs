//! TEI document parsing (quick-xml events into the arena tree).

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::Result;
use crate::util::{decode_text, extract_xml_encoding};
use crate::xml::{Attribute, QName, XML_NS, XLINK_NS, XmlTree};

/// Parse raw bytes into an [`XmlTree`], decoding first.
///
/// The encoding is taken from the XML declaration when the bytes are
/// not valid UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> Result<XmlTree> {
    let hint = extract_xml_encoding(bytes).map(str::to_string);
    let content = decode_text(bytes, hint.as_deref());
    parse(&content)
}

/// Parse an XML string into an [`XmlTree`].
///
/// Element and attribute names are resolved against the in-scope
/// `xmlns` declarations; the `xml` and `xlink` prefixes are bound
/// implicitly. Text is kept verbatim, including whitespace, so that
/// embedded markdown survives untouched.
pub fn parse(xml: &str) -> Result<XmlTree> {
    let mut reader = Reader::from_str(xml);
    let mut tree = XmlTree::new();
    let mut namespaces = NamespaceStack::new();

    // Stack of open elements; the top is the current parent.
    let mut open: Vec<crate::xml::NodeId> = vec![tree.document()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let (bindings, attrs) = split_attributes(&e);
                namespaces.push(bindings);

                let name = resolve_name(e.name().as_ref(), &namespaces, true);
                let attrs = resolve_attributes(attrs, &namespaces);
                let node = tree.create_element(name, attrs);

                let parent = *open.last().unwrap_or(&tree.document());
                tree.append(parent, node);
                open.push(node);
            }
            Ok(Event::Empty(e)) => {
                let (bindings, attrs) = split_attributes(&e);
                namespaces.push(bindings);

                let name = resolve_name(e.name().as_ref(), &namespaces, true);
                let attrs = resolve_attributes(attrs, &namespaces);
                let node = tree.create_element(name, attrs);

                let parent = *open.last().unwrap_or(&tree.document());
                tree.append(parent, node);
                namespaces.pop();
            }
            Ok(Event::End(_)) => {
                if open.len() > 1 {
                    open.pop();
                    namespaces.pop();
                }
            }
            Ok(Event::Text(e)) => {
                let parent = *open.last().unwrap_or(&tree.document());
                tree.append_text(parent, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(e)) => {
                let parent = *open.last().unwrap_or(&tree.document());
                tree.append_text(parent, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    let parent = *open.last().unwrap_or(&tree.document());
                    tree.append_text(parent, &resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(tree)
}

/// In-scope namespace bindings, one frame per open element.
struct NamespaceStack {
    /// Each frame holds the (prefix, uri) pairs declared on one element;
    /// an empty prefix is the default namespace.
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceStack {
    fn new() -> Self {
        Self { frames: Vec::new() }
    }

    fn push(&mut self, bindings: Vec<(String, String)>) {
        self.frames.push(bindings);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    /// Resolve a prefix to a namespace URI, innermost scope first.
    fn resolve(&self, prefix: &str) -> Option<&str> {
        for frame in self.frames.iter().rev() {
            if let Some((_, uri)) = frame.iter().rev().find(|(p, _)| p == prefix) {
                return Some(uri.as_str());
            }
        }
        match prefix {
            "xml" => Some(XML_NS),
            "xlink" => Some(XLINK_NS),
            _ => None,
        }
    }

    /// The default namespace for unprefixed element names, if declared.
    fn default_ns(&self) -> Option<&str> {
        self.resolve("")
    }
}

/// Raw attribute before namespace resolution.
struct RawAttribute {
    key: Vec<u8>,
    value: String,
}

/// Separate `xmlns` declarations from ordinary attributes.
fn split_attributes(
    e: &quick_xml::events::BytesStart<'_>,
) -> (Vec<(String, String)>, Vec<RawAttribute>) {
    let mut bindings = Vec::new();
    let mut attrs = Vec::new();

    for attr in e.attributes().flatten() {
        let key = attr.key.as_ref();
        let value = unescape_value(&String::from_utf8_lossy(&attr.value));

        if key == b"xmlns" {
            bindings.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            bindings.push((String::from_utf8_lossy(prefix).to_string(), value));
        } else {
            attrs.push(RawAttribute {
                key: key.to_vec(),
                value,
            });
        }
    }

    (bindings, attrs)
}

/// Resolve a possibly prefixed name against the in-scope namespaces.
///
/// Unprefixed element names take the default namespace; unprefixed
/// attribute names take none.
fn resolve_name(name: &[u8], namespaces: &NamespaceStack, is_element: bool) -> QName {
    let name = String::from_utf8_lossy(name);
    match name.split_once(':') {
        Some((prefix, local)) => QName::new(namespaces.resolve(prefix), local),
        None if is_element => QName::new(namespaces.default_ns(), &name),
        None => QName::new(None, &name),
    }
}

fn resolve_attributes(raw: Vec<RawAttribute>, namespaces: &NamespaceStack) -> Vec<Attribute> {
    raw.into_iter()
        .map(|a| Attribute {
            name: resolve_name(&a.key, namespaces, false),
            value: a.value,
        })
        .collect()
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}

/// Expand entity references inside an attribute value.
fn unescape_value(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        match tail.find(';') {
            Some(end) => {
                match resolve_entity(&tail[..end]) {
                    Some(resolved) => out.push_str(&resolved),
                    // Unknown entity: keep it verbatim
                    None => {
                        out.push('&');
                        out.push_str(&tail[..end]);
                        out.push(';');
                    }
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
