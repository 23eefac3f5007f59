//! YAML front matter for the generated collection documents.
//!
//! Field order in the serialized output follows struct declaration
//! order, matching what site templates and their authors expect to
//! see when they open the files.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::tei::{Note, Page};

/// Front matter for one volume page document.
#[derive(Debug, Serialize)]
pub struct PageFrontMatter {
    pub title: String,
    pub page_order: i64,
    pub tei_id: Option<String>,
    pub annotation_count: usize,
    /// Image urls keyed by rendition label.
    pub images: BTreeMap<String, Option<String>>,
}

impl PageFrontMatter {
    pub fn from_page(page: &Page<'_>) -> Result<Self> {
        let mut images = BTreeMap::new();
        for (rend, graphic) in page.images_by_rendition()? {
            images.insert(rend, graphic.url()?);
        }
        Ok(Self {
            title: format!("Page {}", page.label()?.unwrap_or_default()),
            page_order: page.number()?,
            tei_id: page.id()?,
            annotation_count: page.annotation_count()?,
            images,
        })
    }
}

/// Front matter for one annotation document.
#[derive(Debug, Serialize)]
pub struct AnnotationFrontMatter {
    pub annotation_id: String,
    pub author: Option<String>,
    /// Raw target attribute, kept for round-tripping.
    pub tei_target: String,
    /// xml:id of the page the annotation is anchored on.
    pub annotated_page: Option<String>,
    /// Start reference id, `#` stripped.
    pub target: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// End reference id, present for range targets only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_target: Option<String>,
}

impl AnnotationFrontMatter {
    pub fn from_note(note: &Note<'_>) -> Result<Self> {
        let parsed = note.parsed_target()?;
        Ok(Self {
            annotation_id: note.annotation_id()?,
            author: note.author()?,
            tei_target: note.target()?,
            annotated_page: note.annotated_page()?.id()?,
            target: parsed.start,
            tags: note.tags()?,
            end_target: parsed.end,
        })
    }
}

/// Front matter for a tag stub page.
#[derive(Debug, Serialize)]
pub struct TagStub {
    pub layout: &'static str,
    pub tag: String,
}

impl TagStub {
    pub fn new(slug: &str) -> Self {
        Self {
            layout: "annotation_by_tag",
            tag: slug.to_string(),
        }
    }
}

/// One entry in the tags data file.
#[derive(Debug, Serialize)]
pub struct TagData {
    pub name: String,
}

/// Renders a front-matter document: a YAML block between `---` fences
/// followed by the body.
pub fn document<T: Serialize>(front: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(front)?;
    Ok(format!("---\n{yaml}---\n{body}"))
}
