//! Error types for tei2jekyll operations.

use thiserror::Error;

/// Errors that can occur while reading a TEI facsimile document or
/// generating site content from it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid binding query {query:?}: {reason}")]
    Query { query: String, reason: String },

    #[error("Missing required element: {0}")]
    MissingElement(String),

    /// A zone coordinate is missing or not a number.
    #[error("Invalid geometry for zone {zone}: {reason}")]
    InvalidZoneGeometry { zone: String, reason: String },

    /// A zone has no enclosing page surface (or, for word zones, no
    /// enclosing text line).
    #[error("Zone {zone} is not contained in a {expected}")]
    OrphanZone { zone: String, expected: &'static str },

    /// A layout reference dimension is zero, so percentage or scale
    /// math has no defined result.
    #[error("Degenerate geometry for zone {zone}: {reason}")]
    DegenerateGeometry { zone: String, reason: String },

    /// An annotation target points at an id that no page contains.
    #[error("Annotation target {target:?} does not resolve to a page")]
    UnresolvedAnnotationTarget { target: String },

    /// An annotation target matches neither the single-reference nor
    /// the range form.
    #[error("Malformed annotation target reference: {target:?}")]
    MalformedTargetReference { target: String },
}

pub type Result<T> = std::result::Result<T, Error>;
