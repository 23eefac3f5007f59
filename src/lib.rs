//! # tei2jekyll
//!
//! Converts an annotated TEI facsimile document (a digitized book with
//! per-page OCR geometry and reader annotations, as exported by
//! Readux) into source content for a Jekyll static site.
//!
//! ## Features
//!
//! - Parses the TEI facsimile vocabulary into typed views: pages, OCR
//!   zones, annotation notes, bibliographic records and tags
//! - Computes page-relative CSS positioning so OCR text and highlight
//!   overlays track the page image at any display size
//! - Writes Jekyll collections (`_volume_pages/`, `_annotations/`),
//!   tag data and stub pages, and updates `_config.yml` in place
//!
//! ## Quick Start
//!
//! ```no_run
//! use tei2jekyll::TeiDocument;
//! use tei2jekyll::site::{ImportOptions, import_document};
//!
//! let doc = TeiDocument::open("volume.xml").unwrap();
//! let facsimile = doc.facsimile();
//! println!("{} pages", facsimile.pages().unwrap().len());
//!
//! import_document(&doc, ".".as_ref(), &ImportOptions::default()).unwrap();
//! ```

pub mod bind;
pub mod error;
pub mod layout;
pub mod site;
pub mod tei;
pub(crate) mod util;
pub mod xml;

pub use error::{Error, Result};
pub use layout::{REFERENCE_PAGE_SIZE, ZoneStyle, zone_style};
pub use tei::{Note, Page, TeiDocument, TeiFacsimile, Zone, ZoneKind};
