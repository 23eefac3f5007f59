//! Jekyll site generation from a parsed TEI facsimile document.
//!
//! Produces the source files a Jekyll build consumes:
//! - `_volume_pages/NNNN.html`: one document per page, front matter
//!   plus the OCR overlay markup
//! - `_annotations/<id>.md`: one document per annotation, front
//!   matter plus the markdown body
//! - `_data/tags.yml` and `tags/<slug>.md`: tag data and stub pages
//! - `_config.yml`: updated in place when present
//!
//! The page and annotation directories are regenerated from scratch
//! on every import; everything else is edited or added to.
//!
//! # Example
//!
//! ```no_run
//! use tei2jekyll::site::{ImportOptions, import};
//!
//! let options = ImportOptions { quiet: true };
//! import("volume.xml", "my-site", &options)?;
//! # Ok::<(), tei2jekyll::Error>(())
//! ```

pub mod config;
pub mod front_matter;

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::tei::{Note, Page, TeiDocument, TeiFacsimile};

pub use config::update_site_config;
pub use front_matter::{AnnotationFrontMatter, PageFrontMatter, TagData, TagStub};

/// Volume page collection directory.
pub const VOLUME_PAGE_DIR: &str = "_volume_pages";
/// Annotation collection directory.
pub const ANNOTATION_DIR: &str = "_annotations";
/// Jekyll data directory.
pub const DATA_DIR: &str = "_data";
/// Tag data file inside [`DATA_DIR`].
pub const TAG_DATA_FILE: &str = "tags.yml";
/// Tag stub page directory.
pub const TAG_DIR: &str = "tags";
/// Site configuration file.
pub const CONFIG_FILE: &str = "_config.yml";

/// Options for an import run.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Suppress progress output.
    pub quiet: bool,
}

/// Reads a TEI file and writes site content into `site_dir`.
pub fn import(
    tei_path: impl AsRef<Path>,
    site_dir: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<()> {
    let doc = TeiDocument::open(tei_path)?;
    import_document(&doc, site_dir.as_ref(), options)
}

/// Writes site content for an already-parsed document.
pub fn import_document(doc: &TeiDocument, site_dir: &Path, options: &ImportOptions) -> Result<()> {
    let facsimile = doc.facsimile();

    if !options.quiet {
        println!("** Writing volume pages");
    }
    let page_dir = site_dir.join(VOLUME_PAGE_DIR);
    reset_dir(&page_dir)?;
    for page in facsimile.pages()? {
        write_page(&page, &page_dir, options)?;
    }

    if !options.quiet {
        println!("** Writing annotations");
    }
    let annotation_dir = site_dir.join(ANNOTATION_DIR);
    reset_dir(&annotation_dir)?;
    for note in facsimile.annotations()? {
        write_annotation(&note, &annotation_dir, options)?;
    }

    write_tags(&facsimile, site_dir, options)?;

    let config_path = site_dir.join(CONFIG_FILE);
    if config_path.exists() {
        if !options.quiet {
            println!("** Updating site config");
        }
        config::update_site_config(&facsimile, &config_path)?;
    }

    Ok(())
}

/// Clears and recreates a generated collection directory.
fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

fn write_page(page: &Page<'_>, dir: &Path, options: &ImportOptions) -> Result<()> {
    if !options.quiet {
        println!("Page {}", page.label()?.unwrap_or_default());
    }
    let path = dir.join(format!("{:04}.html", page.number()?));
    let front = PageFrontMatter::from_page(page)?;
    let body = page.html()?;
    fs::write(&path, front_matter::document(&front, &body)?)?;
    Ok(())
}

fn write_annotation(note: &Note<'_>, dir: &Path, options: &ImportOptions) -> Result<()> {
    if !options.quiet {
        println!("Annotation {}", note.annotation_id()?);
    }
    let path = dir.join(format!("{}.md", note.id()?));
    let front = AnnotationFrontMatter::from_note(note)?;
    let body = note.markdown()?.unwrap_or_default();
    fs::write(&path, front_matter::document(&front, &body)?)?;
    Ok(())
}

/// Writes the tag data file and one stub page per tag. Tag slugs come
/// from interp ids, which are already filename-safe.
fn write_tags(
    facsimile: &TeiFacsimile<'_>,
    site_dir: &Path,
    options: &ImportOptions,
) -> Result<()> {
    if !options.quiet {
        println!("Generating tags");
    }
    let tags = facsimile.tags()?;

    let data_dir = site_dir.join(DATA_DIR);
    fs::create_dir_all(&data_dir)?;
    let mut tag_data = std::collections::BTreeMap::new();
    for (slug, interp) in &tags {
        tag_data.insert(slug.clone(), TagData { name: interp.value() });
    }
    fs::write(
        data_dir.join(TAG_DATA_FILE),
        serde_yaml::to_string(&tag_data)?,
    )?;

    let tag_dir = site_dir.join(TAG_DIR);
    fs::create_dir_all(&tag_dir)?;
    for slug in tags.keys() {
        let stub = TagStub::new(slug);
        fs::write(
            tag_dir.join(format!("{slug}.md")),
            front_matter::document(&stub, "")?,
        )?;
    }
    Ok(())
}
