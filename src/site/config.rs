//! In-place update of a Jekyll `_config.yml`.
//!
//! Existing keys are overwritten where the document provides a value;
//! everything else in the file is preserved, including key order.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::tei::TeiFacsimile;

/// Placeholder description for the site author to edit.
pub const DESCRIPTION_PLACEHOLDER: &str = "An annotated digital edition created with \
    <a href=\"http://readux.library.emory.edu/\">Readux</a>";

/// Applies document metadata and collection configuration to the
/// config file at `path`.
pub fn update_site_config(facsimile: &TeiFacsimile<'_>, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let mut config: Mapping = if text.trim().is_empty() {
        Mapping::new()
    } else {
        serde_yaml::from_str(&text)?
    };

    apply(facsimile, &mut config)?;
    fs::write(path, serde_yaml::to_string(&config)?)?;
    Ok(())
}

/// Fills `config` from the document. Split out from the file I/O so
/// it can be exercised directly.
pub fn apply(facsimile: &TeiFacsimile<'_>, config: &mut Mapping) -> Result<()> {
    let title_statement = facsimile.title_statement()?;
    set(config, "title", opt(title_statement.title()?));
    set(config, "tagline", opt(title_statement.subtitle()?));
    set(config, "description", DESCRIPTION_PLACEHOLDER.into());

    let bibls = facsimile.source_bibl()?;
    let digital = bibls
        .get("digital")
        .ok_or_else(|| Error::MissingElement(r#"sourceDesc bibl type="digital""#.to_string()))?;
    let references = digital.references()?;
    let reference = |ref_type: &str| -> Result<Value> {
        let r = references.get(ref_type).ok_or_else(|| {
            Error::MissingElement(format!("ref type={ref_type:?} in digital bibl"))
        })?;
        Ok(opt(r.target()?))
    };
    set(config, "readux_url", reference("digital-edition")?);
    set(config, "readux_pdf_url", reference("pdf")?);

    // the first page is the cover; its full-size image becomes the
    // home page splash
    let pages = facsimile.pages()?;
    let cover = pages
        .first()
        .ok_or_else(|| Error::MissingElement("facsimile surface".to_string()))?;
    let page_image = cover
        .images_by_rendition()?
        .get("page")
        .map(|graphic| graphic.url())
        .transpose()?
        .flatten();
    set(config, "homepage_image", opt(page_image));

    let original = bibls
        .get("original")
        .ok_or_else(|| Error::MissingElement(r#"sourceDesc bibl type="original""#.to_string()))?;
    let mut publication_info = Mapping::new();
    set(&mut publication_info, "title", opt(original.title()?));
    set(&mut publication_info, "author", opt(original.author()?));
    set(&mut publication_info, "date", opt(original.date()?));
    set(config, "publication_info", Value::Mapping(publication_info));

    set(config, "collections", collections());
    set(config, "defaults", defaults());
    Ok(())
}

/// Collection setup for the generated content. Annotations are not
/// published as standalone pages; their content is pulled into the
/// volume page templates.
fn collections() -> Value {
    let mut annotations = Mapping::new();
    set(&mut annotations, "output", Value::Bool(false));

    let mut volume_pages = Mapping::new();
    set(&mut volume_pages, "output", Value::Bool(true));
    set(&mut volume_pages, "permalink", "/pages/:path/".into());

    let mut collections = Mapping::new();
    set(&mut collections, "annotations", Value::Mapping(annotations));
    set(&mut collections, "volume_pages", Value::Mapping(volume_pages));
    Value::Mapping(collections)
}

fn defaults() -> Value {
    let mut scope = Mapping::new();
    set(&mut scope, "path", "".into());
    set(&mut scope, "type", "volume_pages".into());

    let mut values = Mapping::new();
    set(&mut values, "layout", "volume_pages".into());

    let mut defaults = Mapping::new();
    set(&mut defaults, "scope", Value::Mapping(scope));
    set(&mut defaults, "values", Value::Mapping(values));
    Value::Mapping(defaults)
}

fn set(mapping: &mut Mapping, key: &str, value: Value) {
    mapping.insert(Value::String(key.to_string()), value);
}

fn opt(value: Option<String>) -> Value {
    match value {
        Some(s) => Value::String(s),
        None => Value::Null,
    }
}
