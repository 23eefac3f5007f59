//! Document-level tests against the Walden fixture: header metadata,
//! page structure, zones and annotations as parsed from a realistic
//! Readux TEI export.

use tei2jekyll::tei::{TargetKind, TeiDocument, ZoneKind};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn load_walden() -> TeiDocument {
    TeiDocument::open(fixture_path("walden.xml")).expect("Failed to read TEI fixture")
}

// ============================================================================
// Header metadata
// ============================================================================

#[test]
fn test_titles() {
    let doc = load_walden();
    let facsimile = doc.facsimile();

    assert_eq!(facsimile.title().unwrap().as_deref(), Some("Walden"));
    assert_eq!(
        facsimile.subtitle().unwrap().as_deref(),
        Some("or, Life in the Woods")
    );

    let statement = facsimile.title_statement().unwrap();
    assert_eq!(statement.title().unwrap().as_deref(), Some("Walden"));
}

#[test]
fn test_source_bibliography() {
    let doc = load_walden();
    let bibls = doc.facsimile().source_bibl().unwrap();

    assert_eq!(bibls.len(), 2);

    let digital = &bibls["digital"];
    assert_eq!(digital.record_type().unwrap().as_deref(), Some("digital"));
    assert_eq!(
        digital.title().unwrap().as_deref(),
        Some("Walden, digital edition")
    );
    let references = digital.references().unwrap();
    assert_eq!(
        references["digital-edition"].target().unwrap().as_deref(),
        Some("http://readux.example.org/books/walden/")
    );
    assert_eq!(
        references["pdf"].target().unwrap().as_deref(),
        Some("http://readux.example.org/books/walden/pdf/")
    );

    let original = &bibls["original"];
    assert_eq!(
        original.title().unwrap().as_deref(),
        Some("Walden; or, Life in the Woods")
    );
    assert_eq!(
        original.author().unwrap().as_deref(),
        Some("Thoreau, Henry David, 1817-1862")
    );
    assert_eq!(original.date().unwrap().as_deref(), Some("1854"));
}

// ============================================================================
// Pages and zones
// ============================================================================

#[test]
fn test_pages() {
    let doc = load_walden();
    let pages = doc.facsimile().pages().unwrap();

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].id().unwrap().as_deref(), Some("walden.p.001"));
    assert_eq!(pages[0].number().unwrap(), 1);
    assert_eq!(pages[2].id().unwrap().as_deref(), Some("walden.p.003"));
    assert_eq!(pages[2].number().unwrap(), 3);
}

#[test]
fn test_page_images() {
    let doc = load_walden();
    let pages = doc.facsimile().pages().unwrap();

    let images = pages[0].images().unwrap();
    assert_eq!(images.len(), 4);
    assert_eq!(images[0].rend().unwrap().as_deref(), Some("small-thumbnail"));

    let by_rend = pages[0].images_by_rendition().unwrap();
    assert_eq!(
        by_rend["page"].url().unwrap().as_deref(),
        Some("http://images.example.org/walden/1/full/")
    );
}

#[test]
fn test_annotation_counts() {
    let doc = load_walden();
    let pages = doc.facsimile().pages().unwrap();

    // cover page has none; page two has an image highlight; page
    // three has a text anchor
    assert_eq!(pages[0].annotation_count().unwrap(), 0);
    assert_eq!(pages[1].annotation_count().unwrap(), 1);
    assert_eq!(pages[2].annotation_count().unwrap(), 1);
}

#[test]
fn test_lines_and_words() {
    let doc = load_walden();
    let pages = doc.facsimile().pages().unwrap();

    let lines = pages[1].lines().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].kind().unwrap(), ZoneKind::TextLine);

    let words = lines[0].word_zones().unwrap();
    assert_eq!(words.len(), 5);
    assert_eq!(words[0].text().unwrap().as_deref(), Some("When"));
    assert_eq!(words[4].text().unwrap().as_deref(), Some("following"));
    // mets-alto lines have no text of their own
    assert_eq!(lines[0].text().unwrap(), None);

    // abbyy page: lines carry text directly
    let abbyy_lines = pages[2].lines().unwrap();
    assert_eq!(abbyy_lines.len(), 3);
    assert!(abbyy_lines[0].word_zones().unwrap().is_empty());
    assert_eq!(
        abbyy_lines[0].text().unwrap().as_deref(),
        Some("I went to the woods because I wished to live")
    );
}

#[test]
fn test_word_geometry_relations() {
    use tei2jekyll::Zone;
    use tei2jekyll::bind::ElementView;

    let doc = load_walden();
    let tree = doc.tree();
    let word = Zone::bind(tree, tree.get_by_id("walden.str.2.1.3").unwrap());

    let parent = word.parent_zone().unwrap().unwrap();
    assert_eq!(parent.id().unwrap().as_deref(), Some("walden.ln.2.1"));
    assert_eq!(parent.width().unwrap(), 800.0);

    let page = word.page().unwrap();
    assert_eq!(page.id().unwrap().as_deref(), Some("walden.p.002"));
    assert_eq!(page.long_edge().unwrap(), 1600.0);
}

#[test]
fn test_image_highlight() {
    let doc = load_walden();
    let pages = doc.facsimile().pages().unwrap();

    let highlights = pages[1].image_highlights().unwrap();
    assert_eq!(highlights.len(), 1);
    assert_eq!(highlights[0].kind().unwrap(), ZoneKind::ImageHighlight);
    assert_eq!(
        highlights[0].highlight_id().unwrap().as_deref(),
        Some("0c8a9d5e-4b2f-4d5a-9f6f-2a8f6f0d3b71")
    );
    assert_eq!(
        highlights[0].href().unwrap().as_deref(),
        Some("http://readux.example.org/annotations/0c8a9d5e")
    );
}

// ============================================================================
// Annotations and tags
// ============================================================================

#[test]
fn test_single_target_annotation() {
    let doc = load_walden();
    let notes = doc.facsimile().annotations().unwrap();
    assert_eq!(notes.len(), 2);

    let note = &notes[0];
    assert_eq!(
        note.id().unwrap(),
        "annotation-0c8a9d5e-4b2f-4d5a-9f6f-2a8f6f0d3b71"
    );
    assert_eq!(
        note.annotation_id().unwrap(),
        "0c8a9d5e-4b2f-4d5a-9f6f-2a8f6f0d3b71"
    );
    assert_eq!(note.author().unwrap().as_deref(), Some("sima"));
    assert_eq!(note.tags().unwrap(), vec!["nature", "pond"]);

    let target = note.parsed_target().unwrap();
    assert_eq!(target.kind, TargetKind::Single);
    assert_eq!(target.start, "highlight-0c8a9d5e-4b2f-4d5a-9f6f-2a8f6f0d3b71");

    let page = note.annotated_page().unwrap();
    assert_eq!(page.id().unwrap().as_deref(), Some("walden.p.002"));
}

#[test]
fn test_range_target_annotation() {
    let doc = load_walden();
    let notes = doc.facsimile().annotations().unwrap();

    let note = &notes[1];
    let target = note.parsed_target().unwrap();
    assert_eq!(target.kind, TargetKind::Range);
    assert_eq!(
        target.start,
        "highlight-start-6e214d7b-0f3a-4c2e-8d19-5b7c9e2f4a88"
    );
    assert_eq!(target.end.as_deref(), Some("walden.str.3.4.2"));

    // the range starts at an anchor inside a line on page three
    let page = note.annotated_page().unwrap();
    assert_eq!(page.id().unwrap().as_deref(), Some("walden.p.003"));
}

#[test]
fn test_markdown_content_preserved() {
    let doc = load_walden();
    let notes = doc.facsimile().annotations().unwrap();

    let markdown = notes[0].markdown().unwrap().unwrap();
    assert_eq!(
        markdown,
        "The **pond** described here is Walden Pond, about a mile\n\
         and a half south of Concord village."
    );
}

#[test]
fn test_tags() {
    let doc = load_walden();
    let tags = doc.facsimile().tags().unwrap();

    assert_eq!(tags.len(), 2);
    assert_eq!(tags["nature"].value(), "nature");
    assert_eq!(tags["pond"].value(), "walden pond");
}
