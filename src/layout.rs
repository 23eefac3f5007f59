//! Layout math: converts zone pixel geometry into page-relative CSS
//! properties.
//!
//! Source coordinates are absolute pixels in the scanned image. Pages
//! are displayed at arbitrary sizes, so every emitted position is a
//! percentage of its reference box (the page for lines and highlights,
//! the parent line for words) and font sizes are computed against a
//! page normalized to [`REFERENCE_PAGE_SIZE`] along its long edge.

use crate::error::{Error, Result};
use crate::tei::{Zone, ZoneKind};

/// Long-edge size, in pixels, that every page is normalized to before
/// font sizing.
pub const REFERENCE_PAGE_SIZE: f64 = 1000.0;

/// Computed presentation for one zone: CSS properties plus `data-`
/// attributes, in emission order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ZoneStyle {
    pub styles: Vec<(&'static str, String)>,
    pub data: Vec<(&'static str, String)>,
}

impl ZoneStyle {
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.data.is_empty()
    }

    /// Renders the style map as element attributes, e.g.
    /// `style="left:10.00%;top:2.50%" data-vhfontsize='1.50'`.
    pub fn attr_string(&self) -> String {
        let mut out = String::new();
        if !self.styles.is_empty() {
            out.push_str("style=\"");
            for (i, (name, value)) in self.styles.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('"');
        }
        for (name, value) in &self.data {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str("data-");
            out.push_str(name);
            out.push_str("='");
            out.push_str(value);
            out.push('\'');
        }
        out
    }
}

/// Computes the style properties for a zone.
///
/// Lines are positioned as percentages of the page box and get a
/// font size from the average word height (falling back to the line
/// height) scaled to the normalized page. Words are positioned inside
/// their parent line. Image highlights get the page-relative box only.
/// Kinds with no layout rules produce an empty result.
pub fn zone_style(zone: &Zone<'_>) -> Result<ZoneStyle> {
    let mut style = ZoneStyle::default();

    match zone.kind()? {
        ZoneKind::TextLine => {
            let page = zone.page()?;
            let scale = page_scale(&page, zone)?;
            let page_width = page.width()?;
            let page_height = page.height()?;

            let left = percent(zone.ulx()?, page_width, zone, "page width")?;
            let top = percent(zone.uly()?, page_height, zone, "page height")?;
            let width = percent(zone.width()?, page_width, zone, "page width")?;
            let height = percent(zone.height()?, page_height, zone, "page height")?;
            style.styles.push(("left", format!("{left:.2}%")));
            style.styles.push(("top", format!("{top:.2}%")));
            style.styles.push(("width", format!("{width:.2}%")));
            style.styles.push(("height", format!("{height:.2}%")));
            style.styles.push(("text-align", "left".to_string()));

            // mets-alto lines size their text from the word boxes;
            // abbyy lines have no words and use the line box itself
            let font_basis = match zone.average_word_height()? {
                Some(average) => average,
                None => zone.height()?,
            };
            style
                .styles
                .push(("font-size", format!("{:.2}px", font_basis * scale)));

            // viewport-relative font hint for the reading UI
            style.data.push(("vhfontsize", format!("{height:.2}")));
        }
        ZoneKind::Word => {
            let parent = zone.parent_zone()?.ok_or_else(|| Error::OrphanZone {
                zone: zone.describe(),
                expected: "text line",
            })?;
            let parent_width = parent.width()?;
            let parent_height = parent.height()?;

            let width = percent(zone.width()?, parent_width, zone, "line width")?;
            let height = percent(zone.height()?, parent_height, zone, "line height")?;
            let left = percent(zone.ulx()? - parent.ulx()?, parent_width, zone, "line width")?;
            style.styles.push(("width", format!("{width:.2}%")));
            style.styles.push(("height", format!("{height:.2}%")));
            style.styles.push(("left", format!("{left:.2}%")));
        }
        ZoneKind::ImageHighlight => {
            let page = zone.page()?;
            let page_width = page.width()?;
            let page_height = page.height()?;

            let left = percent(zone.ulx()?, page_width, zone, "page width")?;
            let top = percent(zone.uly()?, page_height, zone, "page height")?;
            let width = percent(zone.width()?, page_width, zone, "page width")?;
            let height = percent(zone.height()?, page_height, zone, "page height")?;
            style.styles.push(("left", format!("{left:.2}%")));
            style.styles.push(("top", format!("{top:.2}%")));
            style.styles.push(("width", format!("{width:.2}%")));
            style.styles.push(("height", format!("{height:.2}%")));
        }
        ZoneKind::Page | ZoneKind::Other => {}
    }

    Ok(style)
}

/// Scale factor from source pixels to the normalized page.
fn page_scale(page: &Zone<'_>, zone: &Zone<'_>) -> Result<f64> {
    let long_edge = page.long_edge()?;
    if long_edge == 0.0 {
        return Err(Error::DegenerateGeometry {
            zone: zone.describe(),
            reason: "page long edge is zero".to_string(),
        });
    }
    Ok(REFERENCE_PAGE_SIZE / long_edge)
}

/// `value` as a percentage of `reference`. A zero reference box has no
/// defined percentages; that is reported rather than emitted as a
/// non-finite number.
fn percent(value: f64, reference: f64, zone: &Zone<'_>, axis: &str) -> Result<f64> {
    if reference == 0.0 {
        return Err(Error::DegenerateGeometry {
            zone: zone.describe(),
            reason: format!("{axis} is zero"),
        });
    }
    Ok(value / reference * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::ElementView;
    use crate::xml::{XmlTree, parse};

    const DOC: &str = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <facsimile>
    <surface type="page" xml:id="page1" ulx="0" uly="0" lrx="1000" lry="2000">
      <zone type="textLine" xml:id="line1" ulx="100" uly="50" lrx="300" lry="80">
        <zone type="string" xml:id="word1" ulx="100" uly="50" lrx="180" lry="90"><w>go</w></zone>
        <zone type="string" xml:id="word2" ulx="120" uly="50" lrx="300" lry="90"><w>far</w></zone>
      </zone>
      <zone type="line" xml:id="line2" ulx="0" uly="100" lrx="1000" lry="140"><line>walden</line></zone>
      <zone type="image-annotation-highlight" xml:id="highlight-h1"
            ulx="250" uly="500" lrx="750" lry="1500"/>
      <zone type="graph" xml:id="mystery" ulx="0" uly="0" lrx="1" lry="1"/>
    </surface>
    <surface type="page" xml:id="flat" ulx="0" uly="0" lrx="0" lry="0">
      <zone type="textLine" xml:id="flatline" ulx="0" uly="0" lrx="0" lry="0"/>
    </surface>
  </facsimile>
</TEI>"#;

    fn zone<'a>(tree: &'a XmlTree, id: &str) -> Zone<'a> {
        Zone::bind(tree, tree.get_by_id(id).unwrap())
    }

    #[test]
    fn test_line_style() {
        let tree = parse(DOC).unwrap();
        let style = zone_style(&zone(&tree, "line1")).unwrap();

        assert_eq!(
            style.styles,
            vec![
                ("left", "10.00%".to_string()),
                ("top", "2.50%".to_string()),
                ("width", "20.00%".to_string()),
                ("height", "1.50%".to_string()),
                ("text-align", "left".to_string()),
                // average word height 40, scale 1000/2000
                ("font-size", "20.00px".to_string()),
            ]
        );
        assert_eq!(style.data, vec![("vhfontsize", "1.50".to_string())]);
    }

    #[test]
    fn test_line_without_words_uses_own_height() {
        let tree = parse(DOC).unwrap();
        let style = zone_style(&zone(&tree, "line2")).unwrap();

        let font_size = style
            .styles
            .iter()
            .find(|(name, _)| *name == "font-size")
            .unwrap();
        assert_eq!(font_size.1, "20.00px");
    }

    #[test]
    fn test_word_style_is_line_relative() {
        let tree = parse(DOC).unwrap();
        let style = zone_style(&zone(&tree, "word2")).unwrap();

        assert_eq!(
            style.styles,
            vec![
                ("width", "90.00%".to_string()),
                ("height", "133.33%".to_string()),
                ("left", "10.00%".to_string()),
            ]
        );
        assert!(style.data.is_empty());
    }

    #[test]
    fn test_image_highlight_style() {
        let tree = parse(DOC).unwrap();
        let style = zone_style(&zone(&tree, "highlight-h1")).unwrap();

        assert_eq!(
            style.styles,
            vec![
                ("left", "25.00%".to_string()),
                ("top", "25.00%".to_string()),
                ("width", "50.00%".to_string()),
                ("height", "50.00%".to_string()),
            ]
        );
    }

    #[test]
    fn test_unstyled_kinds_yield_empty_result() {
        let tree = parse(DOC).unwrap();
        assert!(zone_style(&zone(&tree, "mystery")).unwrap().is_empty());
        assert!(zone_style(&zone(&tree, "page1")).unwrap().is_empty());
    }

    #[test]
    fn test_zero_long_edge_is_degenerate() {
        let tree = parse(DOC).unwrap();
        match zone_style(&zone(&tree, "flatline")).unwrap_err() {
            Error::DegenerateGeometry { zone, reason } => {
                assert_eq!(zone, "flatline");
                assert!(reason.contains("long edge"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_orphan_word() {
        let tree = parse(
            r#"<surface xmlns="http://www.tei-c.org/ns/1.0" type="page"
                 ulx="0" uly="0" lrx="100" lry="100">
                 <zone type="string" xml:id="lonely" ulx="0" uly="0" lrx="5" lry="5"/>
               </surface>"#,
        )
        .unwrap();
        let word = Zone::bind(&tree, tree.get_by_id("lonely").unwrap());

        assert!(matches!(
            zone_style(&word).unwrap_err(),
            Error::OrphanZone { .. }
        ));
    }

    #[test]
    fn test_attr_string_format() {
        let tree = parse(DOC).unwrap();
        let style = zone_style(&zone(&tree, "line1")).unwrap();

        assert_eq!(
            style.attr_string(),
            "style=\"left:10.00%;top:2.50%;width:20.00%;height:1.50%;\
             text-align:left;font-size:20.00px\" data-vhfontsize='1.50'"
        );
    }

    #[test]
    fn test_attr_string_empty() {
        assert_eq!(ZoneStyle::default().attr_string(), "");
    }

    use proptest::prelude::*;

    fn line_style(ulx: i32, uly: i32, w: i32, h: i32, pw: i32, ph: i32) -> ZoneStyle {
        let doc = format!(
            r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><facsimile>
              <surface type="page" ulx="0" uly="0" lrx="{pw}" lry="{ph}">
                <zone type="textLine" xml:id="z" ulx="{ulx}" uly="{uly}" lrx="{lrx}" lry="{lry}"/>
              </surface></facsimile></TEI>"#,
            lrx = ulx + w,
            lry = uly + h,
        );
        let tree = parse(&doc).unwrap();
        zone_style(&Zone::bind(&tree, tree.get_by_id("z").unwrap())).unwrap()
    }

    fn word_style(dx: i32, dy: i32) -> ZoneStyle {
        let doc = format!(
            r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><facsimile>
              <surface type="page" ulx="0" uly="0" lrx="9000" lry="9000">
                <zone type="textLine" ulx="{lx}" uly="{ly}" lrx="{lrx}" lry="{lry}">
                  <zone type="string" xml:id="w" ulx="{wx}" uly="{wy}" lrx="{wlx}" lry="{wly}"/>
                </zone>
              </surface></facsimile></TEI>"#,
            lx = 100 + dx,
            ly = 100 + dy,
            lrx = 400 + dx,
            lry = 160 + dy,
            wx = 150 + dx,
            wy = 100 + dy,
            wlx = 250 + dx,
            wly = 160 + dy,
        );
        let tree = parse(&doc).unwrap();
        zone_style(&Zone::bind(&tree, tree.get_by_id("w").unwrap())).unwrap()
    }

    proptest! {
        #[test]
        fn prop_line_style_values_stay_finite(
            ulx in -2000i32..2000,
            uly in -2000i32..2000,
            w in 1i32..2000,
            h in 1i32..2000,
            pw in 1i32..4000,
            ph in 1i32..4000,
        ) {
            let style = line_style(ulx, uly, w, h, pw, ph);
            prop_assert_eq!(style.styles.len(), 6);
            for (name, value) in &style.styles {
                if *name == "text-align" {
                    continue;
                }
                let number: f64 = value
                    .trim_end_matches(['%', 'p', 'x'])
                    .parse()
                    .expect("style value is numeric");
                prop_assert!(number.is_finite());
            }
        }

        #[test]
        fn prop_word_style_is_translation_invariant(
            dx in -500i32..500,
            dy in -500i32..500,
        ) {
            // only offsets relative to the parent line matter
            prop_assert_eq!(word_style(dx, dy), word_style(0, 0));
        }
    }
}
