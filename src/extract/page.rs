//! Markup extractor: turns one article page into a structured record
//!
//! Section boundaries follow the document structure of the source site:
//! a `<p>` or `<li>` belongs to a section when the nearest preceding `<h2>`
//! (or `<h3>` for subsections) in document order is that section's heading.

use crate::extract::record::{ArticleRecord, AttrValue};
use crate::extract::text::{clean_reference_markers, collapse_whitespace, is_valid_link_text};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use thiserror::Error;

/// Extraction failure: the page produced no usable record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Plot section not found or empty.")]
    PlotMissing,
}

/// Ordered label patterns for the information table, checked top to bottom
/// against the lowercased row label. The first matching pattern wins.
const INFOBOX_FIELDS: &[(&str, &str)] = &[
    ("directed by", "director"),
    ("director", "director"),
    ("produced by", "producer"),
    ("producer", "producer"),
    ("written by", "writer"),
    ("screenplay", "writer"),
    ("music by", "music"),
    ("music", "music"),
    ("cinematography", "cinematography"),
    ("edited by", "editing"),
    ("editing", "editing"),
    ("production company", "production_company"),
    ("production", "production_company"),
    ("distributed by", "distributor"),
    ("release date", "release_date"),
    ("running time", "running_time"),
    ("duration", "running_time"),
    ("budget", "budget"),
    ("box office", "box_office"),
    ("gross", "box_office"),
    ("country", "country"),
    ("language", "language"),
    ("genre", "genre"),
];

/// How a section's collected items become an attribute value
#[derive(Clone, Copy, PartialEq)]
enum SectionKind {
    /// Paragraphs joined with line breaks into one text field
    Narrative,
    /// One entry per list item
    List,
    /// One entry per list item, filtered through the navigation denylist
    FilteredList,
}

/// Top-level (`<h2>`) sections extracted as attribute fields
const SECTION_FIELDS: &[(&str, &str, SectionKind)] = &[
    ("Cast", "cast_details", SectionKind::List),
    ("Filming", "filming", SectionKind::Narrative),
    ("Music", "music_details", SectionKind::Narrative),
    ("Production", "production_details", SectionKind::Narrative),
    ("Marketing", "marketing_details", SectionKind::Narrative),
    ("Release", "release_details", SectionKind::Narrative),
    ("Reception", "reception_details", SectionKind::Narrative),
    ("External_links", "external_links", SectionKind::FilteredList),
    ("References", "references", SectionKind::List),
];

/// Subsection (`<h3>`) fields, all narrative
const SUBSECTION_FIELDS: &[(&str, &str)] = &[
    ("Distribution", "distributor_details"),
    ("Box_office", "box_office_details"),
    ("Critical_response", "critical_response_details"),
    ("Home_media", "home_media_details"),
    ("Theatrical", "theatrical_details"),
    ("Development", "development_details"),
    ("Casting", "casting_details"),
    ("Filming", "filming_details"),
];

/// Extracts a full article record from raw page markup
///
/// The plot section is a hard requirement: without non-empty plot text the
/// extraction fails, regardless of what else the page contains.
pub fn extract_article(
    html: &str,
    fallback_title: &str,
    source_url: &str,
) -> Result<ArticleRecord, ExtractError> {
    let doc = Html::parse_document(html);

    let title = extract_title(&doc).unwrap_or_else(|| fallback_title.to_string());
    let summary = extract_plot(&doc).ok_or(ExtractError::PlotMissing)?;

    let mut attributes = BTreeMap::new();
    extract_infobox(&doc, &mut attributes);
    extract_sections(&doc, &mut attributes);
    extract_subsections(&doc, &mut attributes);

    Ok(ArticleRecord {
        title,
        source_url: source_url.to_string(),
        summary,
        attributes,
    })
}

/// All elements of the document in document (pre-)order
fn elements(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.tree.root().descendants().filter_map(ElementRef::wrap)
}

/// Joined text content of an element, segments separated by single spaces
fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// The page's primary heading text, used as the record title
fn extract_title(doc: &Html) -> Option<String> {
    let h1 = elements(doc).find(|el| el.value().name() == "h1")?;
    let text = element_text(h1);
    (!text.is_empty()).then_some(text)
}

/// Locates the Plot heading: exact id first, then case-insensitive id, then
/// any `<h2>` whose id or text contains "plot"
fn find_plot_heading(doc: &Html) -> Option<ElementRef<'_>> {
    let headings: Vec<ElementRef<'_>> = elements(doc)
        .filter(|el| el.value().name() == "h2")
        .collect();

    if let Some(el) = headings
        .iter()
        .find(|el| matches!(el.value().attr("id"), Some("Plot") | Some("plot")))
    {
        return Some(*el);
    }

    if let Some(el) = headings.iter().find(|el| {
        el.value()
            .attr("id")
            .is_some_and(|id| id.eq_ignore_ascii_case("plot"))
    }) {
        return Some(*el);
    }

    headings.into_iter().find(|el| {
        element_text(*el).to_lowercase().contains("plot")
            || el
                .value()
                .attr("id")
                .is_some_and(|id| id.to_lowercase().contains("plot"))
    })
}

/// Plot text: cleaned paragraphs of the Plot section joined with line breaks
fn extract_plot(doc: &Html) -> Option<String> {
    let heading = find_plot_heading(doc)?;
    let paragraphs = section_items(doc, heading, "p");
    let text = paragraphs.join("\n");
    (!text.trim().is_empty()).then_some(text)
}

/// Collects cleaned text of every `tag` element whose nearest preceding
/// `<h2>` is `heading`
fn section_items(doc: &Html, heading: ElementRef<'_>, tag: &str) -> Vec<String> {
    let target = heading.id();
    let mut current = None;
    let mut items = Vec::new();

    for el in elements(doc) {
        let name = el.value().name();
        if name == "h2" {
            current = Some(el.id());
        } else if name == tag && current == Some(target) {
            let text = clean_reference_markers(&element_text(el));
            if !text.is_empty() {
                items.push(text);
            }
        }
    }

    items
}

/// Collects cleaned text of every `tag` element inside an `<h3>` subsection,
/// terminated by the next heading of the same or higher level
fn subsection_items(doc: &Html, heading: ElementRef<'_>, tag: &str) -> Vec<String> {
    let target = heading.id();
    let mut current = None;
    let mut items = Vec::new();

    for el in elements(doc) {
        match el.value().name() {
            // A following h2 closes the subsection
            "h2" => current = None,
            "h3" => current = Some(el.id()),
            name if name == tag && current == Some(target) => {
                let text = clean_reference_markers(&element_text(el));
                if !text.is_empty() {
                    items.push(text);
                }
            }
            _ => {}
        }
    }

    items
}

/// Extracts fixed attribute fields from the information table
fn extract_infobox(doc: &Html, attributes: &mut BTreeMap<String, AttrValue>) {
    let (Ok(table_sel), Ok(row_sel), Ok(th_sel), Ok(td_sel)) = (
        Selector::parse("table.infobox"),
        Selector::parse("tr"),
        Selector::parse("th"),
        Selector::parse("td"),
    ) else {
        return;
    };

    let Some(table) = doc.select(&table_sel).next() else {
        return;
    };

    for row in table.select(&row_sel) {
        let (Some(th), Some(td)) = (row.select(&th_sel).next(), row.select(&td_sel).next())
        else {
            continue;
        };

        let label = element_text(th).to_lowercase();
        let value = clean_reference_markers(&element_text(td));
        if value.is_empty() {
            continue;
        }

        for (pattern, field) in INFOBOX_FIELDS {
            if label.contains(pattern) {
                let value = if *field == "distributor" && value.to_lowercase().contains("see below")
                {
                    "Multiple distributors (see details)".to_string()
                } else {
                    value
                };
                attributes.insert((*field).to_string(), AttrValue::Text(value));
                break;
            }
        }
    }
}

/// Locates an `<h2>` section heading by case-insensitive id
fn find_section_heading<'a>(doc: &'a Html, key: &str) -> Option<ElementRef<'a>> {
    elements(doc).find(|el| {
        el.value().name() == "h2"
            && el
                .value()
                .attr("id")
                .is_some_and(|id| id.eq_ignore_ascii_case(key))
    })
}

/// Locates an `<h3>` subsection heading by id or heading text
fn find_subsection_heading<'a>(doc: &'a Html, key: &str) -> Option<ElementRef<'a>> {
    let phrase = key.to_lowercase().replace('_', " ");
    elements(doc).find(|el| {
        el.value().name() == "h3"
            && (el
                .value()
                .attr("id")
                .is_some_and(|id| id.eq_ignore_ascii_case(key))
                || element_text(*el).to_lowercase().contains(&phrase))
    })
}

/// Extracts named top-level sections into attribute fields
fn extract_sections(doc: &Html, attributes: &mut BTreeMap<String, AttrValue>) {
    for (key, field, kind) in SECTION_FIELDS {
        let Some(heading) = find_section_heading(doc, key) else {
            continue;
        };

        let tag = match kind {
            SectionKind::Narrative => "p",
            SectionKind::List | SectionKind::FilteredList => "li",
        };

        let mut items = section_items(doc, heading, tag);
        if *kind == SectionKind::FilteredList {
            items.retain(|item| is_valid_link_text(item));
        }
        if items.is_empty() {
            continue;
        }

        let value = match kind {
            SectionKind::Narrative => AttrValue::Text(items.join("\n")),
            SectionKind::List | SectionKind::FilteredList => AttrValue::List(items),
        };
        attributes.insert((*field).to_string(), value);
    }
}

/// Extracts named subsections into narrative attribute fields
fn extract_subsections(doc: &Html, attributes: &mut BTreeMap<String, AttrValue>) {
    for (key, field) in SUBSECTION_FIELDS {
        let Some(heading) = find_subsection_heading(doc, key) else {
            continue;
        };

        let items = subsection_items(doc, heading, "p");
        let text = items.join("\n");
        if text.trim().is_empty() {
            continue;
        }

        attributes.insert((*field).to_string(), AttrValue::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Result<ArticleRecord, ExtractError> {
        extract_article(html, "Fallback_Title", "https://example.com/wiki/Test")
    }

    #[test]
    fn test_plot_by_exact_id() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <h2 id="Plot">Plot</h2>
            <p>He runs.</p>
            <p>He wins.[3]</p>
            <h2 id="Cast">Cast</h2>
            <p>Not plot text.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(record.title, "OG");
        assert_eq!(record.summary, "He runs.\nHe wins.");
    }

    #[test]
    fn test_plot_by_heading_text_fallback() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <h2 id="story-so-far">Plot summary</h2>
            <p>A story unfolds.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(record.summary, "A story unfolds.");
    }

    #[test]
    fn test_missing_plot_fails() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <h2 id="Cast">Cast</h2>
            <p>An actor.</p>
        </body></html>"#;

        assert_eq!(extract(html), Err(ExtractError::PlotMissing));
    }

    #[test]
    fn test_empty_plot_fails() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <h2 id="Plot">Plot</h2>
            <p>   </p>
            <h2 id="Cast">Cast</h2>
        </body></html>"#;

        assert_eq!(extract(html), Err(ExtractError::PlotMissing));
    }

    #[test]
    fn test_title_falls_back_to_identifier() {
        let html = r#"<html><body>
            <h2 id="Plot">Plot</h2>
            <p>Something happens.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(record.title, "Fallback_Title");
    }

    #[test]
    fn test_paragraphs_before_plot_ignored() {
        let html = r#"<html><body>
            <p>Lead paragraph.</p>
            <h2 id="Plot">Plot</h2>
            <p>Actual plot.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(record.summary, "Actual plot.");
    }

    #[test]
    fn test_infobox_first_pattern_wins() {
        // "directed by" must map before the bare "director" pattern
        let html = r#"<html><body>
            <h1>OG</h1>
            <table class="infobox">
                <tr><th>Directed by</th><td>Jane Doe</td></tr>
                <tr><th>Screenplay by</th><td>John Roe</td></tr>
                <tr><th>Running time</th><td>120 minutes[2]</td></tr>
            </table>
            <h2 id="Plot">Plot</h2>
            <p>Plot text.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(
            record.attributes["director"],
            AttrValue::Text("Jane Doe".to_string())
        );
        assert_eq!(
            record.attributes["writer"],
            AttrValue::Text("John Roe".to_string())
        );
        assert_eq!(
            record.attributes["running_time"],
            AttrValue::Text("120 minutes".to_string())
        );
    }

    #[test]
    fn test_distributor_see_below_placeholder() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <table class="infobox">
                <tr><th>Distributed by</th><td>See below for details</td></tr>
            </table>
            <h2 id="Plot">Plot</h2>
            <p>Plot text.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(
            record.attributes["distributor"],
            AttrValue::Text("Multiple distributors (see details)".to_string())
        );
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <h2 id="Plot">Plot</h2>
            <p>Plot text.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert!(!record.attributes.contains_key("director"));
        assert!(!record.attributes.contains_key("cast_details"));
    }

    #[test]
    fn test_cast_preserved_as_list() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <h2 id="Plot">Plot</h2>
            <p>Plot text.</p>
            <h2 id="Cast">Cast</h2>
            <ul>
                <li>Actor One as Hero</li>
                <li>Actor Two as Rival[4]</li>
            </ul>
            <h2 id="Production">Production</h2>
            <p>Shot on location.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(
            record.attributes["cast_details"],
            AttrValue::List(vec![
                "Actor One as Hero".to_string(),
                "Actor Two as Rival".to_string(),
            ])
        );
        assert_eq!(
            record.attributes["production_details"],
            AttrValue::Text("Shot on location.".to_string())
        );
    }

    #[test]
    fn test_section_bounded_by_next_h2() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <h2 id="Plot">Plot</h2>
            <p>Plot text.</p>
            <h2 id="Production">Production</h2>
            <p>First production note.</p>
            <h2 id="Release">Release</h2>
            <p>Released in June.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(
            record.attributes["production_details"],
            AttrValue::Text("First production note.".to_string())
        );
        assert_eq!(
            record.attributes["release_details"],
            AttrValue::Text("Released in June.".to_string())
        );
    }

    #[test]
    fn test_subsection_bounded_by_next_heading() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <h2 id="Plot">Plot</h2>
            <p>Plot text.</p>
            <h2 id="Production">Production</h2>
            <h3 id="Casting">Casting</h3>
            <p>Cast over two months.</p>
            <h3 id="Filming">Filming</h3>
            <p>Filmed in winter.</p>
            <h2 id="Release">Release</h2>
            <p>Not a subsection paragraph.</p>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(
            record.attributes["casting_details"],
            AttrValue::Text("Cast over two months.".to_string())
        );
        assert_eq!(
            record.attributes["filming_details"],
            AttrValue::Text("Filmed in winter.".to_string())
        );
    }

    #[test]
    fn test_external_links_nav_filtered() {
        let html = r#"<html><body>
            <h1>OG</h1>
            <h2 id="Plot">Plot</h2>
            <p>Plot text.</p>
            <h2 id="External_links">External links</h2>
            <ul>
                <li>OG at the Movie Database</li>
                <li>edit</li>
                <li>v</li>
            </ul>
        </body></html>"#;

        let record = extract(html).unwrap();
        assert_eq!(
            record.attributes["external_links"],
            AttrValue::List(vec!["OG at the Movie Database".to_string()])
        );
    }
}
