//! Link discoverer: finds candidate next-article identifiers in a page
//!
//! Candidates come only from the "External links" section, and only from
//! list-item hyperlinks pointing at internal article paths.

use crate::extract::record::ArticleId;
use crate::extract::text::is_valid_link_text;
use scraper::{ElementRef, Html, Selector};

/// Reserved namespace prefixes that never name crawlable articles
const RESERVED_PREFIXES: &[&str] = &["Category:", "Template:", "Wikipedia:", "Special:"];

/// Discovers candidate article identifiers from raw page markup
///
/// Returns identifiers deduplicated within the page, in first-occurrence
/// document order. An absent or empty External-links section yields an
/// empty list, never an error.
pub fn discover_links(html: &str) -> Vec<ArticleId> {
    let doc = Html::parse_document(html);

    let Some(heading) = find_external_links_heading(&doc) else {
        return Vec::new();
    };

    let Ok(anchor_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let target = heading.id();
    let mut current = None;
    let mut seen = Vec::new();
    let mut links = Vec::new();

    for el in doc.tree.root().descendants().filter_map(ElementRef::wrap) {
        let name = el.value().name();
        if name == "h2" {
            current = Some(el.id());
        } else if name == "li" && current == Some(target) {
            let Some(anchor) = el.select(&anchor_sel).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let text: String = anchor.text().collect::<Vec<_>>().join(" ");

            if let Some(id) = candidate_from_href(href, &text) {
                if !seen.contains(&id) {
                    seen.push(id.clone());
                    links.push(ArticleId::new(&id));
                }
            }
        }
    }

    links
}

/// Locates the External-links section heading by text or id
fn find_external_links_heading(doc: &Html) -> Option<ElementRef<'_>> {
    doc.tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            if el.value().name() != "h2" {
                return false;
            }
            let text: String = el.text().collect::<Vec<_>>().join(" ");
            text.to_lowercase().contains("external")
                || el
                    .value()
                    .attr("id")
                    .is_some_and(|id| id.to_lowercase().contains("external"))
        })
}

/// Derives an article identifier from a hyperlink, or rejects it
///
/// Accepts internal article paths only, takes the trailing path segment,
/// and filters out reserved namespaces and navigation-looking link text.
fn candidate_from_href(href: &str, text: &str) -> Option<String> {
    let is_internal = href.contains("wikipedia.org") || href.starts_with("/wiki/");
    if !is_internal || !is_valid_link_text(text) {
        return None;
    }

    let identifier = href.rsplit("/wiki/").next()?;
    if identifier.is_empty() || !href.contains("/wiki/") {
        return None;
    }

    if RESERVED_PREFIXES
        .iter()
        .any(|prefix| identifier.starts_with(prefix))
    {
        return None;
    }

    Some(identifier.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(html: &str) -> Vec<String> {
        discover_links(html)
            .into_iter()
            .map(|id| id.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_discovers_article_links_in_order() {
        let html = r#"<html><body>
            <h2 id="External_links">External links</h2>
            <ul>
                <li><a href="/wiki/First_Film">First Film</a></li>
                <li><a href="https://en.wikipedia.org/wiki/Second_Film">Second Film</a></li>
            </ul>
        </body></html>"#;

        assert_eq!(ids(html), vec!["First_Film", "Second_Film"]);
    }

    #[test]
    fn test_no_external_section_yields_empty() {
        let html = r#"<html><body>
            <h2 id="Plot">Plot</h2>
            <ul><li><a href="/wiki/Hidden_Film">Hidden Film</a></li></ul>
        </body></html>"#;

        assert!(ids(html).is_empty());
    }

    #[test]
    fn test_section_heading_matched_by_text() {
        let html = r#"<html><body>
            <h2 id="other">External links</h2>
            <ul><li><a href="/wiki/Some_Film">Some Film</a></li></ul>
        </body></html>"#;

        assert_eq!(ids(html), vec!["Some_Film"]);
    }

    #[test]
    fn test_links_after_next_heading_excluded() {
        let html = r#"<html><body>
            <h2 id="External_links">External links</h2>
            <ul><li><a href="/wiki/In_Section">In Section</a></li></ul>
            <h2 id="References">References</h2>
            <ul><li><a href="/wiki/Out_Of_Section">Out Of Section</a></li></ul>
        </body></html>"#;

        assert_eq!(ids(html), vec!["In_Section"]);
    }

    #[test]
    fn test_reserved_namespaces_rejected() {
        let html = r#"<html><body>
            <h2 id="External_links">External links</h2>
            <ul>
                <li><a href="/wiki/Category:Films">Some category</a></li>
                <li><a href="/wiki/Template:Infobox">Some template</a></li>
                <li><a href="/wiki/Wikipedia:About_pages">Some meta page</a></li>
                <li><a href="/wiki/Special:Random">Some special page</a></li>
                <li><a href="/wiki/Real_Film">Real Film</a></li>
            </ul>
        </body></html>"#;

        assert_eq!(ids(html), vec!["Real_Film"]);
    }

    #[test]
    fn test_offsite_links_rejected() {
        let html = r#"<html><body>
            <h2 id="External_links">External links</h2>
            <ul>
                <li><a href="https://www.imdb.com/title/tt0000001/">Film at IMDb</a></li>
                <li><a href="/wiki/Kept_Film">Kept Film</a></li>
            </ul>
        </body></html>"#;

        assert_eq!(ids(html), vec!["Kept_Film"]);
    }

    #[test]
    fn test_nav_text_rejected() {
        let html = r#"<html><body>
            <h2 id="External_links">External links</h2>
            <ul>
                <li><a href="/wiki/Edit_Target">edit</a></li>
                <li><a href="/wiki/V_Target">v</a></li>
                <li><a href="/wiki/Good_Film">Good Film</a></li>
            </ul>
        </body></html>"#;

        assert_eq!(ids(html), vec!["Good_Film"]);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let html = r#"<html><body>
            <h2 id="External_links">External links</h2>
            <ul>
                <li><a href="/wiki/Dup_Film">Dup Film</a></li>
                <li><a href="/wiki/Other_Film">Other Film</a></li>
                <li><a href="/wiki/Dup_Film">Dup Film again</a></li>
            </ul>
        </body></html>"#;

        assert_eq!(ids(html), vec!["Dup_Film", "Other_Film"]);
    }
}
