//! Text cleanup helpers shared by the extractor and link discoverer

/// Navigation boilerplate that must never be treated as article content.
///
/// Single-letter entries are the section-edit widgets ("v", "t", "e"); the
/// longer entries are footer labels common to every page on the site.
const NAV_ELEMENTS: &[&str] = &[
    "v",
    "t",
    "e",
    "v t e",
    "view",
    "template",
    "edit",
    "talk",
    "history",
    "watch",
    "star",
    "privacy policy",
    "about wikipedia",
    "disclaimers",
    "contact wikipedia",
    "code of conduct",
    "developers",
    "statistics",
    "cookie statement",
    "mobile view",
];

/// Strips bracketed reference markers (e.g. `[3]`, `[ 12 ]`) and collapses
/// internal whitespace runs to single spaces.
pub fn clean_reference_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '[' {
            // Scan ahead for an all-digit (plus whitespace) bracket body
            let mut j = i + 1;
            let mut saw_digit = false;
            while j < chars.len() && (chars[j].is_ascii_digit() || chars[j].is_whitespace()) {
                saw_digit |= chars[j].is_ascii_digit();
                j += 1;
            }
            if saw_digit && j < chars.len() && chars[j] == ']' {
                i = j + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    collapse_whitespace(&out)
}

/// Collapses runs of whitespace to single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if link text looks like real content rather than a
/// navigation element.
///
/// Rejects exact denylist matches, text containing a multi-word boilerplate
/// phrase, and anything one character or shorter.
pub fn is_valid_link_text(text: &str) -> bool {
    let stripped = text.trim();
    if stripped.len() <= 1 {
        return false;
    }

    let lower = stripped.to_lowercase();
    if NAV_ELEMENTS.contains(&lower.as_str()) {
        return false;
    }

    // Substring matching only makes sense for the multi-character phrases;
    // single letters would reject nearly all text.
    NAV_ELEMENTS
        .iter()
        .filter(|nav| nav.len() > 1)
        .all(|nav| !lower.contains(nav))
}
