//! Article extraction: markup parsing, field mapping, and link discovery
//!
//! This module turns raw page markup into the crate's data model:
//! - [`page::extract_article`] produces a structured [`ArticleRecord`]
//! - [`links::discover_links`] yields the ordered candidate child identifiers

mod links;
mod page;
mod record;
mod text;

pub use links::discover_links;
pub use page::{extract_article, ExtractError};
pub use record::{ArticleId, ArticleRecord, AttrValue, FetchOutcome, FetchStatus};
pub use text::{clean_reference_markers, is_valid_link_text};
