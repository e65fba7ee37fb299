//! Transformations applied to each legacy translation before submission.

mod language;
mod title;

pub use language::normalize_language_code;
pub use title::{decode_html_entities, extract_title};
