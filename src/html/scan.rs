//! Locating `src`/`href` attribute values in raw HTML text.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::Reference;

/// Pattern matching `src=`/`href=` followed by a quoted or bare value without spaces or quotes.
pub(crate) fn reference_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(href|src)=(?:"([^ "']+)"?|'([^ "']+)'?|([^ "']+))"#)
      .expect("invalid reference regex")
  })
}

/// Lazily yield every reference in document order.
///
/// The iterator borrows `html`, so rescanning an updated document is just another call.
pub fn scan_references(html: &str) -> impl Iterator<Item = Reference<'_>> {
  reference_pattern()
    .captures_iter(html)
    .filter_map(|caps| reference_from_captures(&caps))
}

pub(crate) fn reference_from_captures<'a>(caps: &Captures<'a>) -> Option<Reference<'a>> {
  let whole = caps.get(0)?;
  let attribute = caps.get(1)?;
  let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;

  Some(Reference {
    token: whole.as_str(),
    attribute: attribute.as_str(),
    value: value.as_str(),
    value_offset: value.start() - whole.start(),
  })
}
