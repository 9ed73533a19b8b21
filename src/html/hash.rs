//! Content digests appended to local references for cache busting.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::asset_paths::{reference_status, resolve_reference};
use crate::html::scan::{reference_from_captures, reference_pattern, scan_references};
use crate::models::ReferenceStatus;

/// Number of hex characters kept from the MD5 digest.
pub const DIGEST_LEN: usize = 10;

/// Short hex digest of the given bytes.
pub fn content_digest(bytes: &[u8]) -> String {
  let digest = format!("{:x}", md5::compute(bytes));
  digest[..DIGEST_LEN].to_string()
}

/// Query key carrying the content digest.
pub const DIGEST_KEY: &str = "_h";

/// Append a digest to a reference value as a `_h=<digest>` query component.
///
/// Existing query components are kept in order. A previous `_h` component is
/// replaced, so hashing the same document twice is stable.
pub fn append_digest(value: &str, digest: &str) -> String {
  let (path, query) = match value.split_once('?') {
    Some((path, query)) => (path, Some(query)),
    None => (value, None),
  };

  let mut components: Vec<String> = query
    .into_iter()
    .flat_map(|query| query.split('&'))
    .filter(|component| !component.is_empty() && !is_digest_component(component))
    .map(str::to_string)
    .collect();
  components.push(format!("{DIGEST_KEY}={digest}"));

  format!("{path}?{}", components.join("&"))
}

fn is_digest_component(component: &str) -> bool {
  component
    .split_once('=')
    .is_some_and(|(key, _)| key == DIGEST_KEY)
}

/// Append content hashes to every local `src`/`href` reference that exists in `dist_dir`.
///
/// External URLs and references to missing files pass through unchanged. All occurrences
/// of an identical reference are rewritten the same way in a single pass.
pub fn inject_content_hashes(html: &str, dist_dir: &Path) -> Result<String> {
  let mut rewrites: HashMap<&str, String> = HashMap::new();

  for reference in scan_references(html) {
    if rewrites.contains_key(reference.token) {
      continue;
    }

    let resolved = resolve_reference(reference, dist_dir);
    match reference_status(&resolved) {
      ReferenceStatus::External => {
        debug!("skipping external reference {}", reference.value);
      }
      ReferenceStatus::Missing => {
        debug!(
          "skipping reference {} with no file at {}",
          reference.value,
          resolved.absolute_path.display()
        );
      }
      ReferenceStatus::Eligible => {
        let bytes = fs::read(&resolved.absolute_path)
          .with_context(|| format!("failed to read {}", resolved.absolute_path.display()))?;
        let value = append_digest(reference.value, &content_digest(&bytes));
        rewrites.insert(reference.token, reference.with_value(&value));
      }
    }
  }

  if rewrites.is_empty() {
    return Ok(html.to_string());
  }

  let rewritten = reference_pattern().replace_all(html, |caps: &regex::Captures<'_>| {
    reference_from_captures(caps)
      .and_then(|reference| rewrites.get(reference.token).cloned())
      .unwrap_or_else(|| caps[0].to_string())
  });
  Ok(rewritten.into_owned())
}
