use std::path::Path;

use crate::asset_paths::is_external_reference;
use crate::models::{Reference, ReferenceStatus, ResolvedReference};

/// Resolve a reference against the directory the document is served from.
///
/// Root-relative values (`/assets/app.js`) are resolved inside `dist_dir` rather
/// than against the filesystem root.
pub fn resolve_reference<'a>(reference: Reference<'a>, dist_dir: &Path) -> ResolvedReference<'a> {
  let clean_path = reference.clean_path();
  let is_external = is_external_reference(clean_path);
  let absolute_path = dist_dir.join(clean_path.trim_start_matches('/'));

  ResolvedReference {
    clean_path,
    absolute_path,
    is_external,
  }
}

/// Classify a resolved reference for hashing.
///
/// Missing files are not an error: documents may point at resources produced at runtime
/// or hosted elsewhere.
pub fn reference_status(resolved: &ResolvedReference<'_>) -> ReferenceStatus {
  if resolved.is_external {
    ReferenceStatus::External
  } else if resolved.clean_path.is_empty() || !resolved.absolute_path.is_file() {
    ReferenceStatus::Missing
  } else {
    ReferenceStatus::Eligible
  }
}
