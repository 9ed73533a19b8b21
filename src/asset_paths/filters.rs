/// Determine whether a reference points at a remote resource.
///
/// Only the literal `http` prefix counts, so `http://` and `https://` URLs are skipped
/// while protocol-relative values such as `//cdn.example.com/x.js` are still treated
/// as local paths.
pub fn is_external_reference(value: &str) -> bool {
  value.starts_with("http")
}
