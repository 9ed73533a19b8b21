use std::path::Path;

/// Directory, relative to the entry document, that receives vendor scripts.
pub const VENDOR_DIR: &str = "vendor";

/// URL a page uses to load a vendor script copied next to it.
pub fn vendor_asset_url(file_name: &str) -> String {
  format!("./{VENDOR_DIR}/{file_name}")
}

/// Produce a `./`-prefixed URL for a file inside the distribution directory.
///
/// The generated path always uses forward slashes so that the rewritten document works
/// on every platform, regardless of the native directory separator. Returns `None` when
/// the file does not live under `dist_dir`.
pub fn dist_relative_url(dist_dir: &Path, file: &Path) -> Option<String> {
  let relative = file.strip_prefix(dist_dir).ok()?;
  let relative = relative.to_string_lossy().replace('\\', "/");
  Some(format!("./{}", relative.trim_start_matches('/')))
}
