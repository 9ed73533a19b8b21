//! Data structures shared by the config loader, the document rewriter and the builder.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Third-party script copied into the page's `vendor/` directory.
///
/// Written in config files as a one- or two-element array: the development path
/// (also used as the bundler external id) and an optional production path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct VendorEntry {
  /// Module path used while developing and as the bundler external id.
  pub development: String,
  /// Module path shipped in builds, when it differs from the development path.
  pub production: Option<String>,
}

impl VendorEntry {
  /// Vendor entry using the same file for development and production.
  pub fn new(development: impl Into<String>) -> Self {
    Self {
      development: development.into(),
      production: None,
    }
  }

  /// Vendor entry with a dedicated production file.
  pub fn with_production(development: impl Into<String>, production: impl Into<String>) -> Self {
    Self {
      development: development.into(),
      production: Some(production.into()),
    }
  }

  /// Path of the file that is copied into builds.
  pub fn shipped_path(&self) -> &str {
    self.production.as_deref().unwrap_or(&self.development)
  }

  /// File name the vendor script has inside the output `vendor/` directory.
  pub fn file_name(&self) -> Option<&str> {
    Path::new(self.shipped_path())
      .file_name()
      .and_then(|name| name.to_str())
  }
}

impl TryFrom<Vec<String>> for VendorEntry {
  type Error = String;

  fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
    let mut parts = value.into_iter();
    let Some(development) = parts.next() else {
      return Err("vendor entry must name at least one path".into());
    };
    let production = parts.next();
    if parts.next().is_some() {
      return Err(format!(
        "vendor entry `{development}` has more than two paths"
      ));
    }
    Ok(Self {
      development,
      production,
    })
  }
}

impl From<VendorEntry> for Vec<String> {
  fn from(entry: VendorEntry) -> Self {
    let mut parts = vec![entry.development];
    parts.extend(entry.production);
    parts
  }
}

/// `src`/`href` attribute occurrence found in an HTML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
  /// Full matched text, attribute name and quotes included.
  pub token: &'a str,
  /// Attribute name, either `src` or `href`.
  pub attribute: &'a str,
  /// Attribute value without quotes.
  pub value: &'a str,
  /// Byte offset of `value` inside `token`.
  pub value_offset: usize,
}

impl<'a> Reference<'a> {
  /// Value with any query string removed.
  pub fn clean_path(&self) -> &'a str {
    match self.value.split_once('?') {
      Some((path, _)) => path,
      None => self.value,
    }
  }

  /// Rebuild the token with a different attribute value, keeping name and quotes.
  pub fn with_value(&self, value: &str) -> String {
    let value_end = self.value_offset + self.value.len();
    format!(
      "{}{}{}",
      &self.token[..self.value_offset],
      value,
      &self.token[value_end..]
    )
  }
}

/// Reference resolved against the distribution directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference<'a> {
  /// Value with any query string removed.
  pub clean_path: &'a str,
  /// Location of the referenced file on disk.
  pub absolute_path: PathBuf,
  /// Whether the value points at a remote URL.
  pub is_external: bool,
}

/// How the hash injector treats a resolved reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceStatus {
  /// Remote URL, left untouched.
  External,
  /// No file on disk, left untouched.
  Missing,
  /// Local file whose content hash is appended.
  Eligible,
}

/// Location of the flagged main script tag inside an entry document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryScript {
  /// Byte offset of the `<script` opening.
  pub tag_start: usize,
  /// Byte range of the `?marker=1` / `&marker=1` flag.
  pub flag_start: usize,
  /// End of the flag range (exclusive).
  pub flag_end: usize,
  /// `src` value preceding the flag, including any other query components.
  pub src: String,
}

impl EntryScript {
  /// Module path to hand to the bundler, relative to the entry document.
  pub fn module_path(&self) -> &str {
    match self.src.split_once('?') {
      Some((path, _)) => path,
      None => &self.src,
    }
  }
}
