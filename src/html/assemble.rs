//! Injection of vendor scripts, preload hints and stylesheets into an entry document.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;

use crate::asset_paths::vendor_asset_url;
use crate::error::AssemblyError;
use crate::html::hash::inject_content_hashes;
use crate::models::EntryScript;

/// Everything the assembler inserts into a copied entry document.
#[derive(Debug, Clone, Default)]
pub struct AssemblyPlan {
  /// Query key flagging the main script tag, e.g. `pr1_module`.
  pub marker: String,
  /// Vendor script file names inside `vendor/`, in load order.
  pub vendor_files: Vec<String>,
  /// Document-relative URL of the bundle's stylesheet, when one was produced.
  pub stylesheet: Option<String>,
}

fn head_close_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)</head\s*>").expect("invalid head regex"))
}

fn polyfill_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\bregeneratorRuntime\b").expect("invalid polyfill regex"))
}

/// Whether bundled code relies on the generator runtime helper and needs the polyfill.
pub fn needs_polyfill(code: &str) -> bool {
  polyfill_pattern().is_match(code)
}

/// `<script>` tag loading a vendor file.
pub fn vendor_script_tag(file_name: &str) -> String {
  format!(r#"  <script src="{}"></script>"#, vendor_asset_url(file_name))
}

/// `<link rel="preload">` tag for a vendor file.
pub fn preload_link_tag(file_name: &str) -> String {
  format!(
    r#"  <link rel="preload" href="{}" as="script">"#,
    vendor_asset_url(file_name)
  )
}

/// `<link rel="stylesheet">` tag for the given URL.
pub fn stylesheet_link_tag(href: &str) -> String {
  format!(r#"  <link rel="stylesheet" href="{href}">"#)
}

/// Locate the single script tag whose `src` carries `?<marker>=1` or `&<marker>=1`.
///
/// Tag and attribute names match in any case; the marker itself is case-sensitive.
pub fn find_entry_script(html: &str, marker: &str) -> Result<EntryScript, AssemblyError> {
  let pattern = Regex::new(&format!(
    r#"<(?i:script)\b[^>]*?\b(?i:src)=["']?([^"'\s>]*?)[?&]{}=1\b"#,
    regex::escape(marker)
  ))
  .expect("invalid entry script regex");

  let mut matches = pattern.captures_iter(html);
  let Some(caps) = matches.next() else {
    return Err(AssemblyError::MissingEntryScript {
      marker: marker.to_string(),
    });
  };
  let extra = matches.count();
  if extra > 0 {
    return Err(AssemblyError::DuplicateEntryScript {
      marker: marker.to_string(),
      count: extra + 1,
    });
  }

  let whole = caps.get(0).expect("regex match always has group 0");
  let src = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
  // `[?&]` + marker + `=1`
  let flag_len = marker.len() + 3;

  Ok(EntryScript {
    tag_start: whole.start(),
    flag_start: whole.end() - flag_len,
    flag_end: whole.end(),
    src: src.to_string(),
  })
}

/// Check that the document has a closing head tag to insert preloads and stylesheets before.
pub fn ensure_head_close(html: &str) -> Result<(), AssemblyError> {
  if head_close_pattern().is_match(html) {
    Ok(())
  } else {
    Err(AssemblyError::MissingHeadClose)
  }
}

/// Insert lines right before the closing head tag.
pub fn insert_before_head_close(html: &str, lines: &[String]) -> Result<String, AssemblyError> {
  let head = head_close_pattern()
    .find(html)
    .ok_or(AssemblyError::MissingHeadClose)?;
  if lines.is_empty() {
    return Ok(html.to_string());
  }

  let mut updated = String::with_capacity(html.len() + lines.len() * 64);
  updated.push_str(&html[..head.start()]);
  for line in lines {
    updated.push_str(line);
    updated.push('\n');
  }
  updated.push_str(&html[head.start()..]);
  Ok(updated)
}

/// Insert lines right before the flagged entry script.
///
/// When the tag opens its line (only indentation before it) the lines go in front of
/// that line so the tag keeps its indentation; otherwise they go directly before the tag.
pub fn insert_before_entry_script(
  html: &str,
  marker: &str,
  lines: &[String],
) -> Result<String, AssemblyError> {
  let entry = find_entry_script(html, marker)?;
  if lines.is_empty() {
    return Ok(html.to_string());
  }

  let line_start = html[..entry.tag_start]
    .rfind('\n')
    .map(|index| index + 1)
    .unwrap_or(0);
  let insert_at = if html[line_start..entry.tag_start].trim().is_empty() {
    line_start
  } else {
    entry.tag_start
  };

  let mut updated = String::with_capacity(html.len() + lines.len() * 64);
  updated.push_str(&html[..insert_at]);
  for line in lines {
    updated.push_str(line);
    updated.push('\n');
  }
  updated.push_str(&html[insert_at..]);
  Ok(updated)
}

/// Remove the build marker flag from the entry script, keeping the rest of its query valid.
pub fn strip_marker(html: &str, marker: &str) -> Result<String, AssemblyError> {
  let entry = find_entry_script(html, marker)?;
  let opens_query = html[entry.flag_start..].starts_with('?');
  let followed_by_more = html[entry.flag_end..].starts_with('&');

  // `?marker=1&rest` keeps the `?` and drops the separator after the flag.
  let (cut_start, cut_end) = if opens_query && followed_by_more {
    (entry.flag_start + 1, entry.flag_end + 1)
  } else {
    (entry.flag_start, entry.flag_end)
  };

  Ok(format!("{}{}", &html[..cut_start], &html[cut_end..]))
}

/// Run every rewrite pass over a copied entry document.
///
/// Vendor scripts and preload hints go in first, then the stylesheet link, then the
/// marker flag is stripped and finally every local reference, including the inserted
/// ones, receives its content hash.
pub fn assemble_document(html: &str, plan: &AssemblyPlan, dist_dir: &Path) -> Result<String> {
  let scripts: Vec<String> = plan
    .vendor_files
    .iter()
    .map(|file| vendor_script_tag(file))
    .collect();
  let preloads: Vec<String> = plan
    .vendor_files
    .iter()
    .map(|file| preload_link_tag(file))
    .collect();

  let mut text = insert_before_entry_script(html, &plan.marker, &scripts)?;
  text = insert_before_head_close(&text, &preloads)?;

  if let Some(stylesheet) = &plan.stylesheet {
    text = insert_before_head_close(&text, &[stylesheet_link_tag(stylesheet)])?;
  }

  text = strip_marker(&text, &plan.marker)?;
  inject_content_hashes(&text, dist_dir)
}
