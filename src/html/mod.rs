//! Text-level rewriting of entry documents: reference scanning, cache-busting hashes,
//! and vendor/preload/stylesheet injection.

pub mod assemble;
pub mod hash;
pub mod scan;

pub use assemble::{
  AssemblyPlan, assemble_document, ensure_head_close, find_entry_script, needs_polyfill,
};
pub use hash::{content_digest, inject_content_hashes};
pub use scan::scan_references;
