//! Helpers for classifying and resolving asset paths referenced by entry documents.
//!
//! The responsibilities are split into focused submodules so that the rules for
//! recognising remote URLs, building output-relative paths, and resolving references
//! against the distribution directory can be tested independently.

mod dist;
mod filters;
mod resolve;

pub use dist::{VENDOR_DIR, dist_relative_url, vendor_asset_url};
pub use filters::is_external_reference;
pub use resolve::{reference_status, resolve_reference};
