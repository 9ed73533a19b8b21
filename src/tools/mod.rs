//! External collaborators the builder drives: bundler, transpiler, minifier and hooks.
//!
//! Each collaborator is a single-method trait so the builder can be exercised with
//! in-process fakes, while [`command`] provides implementations that shell out to the
//! usual JavaScript tooling.

pub mod command;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use crate::config::BuildConfig;

pub use command::{CommandBundler, CommandHook, CommandTool};

/// Inputs for bundling a single entry module into a single output file.
#[derive(Debug, Clone, Copy)]
pub struct BundleRequest<'a> {
  /// Entry module on disk.
  pub input: &'a Path,
  /// File the bundle will be written to.
  pub output: &'a Path,
  /// Module ids left out of the bundle and loaded as globals instead.
  pub externals: &'a [String],
  /// Bundler plugins to enable.
  pub plugins: &'a [String],
  /// Output format, e.g. `iife`.
  pub format: &'a str,
  /// Global variable name for the bundle's exports.
  pub name: Option<&'a str>,
  /// Mapping from external module ids to global variable names.
  pub globals: &'a BTreeMap<String, String>,
}

/// Produces bundled code for an entry module.
pub trait Bundler {
  /// Bundle the request's entry module and return the generated code.
  fn bundle(&self, request: &BundleRequest<'_>) -> Result<String>;
}

/// Rewrites bundled code, e.g. to downlevel modern syntax.
pub trait Transpiler {
  /// Transform `code` with the configured options.
  fn transform(&self, code: &str, options: &Value) -> Result<String>;
}

/// Compresses bundled code.
pub trait Minifier {
  /// Minify `code` with the configured options. An error aborts the build.
  fn minify(&self, code: &str, options: &Value) -> Result<String>;
}

/// Lifecycle callback invoked with the source path before, or output path after, a build.
pub trait BuildHook {
  /// Run the hook for `path`.
  fn run(&self, path: &Path) -> Result<()>;
}

/// Set of collaborators used for one build.
pub struct Toolchain {
  /// Bundler used for every entry.
  pub bundler: Box<dyn Bundler>,
  /// Optional transpiler applied after bundling.
  pub transpiler: Option<Box<dyn Transpiler>>,
  /// Optional minifier applied last.
  pub minifier: Option<Box<dyn Minifier>>,
  /// Hook invoked with each entry's source path.
  pub before_build: Option<Box<dyn BuildHook>>,
  /// Hook invoked with each entry's output path.
  pub after_build: Option<Box<dyn BuildHook>>,
}

impl Toolchain {
  /// Toolchain with only a bundler.
  pub fn new(bundler: impl Bundler + 'static) -> Self {
    Self {
      bundler: Box::new(bundler),
      transpiler: None,
      minifier: None,
      before_build: None,
      after_build: None,
    }
  }

  /// Build the command-backed toolchain described by a configuration.
  pub fn from_config(config: &BuildConfig) -> Self {
    Self {
      bundler: Box::new(CommandBundler::new(config.bundler.command.clone())),
      transpiler: config
        .transpiler
        .as_ref()
        .map(|tool| Box::new(CommandTool::new(tool.command.clone())) as Box<dyn Transpiler>),
      minifier: config
        .minifier
        .as_ref()
        .map(|tool| Box::new(CommandTool::new(tool.command.clone())) as Box<dyn Minifier>),
      before_build: config
        .before_build
        .as_ref()
        .map(|command| Box::new(CommandHook::new(command.clone())) as Box<dyn BuildHook>),
      after_build: config
        .after_build
        .as_ref()
        .map(|command| Box::new(CommandHook::new(command.clone())) as Box<dyn BuildHook>),
    }
  }
}
