//! Build configuration loader describing vendors, static files and the external toolchain.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::models::VendorEntry;
use crate::project::find_app_root;

/// Config file names searched for in the application root, in order.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = [".pagepack.json", ".pagepack.yaml", ".pagepack.yml"];

/// Options forwarded to the bundler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
  /// Command template, see [`crate::tools::CommandBundler`] for placeholders.
  pub command: Vec<String>,
  /// Output format of the generated bundle.
  pub format: String,
  /// Mapping from external module ids to the globals that provide them.
  pub globals: BTreeMap<String, String>,
  /// Bundler plugins to enable.
  pub plugins: Vec<String>,
}

impl Default for BundlerConfig {
  fn default() -> Self {
    Self {
      command: [
        "rollup",
        "{input}",
        "--format",
        "{format}",
        "--name",
        "{name}",
        "--external",
        "{externals}",
        "--globals",
        "{globals}",
        "--plugin",
        "{plugins}",
        "--context",
        "window",
      ]
      .map(String::from)
      .to_vec(),
      format: "iife".into(),
      globals: BTreeMap::new(),
      plugins: Vec::new(),
    }
  }
}

/// Optional post-processing step such as a transpiler or minifier.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
  /// Command the code is piped through.
  pub command: Vec<String>,
  /// Tool-specific options, available to the command as `{options}`.
  #[serde(default)]
  pub options: Value,
}

/// Complete description of a build, loaded from JSON or YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
  /// Third-party scripts copied into `vendor/` and kept out of the bundle.
  pub vendor: Vec<VendorEntry>,
  /// Files or directories, relative to the entry document, copied verbatim.
  #[serde(rename = "static")]
  pub static_files: Vec<String>,
  /// Output directory relative to the config file. Defaults to `dist` in the app root.
  pub dist: Option<String>,
  /// Bundler command and options.
  pub bundler: BundlerConfig,
  /// Transpiler applied to every bundle, if any.
  pub transpiler: Option<ToolConfig>,
  /// Minifier applied to every bundle, if any.
  pub minifier: Option<ToolConfig>,
  /// Command run with each entry's source path before it is built.
  pub before_build: Option<Vec<String>>,
  /// Command run with each entry's output path after it is built.
  pub after_build: Option<Vec<String>>,
  /// Query key flagging the main script tag of an entry document.
  pub marker: String,
  /// Directory, relative to the app root, vendor and polyfill paths are resolved in.
  pub vendor_root: String,
  /// Polyfill path inside `vendor_root`, shipped when bundles need the generator runtime.
  pub polyfill: String,
  /// Prefix of the global name given to standalone JavaScript entries.
  pub module_namespace: String,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      vendor: Vec::new(),
      static_files: Vec::new(),
      dist: None,
      bundler: BundlerConfig::default(),
      transpiler: None,
      minifier: None,
      before_build: None,
      after_build: None,
      marker: "pr1_module".into(),
      vendor_root: "node_modules".into(),
      polyfill: "@babel/polyfill/dist/polyfill.min.js".into(),
      module_namespace: "pr1.modules".into(),
    }
  }
}

impl BuildConfig {
  /// Read configuration from a JSON or YAML file, picked by extension.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
      }),
      Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
      }),
      _ => Err(ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
      }),
    }
  }

  /// Locate a default config file in the application root above `cwd`.
  pub fn discover_path(cwd: &Path) -> Option<PathBuf> {
    let app_root = find_app_root(cwd)?;
    DEFAULT_CONFIG_FILES
      .iter()
      .map(|name| app_root.join(name))
      .find(|candidate| candidate.is_file())
  }

  /// Load the explicit config when given, otherwise a discovered default.
  ///
  /// A missing default config yields the built-in defaults; an explicit path that
  /// cannot be read or parsed is an error. Returns the config together with the
  /// file it was read from.
  pub fn load(cwd: &Path, explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
    let path = match explicit {
      Some(path) => Some(cwd.join(path)),
      None => Self::discover_path(cwd),
    };

    match path {
      Some(path) => {
        debug!("loading config from {}", path.display());
        let config = Self::from_path(&path)?;
        for problem in config.suspicious_settings() {
          warn!("{}: {problem}", path.display());
        }
        Ok((config, Some(path)))
      }
      None => {
        debug!("no config file found, using defaults");
        Ok((Self::default(), None))
      }
    }
  }

  /// Settings that parse but are unlikely to do what was meant.
  pub fn suspicious_settings(&self) -> Vec<String> {
    let mut problems = Vec::new();

    if self.marker.trim().is_empty() {
      problems.push("`marker` is empty, no entry script can be located".to_string());
    }

    let mut seen = BTreeSet::new();
    for name in self.vendor.iter().filter_map(VendorEntry::file_name) {
      if !seen.insert(name) {
        problems.push(format!(
          "vendor file name `{name}` is used twice, the later copy overwrites the earlier"
        ));
      }
    }

    for relative in &self.static_files {
      if relative.starts_with('/') || relative.split(['/', '\\']).any(|part| part == "..") {
        problems.push(format!(
          "static path `{relative}` points outside the entry directory"
        ));
      }
    }

    problems
  }

  /// Module ids the bundler should leave external.
  pub fn externals(&self) -> Vec<String> {
    self
      .vendor
      .iter()
      .map(|entry| entry.development.clone())
      .collect()
  }
}
