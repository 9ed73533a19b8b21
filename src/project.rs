//! Filesystem layout of the application being built.

use std::path::{Path, PathBuf};

use crate::config::BuildConfig;

/// Marker file identifying the application root.
pub const APP_ROOT_MARKER: &str = "package.json";

/// Find the nearest ancestor of `start` (inclusive) that contains `package.json`.
pub fn find_app_root(start: &Path) -> Option<PathBuf> {
  start
    .ancestors()
    .find(|dir| dir.join(APP_ROOT_MARKER).is_file())
    .map(Path::to_path_buf)
}

/// Resolved directories a build reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
  /// Directory entry paths are resolved against.
  pub cwd: PathBuf,
  /// Application root, where vendor modules are installed.
  pub app_root: PathBuf,
  /// Distribution directory that receives every build output.
  pub dist_dir: PathBuf,
}

impl ProjectLayout {
  /// Resolve the layout for a config loaded from `config_path` (if any).
  ///
  /// `dist` is relative to the config file; without one the output goes to `dist`
  /// under the application root. Without a `package.json` the working directory is
  /// used as the application root.
  pub fn resolve(cwd: &Path, config: &BuildConfig, config_path: Option<&Path>) -> Self {
    let app_root = find_app_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
    let dist_dir = match config.dist.as_deref().filter(|dist| !dist.is_empty()) {
      Some(dist) => config_path.and_then(Path::parent).unwrap_or(cwd).join(dist),
      None => app_root.join("dist"),
    };

    Self {
      cwd: cwd.to_path_buf(),
      app_root,
      dist_dir,
    }
  }

  /// Location of an installed vendor file.
  pub fn vendor_source(&self, config: &BuildConfig, relative: &str) -> PathBuf {
    self.app_root.join(&config.vendor_root).join(relative)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn finds_nearest_package_json() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("package.json"), "{}").unwrap();
    let nested = dir.path().join("a/b");
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(find_app_root(&nested), Some(dir.path().to_path_buf()));
  }

  #[test]
  fn dist_is_relative_to_config_file() {
    let dir = tempdir().unwrap();
    let config = BuildConfig {
      dist: Some("build/out".into()),
      ..BuildConfig::default()
    };
    let config_path = dir.path().join("conf/pagepack.json");

    let layout = ProjectLayout::resolve(dir.path(), &config, Some(&config_path));
    assert_eq!(layout.dist_dir, dir.path().join("conf/build/out"));
  }

  #[test]
  fn dist_defaults_to_app_root() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("package.json"), "{}").unwrap();
    let nested = dir.path().join("pages");
    fs::create_dir_all(&nested).unwrap();

    let layout = ProjectLayout::resolve(&nested, &BuildConfig::default(), None);
    assert_eq!(layout.app_root, dir.path().to_path_buf());
    assert_eq!(layout.dist_dir, dir.path().join("dist"));
    assert_eq!(
      layout.vendor_source(&BuildConfig::default(), "vue/dist/vue.js"),
      dir.path().join("node_modules/vue/dist/vue.js")
    );
  }
}
