//! Build orchestrator responsible for bundling entries and assembling their documents.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use same_file::is_same_file;
use serde_json::Value;
use walkdir::WalkDir;

use crate::asset_paths::{VENDOR_DIR, dist_relative_url};
use crate::config::{BuildConfig, ToolConfig};
use crate::html::{
  AssemblyPlan, assemble_document, ensure_head_close, find_entry_script, needs_polyfill,
};
use crate::project::ProjectLayout;
use crate::tools::{BundleRequest, Toolchain};

/// High-level helper compiling entry documents and scripts into the distribution directory.
pub struct PageBuilder<'a> {
  config: &'a BuildConfig,
  layout: &'a ProjectLayout,
  tools: &'a Toolchain,
}

impl<'a> PageBuilder<'a> {
  /// Create a builder for the provided config, layout and collaborators.
  pub fn new(config: &'a BuildConfig, layout: &'a ProjectLayout, tools: &'a Toolchain) -> Self {
    Self {
      config,
      layout,
      tools,
    }
  }

  /// Recreate the distribution directory, then compile every entry in order.
  ///
  /// The first failing entry aborts the run. Returns the output path of each entry.
  pub fn build<P: AsRef<Path>>(&self, entries: &[P]) -> Result<Vec<PathBuf>> {
    prepare_dist(&self.layout.dist_dir)?;
    entries
      .iter()
      .map(|entry| self.compile_entry(entry.as_ref()))
      .collect()
  }

  /// Compile one entry: an HTML document or a standalone JavaScript module.
  pub fn compile_entry(&self, entry: &Path) -> Result<PathBuf> {
    let source = self.layout.cwd.join(entry);
    let target = self.target_path(&source);
    info!("building {}", source.display());

    if let Some(hook) = &self.tools.before_build {
      hook.run(&source)?;
    }

    if is_script(&source) {
      let name = module_global_name(&self.config.module_namespace, &source);
      self.bundle(&source, &target, Some(&name))?;
    } else {
      self.compile_html(&source, &target)?;
    }

    if let Some(hook) = &self.tools.after_build {
      hook.run(&target)?;
    }

    info!("finished {}", target.display());
    Ok(target)
  }

  /// Copy an entry document, bundle its main script and rewrite the copy.
  pub fn compile_html(&self, source: &Path, target: &Path) -> Result<()> {
    let origin_dir = source
      .parent()
      .ok_or_else(|| anyhow!("entry {} has no parent directory", source.display()))?;
    let dist_dir = target
      .parent()
      .ok_or_else(|| anyhow!("output {} has no parent directory", target.display()))?;

    let source_html = fs::read_to_string(source)
      .with_context(|| format!("failed to read {}", source.display()))?;
    let entry = find_entry_script(&source_html, &self.config.marker)
      .with_context(|| format!("invalid entry document {}", source.display()))?;
    ensure_head_close(&source_html)
      .with_context(|| format!("invalid entry document {}", source.display()))?;
    let main = bundle_relative_path(entry.module_path())
      .with_context(|| format!("invalid entry document {}", source.display()))?;

    install_file(source, target)?;
    let mut vendor_files = self.copy_vendors(dist_dir)?;
    self.copy_static_files(origin_dir, dist_dir)?;

    let input = origin_dir.join(&main);
    let output = dist_dir.join(&main);
    let code = self.bundle(&input, &output, None)?;

    if needs_polyfill(&code) {
      vendor_files.push(self.copy_polyfill(dist_dir)?);
    }

    let stylesheet = sibling_stylesheet(&output).and_then(|css| dist_relative_url(dist_dir, &css));

    let html = fs::read_to_string(target)
      .with_context(|| format!("failed to read {}", target.display()))?;
    let plan = AssemblyPlan {
      marker: self.config.marker.clone(),
      vendor_files,
      stylesheet,
    };
    let html = assemble_document(&html, &plan, dist_dir)
      .with_context(|| format!("failed to assemble {}", target.display()))?;

    fs::write(target, html).with_context(|| format!("failed to write {}", target.display()))
  }

  /// Bundle, transpile and minify `input`, write the result to `output` and return it.
  pub fn bundle(&self, input: &Path, output: &Path, name: Option<&str>) -> Result<String> {
    let externals = self.config.externals();
    let request = BundleRequest {
      input,
      output,
      externals: &externals,
      plugins: &self.config.bundler.plugins,
      format: &self.config.bundler.format,
      name,
      globals: &self.config.bundler.globals,
    };

    let mut code = self.tools.bundler.bundle(&request)?;
    if let Some(transpiler) = &self.tools.transpiler {
      code = transpiler.transform(&code, tool_options(self.config.transpiler.as_ref()))?;
    }
    if let Some(minifier) = &self.tools.minifier {
      code = minifier.minify(&code, tool_options(self.config.minifier.as_ref()))?;
    }

    if let Some(parent) = output.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(output, &code).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(code)
  }

  fn copy_vendors(&self, dist_dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::with_capacity(self.config.vendor.len());
    for vendor in &self.config.vendor {
      let file_name = vendor
        .file_name()
        .ok_or_else(|| anyhow!("vendor entry `{}` has no file name", vendor.shipped_path()))?;
      let source = self.layout.vendor_source(self.config, vendor.shipped_path());
      copy_path(&source, &dist_dir.join(VENDOR_DIR).join(file_name))?;
      files.push(file_name.to_string());
    }
    Ok(files)
  }

  fn copy_polyfill(&self, dist_dir: &Path) -> Result<String> {
    let file_name = Path::new(&self.config.polyfill)
      .file_name()
      .and_then(|name| name.to_str())
      .ok_or_else(|| anyhow!("polyfill `{}` has no file name", self.config.polyfill))?;
    let source = self.layout.vendor_source(self.config, &self.config.polyfill);
    debug!("bundle uses the generator runtime, shipping {}", source.display());
    copy_path(&source, &dist_dir.join(VENDOR_DIR).join(file_name))?;
    Ok(file_name.to_string())
  }

  fn copy_static_files(&self, origin_dir: &Path, dist_dir: &Path) -> Result<()> {
    for relative in &self.config.static_files {
      copy_path(&origin_dir.join(relative), &dist_dir.join(relative))?;
    }
    Ok(())
  }

  fn target_path(&self, source: &Path) -> PathBuf {
    let relative = source
      .strip_prefix(&self.layout.cwd)
      .ok()
      .filter(|relative| {
        !relative
          .components()
          .any(|component| matches!(component, Component::ParentDir))
      })
      .map(Path::to_path_buf)
      .or_else(|| source.file_name().map(PathBuf::from))
      .unwrap_or_default();
    self.layout.dist_dir.join(relative)
  }
}

fn tool_options(tool: Option<&ToolConfig>) -> &Value {
  static NULL: Value = Value::Null;
  tool.map(|tool| &tool.options).unwrap_or(&NULL)
}

/// Path of the main script below the entry directory.
///
/// A leading `/` is relative to the entry directory, matching how root-relative
/// references resolve inside the output. Paths climbing out with `..` are rejected.
fn bundle_relative_path(module_path: &str) -> Result<PathBuf> {
  let relative = Path::new(module_path.trim_start_matches('/'));
  if relative.as_os_str().is_empty() {
    return Err(anyhow!("entry script `{module_path}` has an empty path"));
  }
  if relative
    .components()
    .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
  {
    return Err(anyhow!(
      "entry script `{module_path}` must stay inside the entry directory"
    ));
  }
  Ok(relative.to_path_buf())
}

fn is_script(path: &Path) -> bool {
  matches!(
    path.extension().and_then(|ext| ext.to_str()),
    Some("js" | "mjs")
  )
}

/// Global name for a standalone module: `<namespace>.<file name with '.' → '_'>`.
pub fn module_global_name(namespace: &str, source: &Path) -> String {
  let file_name = source
    .file_name()
    .map(|name| name.to_string_lossy().replace('.', "_"))
    .unwrap_or_default();
  format!("{namespace}.{file_name}")
}

/// Stylesheet emitted next to a bundle (`app.js` → `app.css`), if the bundler produced one.
pub fn sibling_stylesheet(bundle: &Path) -> Option<PathBuf> {
  if !is_script(bundle) {
    return None;
  }
  let css = bundle.with_extension("css");
  css.is_file().then_some(css)
}

/// Remove the distribution directory if present and create it empty.
pub fn prepare_dist(dist_dir: &Path) -> Result<()> {
  if dist_dir.exists() {
    fs::remove_dir_all(dist_dir)
      .with_context(|| format!("failed to clear {}", dist_dir.display()))?;
  }
  fs::create_dir_all(dist_dir).with_context(|| format!("failed to create {}", dist_dir.display()))
}

/// Copy a file or a whole directory tree, creating parent directories as needed.
pub fn copy_path(source: &Path, destination: &Path) -> Result<()> {
  if !source.is_dir() {
    return install_file(source, destination);
  }

  for entry in WalkDir::new(source) {
    let entry = entry.with_context(|| format!("failed to walk {}", source.display()))?;
    let relative = entry
      .path()
      .strip_prefix(source)
      .with_context(|| format!("unexpected path {}", entry.path().display()))?;
    let target = destination.join(relative);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&target)
        .with_context(|| format!("failed to create {}", target.display()))?;
    } else {
      install_file(entry.path(), &target)?;
    }
  }
  Ok(())
}

fn install_file(source: &Path, destination: &Path) -> Result<()> {
  if destination.exists()
    && is_same_file(source, destination)
      .with_context(|| format!("failed to compare {}", source.display()))?
  {
    return Ok(());
  }

  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
  }
  fs::copy(source, destination).with_context(|| {
    format!(
      "failed to copy {} to {}",
      source.display(),
      destination.display()
    )
  })?;
  debug!("copied {} to {}", source.display(), destination.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::AssemblyError;
  use crate::html::content_digest;
  use crate::models::VendorEntry;
  use crate::tools::{BuildHook, Bundler, Minifier, Transpiler};
  use std::cell::RefCell;
  use std::rc::Rc;
  use tempfile::tempdir;

  #[derive(Debug, Clone, PartialEq)]
  struct Recorded {
    input: PathBuf,
    name: Option<String>,
    externals: Vec<String>,
  }

  #[derive(Clone, Default)]
  struct FakeBundler {
    code: String,
    stylesheet: Option<String>,
    calls: Rc<RefCell<Vec<Recorded>>>,
  }

  impl FakeBundler {
    fn emitting(code: &str) -> Self {
      Self {
        code: code.into(),
        ..Self::default()
      }
    }
  }

  impl Bundler for FakeBundler {
    fn bundle(&self, request: &BundleRequest<'_>) -> Result<String> {
      self.calls.borrow_mut().push(Recorded {
        input: request.input.to_path_buf(),
        name: request.name.map(str::to_string),
        externals: request.externals.to_vec(),
      });
      if let Some(css) = &self.stylesheet {
        fs::create_dir_all(request.output.parent().unwrap())?;
        fs::write(request.output.with_extension("css"), css)?;
      }
      Ok(self.code.clone())
    }
  }

  struct Suffix(&'static str);

  impl Transpiler for Suffix {
    fn transform(&self, code: &str, _options: &Value) -> Result<String> {
      Ok(format!("{code}{}", self.0))
    }
  }

  impl Minifier for Suffix {
    fn minify(&self, code: &str, _options: &Value) -> Result<String> {
      Ok(format!("{code}{}", self.0))
    }
  }

  struct FailingMinifier;

  impl Minifier for FailingMinifier {
    fn minify(&self, _code: &str, _options: &Value) -> Result<String> {
      Err(anyhow!("Unexpected token: keyword (const)"))
    }
  }

  #[derive(Clone, Default)]
  struct RecordingHook(Rc<RefCell<Vec<PathBuf>>>);

  impl BuildHook for RecordingHook {
    fn run(&self, path: &Path) -> Result<()> {
      self.0.borrow_mut().push(path.to_path_buf());
      Ok(())
    }
  }

  struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
  }

  fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let root = dir.path().to_path_buf();
    fs::write(root.join("package.json"), "{}").unwrap();

    let vendor = root.join("node_modules");
    fs::create_dir_all(vendor.join("vue/dist")).unwrap();
    fs::write(vendor.join("vue/dist/vue.min.js"), "vue").unwrap();
    fs::create_dir_all(vendor.join("axios/dist")).unwrap();
    fs::write(vendor.join("axios/dist/axios.min.js"), "axios").unwrap();
    fs::create_dir_all(vendor.join("@babel/polyfill/dist")).unwrap();
    fs::write(vendor.join("@babel/polyfill/dist/polyfill.min.js"), "polyfill").unwrap();

    let src = root.join("src");
    fs::create_dir_all(src.join("images")).unwrap();
    fs::write(src.join("images/logo.png"), "png").unwrap();
    fs::write(src.join("main.js"), "import Vue from 'vue';").unwrap();
    fs::write(
      src.join("index.html"),
      [
        "<html>",
        "<head>",
        "  <link rel=\"icon\" href=\"images/logo.png\">",
        "  <link rel=\"stylesheet\" href=\"https://cdn.example.com/reset.css\">",
        "</head>",
        "<body>",
        "  <img src=\"images/missing.png\">",
        "  <script src=\"main.js?pr1_module=1\"></script>",
        "</body>",
        "</html>",
      ]
      .join("\n"),
    )
    .unwrap();

    Fixture { _dir: dir, root }
  }

  fn config() -> BuildConfig {
    BuildConfig {
      vendor: vec![
        VendorEntry::with_production("vue/dist/vue.esm.browser.js", "vue/dist/vue.min.js"),
        VendorEntry::new("axios/dist/axios.min.js"),
      ],
      static_files: vec!["images".into()],
      ..BuildConfig::default()
    }
  }

  #[test]
  fn builds_html_entry_end_to_end() {
    let fx = fixture();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let bundler = FakeBundler::emitting("(function(){})();");
    let calls = bundler.calls.clone();
    let tools = Toolchain::new(bundler);

    let outputs = PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap();
    let target = fx.root.join("dist/src/index.html");
    assert_eq!(outputs, vec![target.clone()]);

    let recorded = calls.borrow();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].input, fx.root.join("src/main.js"));
    assert_eq!(recorded[0].name, None);
    assert_eq!(recorded[0].externals, vec![
      "vue/dist/vue.esm.browser.js".to_string(),
      "axios/dist/axios.min.js".to_string(),
    ]);

    let dist = fx.root.join("dist/src");
    assert_eq!(fs::read_to_string(dist.join("main.js")).unwrap(), "(function(){})();");
    assert!(dist.join("vendor/vue.min.js").is_file());
    assert!(dist.join("vendor/axios.min.js").is_file());
    assert!(dist.join("images/logo.png").is_file());

    let html = fs::read_to_string(&target).unwrap();
    let main = content_digest(b"(function(){})();");
    let vue = content_digest(b"vue");
    let axios = content_digest(b"axios");
    let logo = content_digest(b"png");
    let scripts = [
      format!("  <script src=\"./vendor/vue.min.js?_h={vue}\"></script>"),
      format!("  <script src=\"./vendor/axios.min.js?_h={axios}\"></script>"),
      format!("  <script src=\"main.js?_h={main}\"></script>"),
    ]
    .join("\n");
    assert!(html.contains(&scripts), "{html}");
    assert!(html.contains(&format!("href=\"./vendor/vue.min.js?_h={vue}\" as=\"script\"")));
    assert!(html.contains(&format!("href=\"images/logo.png?_h={logo}\"")));
    assert!(html.contains("href=\"https://cdn.example.com/reset.css\""));
    assert!(html.contains("src=\"images/missing.png\""));
    assert!(!html.contains("pr1_module"));
    assert!(!html.contains("polyfill"));

    let source = fs::read_to_string(fx.root.join("src/index.html")).unwrap();
    assert!(source.contains("main.js?pr1_module=1"));
  }

  #[test]
  fn clears_stale_output_before_building() {
    let fx = fixture();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    fs::create_dir_all(&layout.dist_dir).unwrap();
    fs::write(layout.dist_dir.join("stale.js"), "old").unwrap();

    let tools = Toolchain::new(FakeBundler::emitting("code"));
    PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap();
    assert!(!layout.dist_dir.join("stale.js").exists());
  }

  #[test]
  fn ships_polyfill_after_vendors_when_runtime_helper_is_used() {
    let fx = fixture();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let tools = Toolchain::new(FakeBundler::emitting("regeneratorRuntime.mark(run);"));

    PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap();

    let dist = fx.root.join("dist/src");
    assert!(dist.join("vendor/polyfill.min.js").is_file());
    let html = fs::read_to_string(dist.join("index.html")).unwrap();
    let axios = html.find("<script src=\"./vendor/axios.min.js").unwrap();
    let polyfill = html.find("<script src=\"./vendor/polyfill.min.js").unwrap();
    let main = html.find("<script src=\"main.js").unwrap();
    assert!(axios < polyfill && polyfill < main);
    assert!(html.contains("<link rel=\"preload\" href=\"./vendor/polyfill.min.js"));
  }

  #[test]
  fn links_sibling_stylesheet_once() {
    let fx = fixture();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let bundler = FakeBundler {
      code: "code".into(),
      stylesheet: Some("body{}".into()),
      ..FakeBundler::default()
    };
    let tools = Toolchain::new(bundler);

    PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap();

    let html = fs::read_to_string(fx.root.join("dist/src/index.html")).unwrap();
    let css = content_digest(b"body{}");
    let link = format!("<link rel=\"stylesheet\" href=\"./main.css?_h={css}\">");
    assert_eq!(html.matches(&link).count(), 1);
    assert!(html.find(&link).unwrap() < html.find("</head>").unwrap());
  }

  #[test]
  fn applies_transpiler_then_minifier() {
    let fx = fixture();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let mut tools = Toolchain::new(FakeBundler::emitting("code"));
    tools.transpiler = Some(Box::new(Suffix("+babel")));
    tools.minifier = Some(Box::new(Suffix("+min")));

    PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap();
    let bundle = fs::read_to_string(fx.root.join("dist/src/main.js")).unwrap();
    assert_eq!(bundle, "code+babel+min");
  }

  #[test]
  fn minifier_errors_abort_the_build() {
    let fx = fixture();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let mut tools = Toolchain::new(FakeBundler::emitting("code"));
    tools.minifier = Some(Box::new(FailingMinifier));

    let err = PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap_err();
    assert!(format!("{err:#}").contains("Unexpected token"));
    assert!(!fx.root.join("dist/src/main.js").exists());
  }

  #[test]
  fn missing_marker_aborts_with_assembly_error() {
    let fx = fixture();
    fs::write(
      fx.root.join("src/index.html"),
      "<head></head><script src=\"main.js\"></script>",
    )
    .unwrap();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let tools = Toolchain::new(FakeBundler::emitting("code"));

    let err = PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap_err();
    assert!(matches!(
      err.downcast_ref::<AssemblyError>(),
      Some(AssemblyError::MissingEntryScript { .. })
    ));
    assert!(!fx.root.join("dist/src/index.html").exists());
  }

  #[test]
  fn missing_head_close_fails_before_writing_output() {
    let fx = fixture();
    fs::write(
      fx.root.join("src/index.html"),
      "<body><script src=\"main.js?pr1_module=1\"></script></body>",
    )
    .unwrap();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let bundler = FakeBundler::emitting("code");
    let calls = bundler.calls.clone();
    let tools = Toolchain::new(bundler);

    let err = PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap_err();
    assert_eq!(
      err.downcast_ref::<AssemblyError>(),
      Some(&AssemblyError::MissingHeadClose)
    );
    assert!(calls.borrow().is_empty());
    assert_eq!(fs::read_dir(&layout.dist_dir).unwrap().count(), 0);
  }

  #[test]
  fn root_relative_entry_script_stays_inside_entry_directory() {
    let fx = fixture();
    fs::create_dir_all(fx.root.join("src/js")).unwrap();
    fs::write(fx.root.join("src/js/main.js"), "import Vue from 'vue';").unwrap();
    fs::write(
      fx.root.join("src/index.html"),
      "<head></head><body><script src=\"/js/main.js?pr1_module=1\"></script></body>",
    )
    .unwrap();
    let config = BuildConfig::default();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let bundler = FakeBundler::emitting("bundled");
    let calls = bundler.calls.clone();
    let tools = Toolchain::new(bundler);

    PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap();

    assert_eq!(calls.borrow()[0].input, fx.root.join("src/js/main.js"));
    let dist = fx.root.join("dist/src");
    assert_eq!(fs::read_to_string(dist.join("js/main.js")).unwrap(), "bundled");
    let html = fs::read_to_string(dist.join("index.html")).unwrap();
    let main = content_digest(b"bundled");
    assert!(html.contains(&format!("src=\"/js/main.js?_h={main}\"")), "{html}");
  }

  #[test]
  fn entry_script_outside_entry_directory_is_rejected() {
    let fx = fixture();
    fs::write(
      fx.root.join("src/index.html"),
      "<head></head><script src=\"../main.js?pr1_module=1\"></script>",
    )
    .unwrap();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let bundler = FakeBundler::emitting("code");
    let calls = bundler.calls.clone();
    let tools = Toolchain::new(bundler);

    let err = PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap_err();
    assert!(format!("{err:#}").contains("must stay inside the entry directory"));
    assert!(calls.borrow().is_empty());
    assert_eq!(fs::read_dir(&layout.dist_dir).unwrap().count(), 0);
  }

  #[test]
  fn missing_vendor_file_is_fatal() {
    let fx = fixture();
    let mut config = config();
    config.vendor.push(VendorEntry::new("lodash/lodash.min.js"));
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let tools = Toolchain::new(FakeBundler::emitting("code"));

    let err = PageBuilder::new(&config, &layout, &tools)
      .build(&["src/index.html"])
      .unwrap_err();
    assert!(format!("{err:#}").contains("lodash.min.js"));
  }

  #[test]
  fn bundles_script_entries_as_named_modules_and_runs_hooks() {
    let fx = fixture();
    let config = config();
    let layout = ProjectLayout::resolve(&fx.root, &config, None);
    let bundler = FakeBundler::emitting("var pr1 = {};");
    let calls = bundler.calls.clone();
    let before = RecordingHook::default();
    let after = RecordingHook::default();
    let mut tools = Toolchain::new(bundler);
    tools.before_build = Some(Box::new(before.clone()));
    tools.after_build = Some(Box::new(after.clone()));

    PageBuilder::new(&config, &layout, &tools)
      .build(&["src/main.js"])
      .unwrap();

    assert_eq!(calls.borrow()[0].name.as_deref(), Some("pr1.modules.main_js"));
    assert_eq!(*before.0.borrow(), vec![fx.root.join("src/main.js")]);
    assert_eq!(*after.0.borrow(), vec![fx.root.join("dist/src/main.js")]);
    assert_eq!(
      fs::read_to_string(fx.root.join("dist/src/main.js")).unwrap(),
      "var pr1 = {};"
    );
  }

  #[test]
  fn copy_path_mirrors_directory_trees() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("static");
    fs::create_dir_all(source.join("fonts")).unwrap();
    fs::write(source.join("fonts/a.woff"), "a").unwrap();
    fs::write(source.join("robots.txt"), "r").unwrap();

    let destination = dir.path().join("out/static");
    copy_path(&source, &destination).unwrap();
    assert_eq!(fs::read_to_string(destination.join("fonts/a.woff")).unwrap(), "a");
    assert_eq!(fs::read_to_string(destination.join("robots.txt")).unwrap(), "r");
  }

  #[test]
  fn install_file_skips_copying_onto_itself() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("same.txt");
    fs::write(&file, "content").unwrap();
    install_file(&file, &file).unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "content");
  }

  #[test]
  fn normalises_entry_script_paths() {
    assert_eq!(bundle_relative_path("/js/main.js").unwrap(), PathBuf::from("js/main.js"));
    assert_eq!(bundle_relative_path("./main.js").unwrap(), PathBuf::from("./main.js"));
    assert!(bundle_relative_path("js/../../main.js").is_err());
    assert!(bundle_relative_path("/").is_err());
  }

  #[test]
  fn derives_module_global_names() {
    assert_eq!(
      module_global_name("pr1.modules", Path::new("/app/widgets/chart.v2.js")),
      "pr1.modules.chart_v2_js"
    );
  }
}
