//! Collaborators backed by external processes.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use serde_json::Value;

use crate::tools::{BuildHook, BundleRequest, Bundler, Minifier, Transpiler};

/// Bundler that runs a command template and captures the bundle from stdout.
///
/// Placeholders: `{input}`, `{output}`, `{format}`, `{name}`, `{externals}` (comma
/// separated ids), `{globals}` (comma separated `id:Global` pairs) and `{plugins}`
/// (comma separated).
#[derive(Debug, Clone)]
pub struct CommandBundler {
  template: Vec<String>,
}

impl CommandBundler {
  /// Bundler for the given command template.
  pub fn new(template: Vec<String>) -> Self {
    Self { template }
  }
}

impl Bundler for CommandBundler {
  fn bundle(&self, request: &BundleRequest<'_>) -> Result<String> {
    let globals = request
      .globals
      .iter()
      .map(|(id, global)| format!("{id}:{global}"))
      .collect::<Vec<_>>()
      .join(",");
    let vars = [
      ("input", request.input.display().to_string()),
      ("output", request.output.display().to_string()),
      ("format", request.format.to_string()),
      ("name", request.name.unwrap_or_default().to_string()),
      ("externals", request.externals.join(",")),
      ("globals", globals),
      ("plugins", request.plugins.join(",")),
    ];
    let args = expand_args(&self.template, &vars);
    run_command(&args, None)
      .with_context(|| format!("failed to bundle {}", request.input.display()))
  }
}

/// Transpiler or minifier that pipes code through a command's stdin and stdout.
///
/// `{options}` expands to the configured options serialised as JSON.
#[derive(Debug, Clone)]
pub struct CommandTool {
  template: Vec<String>,
}

impl CommandTool {
  /// Tool for the given command template.
  pub fn new(template: Vec<String>) -> Self {
    Self { template }
  }

  fn pipe(&self, code: &str, options: &Value) -> Result<String> {
    let options = if options.is_null() {
      String::new()
    } else {
      serde_json::to_string(options)?
    };
    let args = expand_args(&self.template, &[("options", options)]);
    run_command(&args, Some(code))
  }
}

impl Transpiler for CommandTool {
  fn transform(&self, code: &str, options: &Value) -> Result<String> {
    self.pipe(code, options).context("transpiler failed")
  }
}

impl Minifier for CommandTool {
  fn minify(&self, code: &str, options: &Value) -> Result<String> {
    self.pipe(code, options).context("minifier failed")
  }
}

/// Hook that runs a command with the entry path appended as its last argument.
#[derive(Debug, Clone)]
pub struct CommandHook {
  command: Vec<String>,
}

impl CommandHook {
  /// Hook for the given command.
  pub fn new(command: Vec<String>) -> Self {
    Self { command }
  }
}

impl BuildHook for CommandHook {
  fn run(&self, path: &Path) -> Result<()> {
    let mut args = self.command.clone();
    args.push(path.display().to_string());
    run_command(&args, None)
      .map(|_| ())
      .with_context(|| format!("hook failed for {}", path.display()))
  }
}

/// Substitute `{key}` placeholders in a command template.
///
/// An argument whose placeholders expand to nothing is dropped, together with the flag
/// directly before it, so optional values like `--name {name}` disappear cleanly.
pub fn expand_args(template: &[String], vars: &[(&str, String)]) -> Vec<String> {
  let mut args: Vec<String> = Vec::with_capacity(template.len());

  for arg in template {
    let mut expanded = arg.clone();
    let mut substituted = false;
    for (key, value) in vars {
      let placeholder = format!("{{{key}}}");
      if expanded.contains(&placeholder) {
        expanded = expanded.replace(&placeholder, value);
        substituted = true;
      }
    }

    if substituted && expanded.is_empty() {
      if args.last().is_some_and(|prev| prev.starts_with('-')) {
        args.pop();
      }
      continue;
    }
    args.push(expanded);
  }

  args
}

fn run_command(args: &[String], stdin: Option<&str>) -> Result<String> {
  let (program, rest) = args
    .split_first()
    .ok_or_else(|| anyhow!("empty command"))?;
  debug!("running {}", args.join(" "));

  let mut child = Command::new(program)
    .args(rest)
    .stdin(if stdin.is_some() {
      Stdio::piped()
    } else {
      Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .with_context(|| format!("failed to run `{program}`"))?;

  let writer = match (stdin, child.stdin.take()) {
    (Some(input), Some(mut pipe)) => {
      let input = input.to_owned();
      Some(thread::spawn(move || pipe.write_all(input.as_bytes())))
    }
    _ => None,
  };

  let output = child
    .wait_with_output()
    .with_context(|| format!("failed to wait for `{program}`"))?;

  if !output.status.success() {
    bail!(
      "`{program}` failed with status {}: {}",
      output.status,
      String::from_utf8_lossy(&output.stderr).trim()
    );
  }

  if let Some(writer) = writer {
    writer
      .join()
      .map_err(|_| anyhow!("stdin writer for `{program}` panicked"))?
      .with_context(|| format!("failed to write stdin of `{program}`"))?;
  }

  String::from_utf8(output.stdout).with_context(|| format!("`{program}` wrote non UTF-8 output"))
}
