use std::env;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Parser;
use log::{error, warn};

use pagepack::cli::{Invocation, unquote};
use pagepack::{BuildConfig, PageBuilder, ProjectLayout, Toolchain};

/// Bundle single-page applications: `pagepack index.html build --config=pagepack.json`.
#[derive(Debug, Parser)]
#[command(name = "pagepack", version, about)]
struct Args {
  /// Entry files (`.html` or `.js`), the `build` keyword and an optional port, in any order.
  #[arg(value_name = "ARGS")]
  inputs: Vec<String>,
  /// JSON or YAML build configuration. Defaults to `.pagepack.json` in the app root.
  #[arg(long)]
  config: Option<String>,
}

fn init_logger() {
  env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("info"))
    .format_timestamp(None)
    .init();
}

fn run(args: Args) -> Result<()> {
  let invocation = Invocation::classify(&args.inputs)?;
  for ignored in &invocation.ignored {
    warn!("ignoring unrecognised argument `{ignored}`");
  }

  if !invocation.build {
    bail!(
      "the dev server is not available; pass `build` to compile (requested port {})",
      invocation.port
    );
  }
  if invocation.entries.is_empty() {
    bail!("no entry file given; pass an `.html` or `.js` path");
  }

  let cwd = env::current_dir()?;
  let explicit = args.config.as_deref().map(|path| Path::new(unquote(path)));
  let (config, config_path) = BuildConfig::load(&cwd, explicit)?;
  let layout = ProjectLayout::resolve(&cwd, &config, config_path.as_deref());
  let tools = Toolchain::from_config(&config);

  PageBuilder::new(&config, &layout, &tools).build(invocation.entries.as_slice())?;
  Ok(())
}

fn main() -> ExitCode {
  init_logger();

  match run(Args::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      error!("{err:#}");
      ExitCode::FAILURE
    }
  }
}
