//! Classification of the loosely ordered command-line arguments.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Port used when none is given on the command line.
pub const DEFAULT_PORT: u16 = 8686;

/// What the user asked for, independent of argument order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  /// Entry documents or scripts to compile.
  pub entries: Vec<PathBuf>,
  /// Whether the `build` keyword was given.
  pub build: bool,
  /// Port requested for serving.
  pub port: u16,
  /// Arguments that matched no known shape.
  pub ignored: Vec<String>,
}

impl Invocation {
  /// Classify positional arguments: `*.html`/`*.js` entries, `build`, and an all-digit port.
  pub fn classify<I, S>(args: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut invocation = Self {
      entries: Vec::new(),
      build: false,
      port: DEFAULT_PORT,
      ignored: Vec::new(),
    };

    for arg in args {
      let arg = arg.as_ref();
      if arg.ends_with(".html") || arg.ends_with(".js") {
        invocation.entries.push(PathBuf::from(arg));
      } else if arg == "build" {
        invocation.build = true;
      } else if !arg.is_empty() && arg.bytes().all(|byte| byte.is_ascii_digit()) {
        invocation.port = arg
          .parse()
          .with_context(|| format!("invalid port `{arg}`"))?;
      } else {
        invocation.ignored.push(arg.to_string());
      }
    }

    Ok(invocation)
  }
}

/// Strip one pair of matching quotes around a `--config` value.
pub fn unquote(value: &str) -> &str {
  for quote in ['"', '\''] {
    if let Some(inner) = value
      .strip_prefix(quote)
      .and_then(|rest| rest.strip_suffix(quote))
    {
      return inner;
    }
  }
  value
}
