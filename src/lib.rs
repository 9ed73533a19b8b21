#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod html;
pub mod models;
pub mod project;
pub mod tools;

pub use builder::PageBuilder;
pub use config::BuildConfig;
pub use error::{AssemblyError, ConfigError};
pub use project::ProjectLayout;
pub use tools::Toolchain;
