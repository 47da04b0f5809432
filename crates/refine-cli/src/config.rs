//! Layered configuration for the `refine` command.
//!
//! Values are resolved with increasing precedence: built-in defaults, the optional TOML
//! file, `--set KEY=VALUE` overrides and finally the dedicated command-line flags. The
//! merged values are validated by the core `RefinementConfigBuilder`.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_config, load_weights};
pub use models::AppConfig;
