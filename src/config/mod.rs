//! Client configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Config file (TOML, `--config` or `$HOLLOMAN_CONFIG`)
//! 3. Environment (`HOLLOMAN_*`)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{BuiltinDefaults, ClientConfig};
pub use effective::{env_layer, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, CONFIG_PATH_ENV};
pub use merge::{deep_merge, merge_layers};
