//! Configuration for the terrain engine.
//!
//! Runtime-configurable settings that persist to disk as RON files, with
//! CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CameraConfig, Config, DebugConfig, LoopConfig, PlanetConfig};
pub use error::ConfigError;
