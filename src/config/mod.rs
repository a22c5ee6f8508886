//! Configuration management for the rolling-balls restorer

pub mod settings;

pub use settings::{
    CliOverrides, GenerationConfig, InputConfig, OutputConfig, OutputFormat, Relaxation,
    SearchConfig, Settings, KNOWN_KNOBS, MAX_DEPTH,
};
