//! Configuration settings for the rolling-balls restorer

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Knobs understood by the restorer, with their defaults
pub const KNOWN_KNOBS: &[(&str, i64)] = &[("return_empty", 0)];

/// Deepest search bound accepted for a generation
pub const MAX_DEPTH: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub search: SearchConfig,
    #[serde(default = "default_knobs")]
    pub knobs: BTreeMap<String, i64>,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub time_limit_seconds: f64,
    pub moves_per_ball: usize,
    pub basin_trials: usize,
    pub basin_seed: u64,
    pub generations: Vec<GenerationConfig>,
}

/// One pass of the scheduler over the uncommitted targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub relaxation: Relaxation,
    pub depth: usize,
}

/// What a target cell accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relaxation {
    /// A ball of the target colour
    Exact,
    /// Any ball
    AnyBall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub start_file: PathBuf,
    pub target_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

fn default_knobs() -> BTreeMap<String, i64> {
    KNOWN_KNOBS
        .iter()
        .map(|&(name, value)| (name.to_string(), value))
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                time_limit_seconds: 9.0,
                moves_per_ball: 20,
                basin_trials: 10,
                basin_seed: 42,
                generations: vec![
                    GenerationConfig { relaxation: Relaxation::Exact, depth: 6 },
                    GenerationConfig { relaxation: Relaxation::Exact, depth: 5 },
                    GenerationConfig { relaxation: Relaxation::AnyBall, depth: 6 },
                ],
            },
            knobs: default_knobs(),
            input: InputConfig {
                start_file: PathBuf::from("input/problems/start.txt"),
                target_file: PathBuf::from("input/problems/target.txt"),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_file: None,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !(self.search.time_limit_seconds > 0.0) {
            anyhow::bail!("Time limit must be positive, got {}", self.search.time_limit_seconds);
        }

        if self.search.moves_per_ball == 0 {
            anyhow::bail!("Moves per ball must be positive");
        }

        if self.search.basin_trials == 0 {
            anyhow::bail!("Basin trials must be positive");
        }

        if self.search.generations.is_empty() {
            anyhow::bail!("At least one generation is required");
        }

        for (i, generation) in self.search.generations.iter().enumerate() {
            if generation.depth == 0 || generation.depth > MAX_DEPTH {
                anyhow::bail!(
                    "Generation {} has depth {}, expected 1..={}",
                    i,
                    generation.depth,
                    MAX_DEPTH
                );
            }
        }

        for name in self.knobs.keys() {
            if !is_known_knob(name) {
                anyhow::bail!("Unknown knob: {}", name);
            }
        }

        Ok(())
    }

    /// Value of a knob, falling back to its default
    pub fn knob(&self, name: &str) -> i64 {
        self.knobs.get(name).copied().unwrap_or_else(|| {
            KNOWN_KNOBS
                .iter()
                .find(|(known, _)| *known == name)
                .map_or(0, |&(_, value)| value)
        })
    }

    /// Override a knob from a `name=value` string
    pub fn apply_knob_override(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = assignment
            .split_once('=')
            .with_context(|| format!("Knob override must look like name=value: {}", assignment))?;
        let name = name.trim();
        if !is_known_knob(name) {
            anyhow::bail!("Unknown knob: {}", name);
        }
        let value: i64 = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for knob {}: {}", name, value))?;
        self.knobs.insert(name.to_string(), value);
        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) -> Result<()> {
        if let Some(time_limit) = cli_overrides.time_limit {
            self.search.time_limit_seconds = time_limit;
        }
        if let Some(ref start_file) = cli_overrides.start_file {
            self.input.start_file = start_file.clone();
        }
        if let Some(ref target_file) = cli_overrides.target_file {
            self.input.target_file = target_file.clone();
        }
        if let Some(ref output_file) = cli_overrides.output_file {
            self.output.output_file = Some(output_file.clone());
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        for assignment in &cli_overrides.knobs {
            self.apply_knob_override(assignment)?;
        }
        Ok(())
    }
}

fn is_known_knob(name: &str) -> bool {
    KNOWN_KNOBS.iter().any(|(known, _)| *known == name)
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub time_limit: Option<f64>,
    pub start_file: Option<PathBuf>,
    pub target_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub knobs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.search.generations.len(), 3);
        assert_eq!(settings.search.generations[2].relaxation, Relaxation::AnyBall);
        assert_eq!(settings.knob("return_empty"), 0);
    }

    #[test]
    fn test_round_trip_through_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config/default.yaml");

        let mut settings = Settings::default();
        settings.search.time_limit_seconds = 2.5;
        settings.output.format = OutputFormat::Json;
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.search.time_limit_seconds, 2.5);
        assert_eq!(loaded.output.format, OutputFormat::Json);
        assert_eq!(loaded.search.generations, settings.search.generations);
    }

    #[test]
    fn test_missing_knobs_section_uses_defaults() {
        let yaml = r#"
search:
  time_limit_seconds: 1.0
  moves_per_ball: 20
  basin_trials: 10
  basin_seed: 42
  generations:
    - relaxation: exact
      depth: 4
    - relaxation: any_ball
      depth: 3
input:
  start_file: start.txt
  target_file: target.txt
output:
  format: text
  output_file: null
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.knob("return_empty"), 0);
        assert_eq!(settings.search.generations[1].relaxation, Relaxation::AnyBall);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.search.time_limit_seconds = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.search.generations[0].depth = MAX_DEPTH + 1;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.search.generations.clear();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.knobs.insert("turbo".to_string(), 1);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = Settings::default();
        let overrides = CliOverrides {
            time_limit: Some(3.0),
            target_file: Some(PathBuf::from("t.txt")),
            knobs: vec!["return_empty=1".to_string()],
            ..Default::default()
        };
        settings.merge_with_cli(&overrides).unwrap();
        assert_eq!(settings.search.time_limit_seconds, 3.0);
        assert_eq!(settings.input.target_file, PathBuf::from("t.txt"));
        assert_eq!(settings.knob("return_empty"), 1);
    }

    #[test]
    fn test_unknown_knob_override_fails() {
        let mut settings = Settings::default();
        assert!(settings.apply_knob_override("unknown=1").is_err());
        assert!(settings.apply_knob_override("return_empty").is_err());
        assert!(settings.apply_knob_override("return_empty=yes").is_err());
    }
}
