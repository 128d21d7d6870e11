//! Configuration loading and typed config structures for nufatx.
//!
//! Configuration is read from a YAML file whose structure mirrors
//! [`FatxConfig`]. Every field has a default, so an empty file (or no file)
//! is a valid configuration.

use std::path::Path;

use serde::Deserialize;

use nufatx_types::UnitSystem;

/// Environment variable overriding `accumulator.convention_override`.
pub const ENV_CONVENTION: &str = "NUFATX_CONVENTION";

/// Environment variable overriding `accumulator.cv_weight_name`.
pub const ENV_CV_WEIGHT: &str = "NUFATX_CV_WEIGHT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FatxConfig {
    /// Strategy selection and accumulation parameters.
    #[serde(default)]
    pub accumulator: AccumulatorConfig,

    /// Which units the report is produced in.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FatxConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `NUFATX_CONVENTION` overrides `accumulator.convention_override`
    /// - `NUFATX_CV_WEIGHT` overrides `accumulator.cv_weight_name`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.accumulator.apply_env_overrides();
        Ok(config)
    }
}

/// Strategy selection and accumulation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccumulatorConfig {
    /// Strategy name used instead of detecting one from the run's
    /// conventions (`G.C.5`, `E.C.4`, `E.C.2` or `Dummy`).
    #[serde(default)]
    pub convention_override: Option<String>,

    /// Name of the central-value weight stream.
    #[serde(default = "default_cv_weight_name")]
    pub cv_weight_name: String,

    /// Relative tolerance for the target-ledger balance check.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: f64,
}

impl AccumulatorConfig {
    /// Override fields from the process environment when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override fields from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_CONVENTION) {
            self.convention_override = Some(val);
        }
        if let Some(val) = lookup(ENV_CV_WEIGHT) {
            self.cv_weight_name = val;
        }
    }
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            convention_override: None,
            cv_weight_name: default_cv_weight_name(),
            balance_tolerance: default_balance_tolerance(),
        }
    }
}

/// A requested output unit, as declared strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnitSpec {
    /// Scale string, e.g. `pb` or `1e-38 cm2`.
    pub scale: String,
    /// Target-scale string, e.g. `PerTargetAtom` or `PerTargetNucleon`.
    pub target_norm: String,
}

impl UnitSpec {
    /// Create a spec from its two strings.
    pub fn new(scale: &str, target_norm: &str) -> Self {
        Self {
            scale: scale.to_owned(),
            target_norm: target_norm.to_owned(),
        }
    }

    /// The parsed unit system. Unknown strings become `Custom`, which the
    /// accumulator reports as an invalid request.
    pub fn unit_system(&self) -> UnitSystem {
        UnitSystem::from_declared(&self.scale, &self.target_norm)
    }
}

/// Report output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Units in which to report the estimate, in order.
    #[serde(default = "default_output_units")]
    pub units: Vec<UnitSpec>,
}

impl OutputConfig {
    /// The configured units, parsed.
    pub fn unit_systems(&self) -> Vec<UnitSystem> {
        self.units.iter().map(UnitSpec::unit_system).collect()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            units: default_output_units(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log progress every N processed events.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            progress_interval: default_progress_interval(),
        }
    }
}

fn default_cv_weight_name() -> String {
    "CV".to_owned()
}

const fn default_balance_tolerance() -> f64 {
    1e-9
}

fn default_output_units() -> Vec<UnitSpec> {
    vec![
        UnitSpec::new("pb", "PerTargetAtom"),
        UnitSpec::new("1e-38 cm2", "PerTargetNucleon"),
    ]
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_progress_interval() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FatxConfig::default();
        assert_eq!(config.accumulator.cv_weight_name, "CV");
        assert_eq!(config.accumulator.convention_override, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.progress_interval, 10_000);
        assert_eq!(
            config.output.unit_systems(),
            vec![UnitSystem::PB_PER_TARGET, UnitSystem::CM2E38_PER_NUCLEON]
        );
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
accumulator:
  convention_override: "E.C.2"
  cv_weight_name: "nominal"
  balance_tolerance: 1.0e-6

output:
  units:
    - scale: "nb"
      target_norm: "PerTargetAtom"
    - scale: "cm2"
      target_norm: "PerTargetNucleon"

logging:
  level: "debug"
  progress_interval: 500
"#;
        let config = FatxConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.accumulator.cv_weight_name, "nominal");
        assert!((config.accumulator.balance_tolerance - 1.0e-6).abs() < 1e-18);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.progress_interval, 500);
        assert_eq!(
            config.output.unit_systems(),
            vec![UnitSystem::NB_PER_TARGET, UnitSystem::CM2_PER_NUCLEON]
        );
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = FatxConfig::parse("logging:\n  level: warn\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.progress_interval, 10_000);
        assert_eq!(config.output.units.len(), 2);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(FatxConfig::parse("").is_ok());
    }

    #[test]
    fn parse_invalid_yaml_is_error() {
        let config = FatxConfig::parse("accumulator: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let config = FatxConfig::from_file(Path::new("/nonexistent/nufatx.yaml"));
        assert!(matches!(config, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn overrides_replace_values() {
        let mut config = AccumulatorConfig::default();
        config.apply_overrides_from(|key| match key {
            ENV_CONVENTION => Some("Dummy".to_owned()),
            ENV_CV_WEIGHT => Some("alt".to_owned()),
            _ => None,
        });
        assert_eq!(config.convention_override.as_deref(), Some("Dummy"));
        assert_eq!(config.cv_weight_name, "alt");
    }

    #[test]
    fn unknown_unit_strings_parse_to_custom() {
        let spec = UnitSpec::new("mb", "PerTargetMolecule");
        assert!(spec.unit_system().is_custom());
    }
}
