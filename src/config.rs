//! Compiler configuration.
//!
//! Loaded from YAML. Every field has a default so a config file only needs to
//! name what it overrides.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV_VAR: &str = "UTILC_CONFIG";

/// Default prefix of the native action names rows point at.
pub const DEFAULT_ACTION_PREFIX: &str = "Wix4";

/// Target architecture of the package being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    X86,
    X64,
    Arm,
    Arm64,
}

impl Platform {
    /// Suffix of the native action variant built for this platform.
    pub fn action_suffix(&self) -> &'static str {
        match self {
            Platform::X86 => "_X86",
            Platform::X64 => "_X64",
            Platform::Arm => "_ARM",
            Platform::Arm64 => "_A64",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::X86 => "x86",
            Platform::X64 => "x64",
            Platform::Arm => "arm",
            Platform::Arm64 => "arm64",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "intel" => Ok(Platform::X86),
            "x64" | "amd64" => Ok(Platform::X64),
            "arm" => Ok(Platform::Arm),
            "arm64" | "a64" => Ok(Platform::Arm64),
            other => bail!("unknown platform '{}'", other),
        }
    }
}

/// Configuration for the unit compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Platform the package targets.
    pub platform: Platform,
    /// Prefix of native action names.
    pub action_prefix: String,
    /// Whether search variables may shadow built-in bundle variables.
    pub allow_builtin_variables: bool,
    /// Promote warnings to errors.
    pub warnings_as_errors: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            platform: Platform::X86,
            action_prefix: DEFAULT_ACTION_PREFIX.to_string(),
            allow_builtin_variables: false,
            warnings_as_errors: false,
        }
    }
}

impl CompilerConfig {
    /// Default config for a given platform.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            ..Default::default()
        }
    }

    /// Strict config: warnings fail the unit.
    pub fn strict() -> Self {
        Self {
            warnings_as_errors: true,
            ..Default::default()
        }
    }

    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading compiler configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: CompilerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `UTILC_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        let prefix_ok = self
            .action_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !prefix_ok {
            bail!(
                "action_prefix '{}' must contain only letters, digits and underscores",
                self.action_prefix
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.platform, Platform::X86);
        assert_eq!(config.action_prefix, "Wix4");
        assert!(!config.allow_builtin_variables);
        assert!(!config.warnings_as_errors);
    }

    #[test]
    fn strict_config() {
        assert!(CompilerConfig::strict().warnings_as_errors);
        assert_eq!(
            CompilerConfig::for_platform(Platform::Arm64).platform,
            Platform::Arm64
        );
    }

    #[test]
    fn platform_parsing() {
        assert_eq!("X64".parse::<Platform>().unwrap(), Platform::X64);
        assert_eq!("arm64".parse::<Platform>().unwrap(), Platform::Arm64);
        assert!("sparc".parse::<Platform>().is_err());
        assert_eq!(Platform::Arm64.action_suffix(), "_A64");
    }

    #[test]
    fn load_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "platform: x64\nwarnings_as_errors: true").unwrap();

        let config = CompilerConfig::load(file.path()).unwrap();
        assert_eq!(config.platform, Platform::X64);
        assert!(config.warnings_as_errors);
        assert_eq!(config.action_prefix, DEFAULT_ACTION_PREFIX);
    }

    #[test]
    fn from_env_reads_the_named_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "platform: arm64").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, file.path());
        let config = CompilerConfig::from_env().unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);
        assert_eq!(config.platform, Platform::Arm64);

        let config = CompilerConfig::from_env().unwrap();
        assert_eq!(config.platform, Platform::X86);
    }

    #[test]
    fn load_rejects_bad_prefix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "action_prefix: \"Wix 4\"").unwrap();

        let err = CompilerConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("action_prefix"));
    }

    #[test]
    fn load_missing_file_has_context() {
        let err = CompilerConfig::load("/nonexistent/utilc.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
