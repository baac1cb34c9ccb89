//! Option file loading
//!
//! Loads `GenerationOptions` from a TOML file, applies CLI overrides, and
//! validates the merged result.

use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::GenerationOptions;

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("failed to read options: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("options validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override option values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override DPI
    pub dpi: Option<u32>,
    /// Force transparent backgrounds
    pub transparent: Option<bool>,
    /// Override the accent seed
    pub seed: Option<u64>,
}

/// Load options from a TOML file and validate them.
pub fn load_options(path: &Path) -> Result<GenerationOptions, ConfigError> {
    let content = fs::read_to_string(path)?;
    let options: GenerationOptions = toml::from_str(&content)?;
    finish(options, &CliOverrides::default())
}

/// Load options from a TOML file, apply overrides, and validate.
pub fn load_options_with(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<GenerationOptions, ConfigError> {
    let options = match path {
        Some(p) => {
            let content = fs::read_to_string(p)?;
            toml::from_str(&content)?
        }
        None => GenerationOptions::default(),
    };
    finish(options, overrides)
}

fn finish(
    mut options: GenerationOptions,
    overrides: &CliOverrides,
) -> Result<GenerationOptions, ConfigError> {
    if let Some(dpi) = overrides.dpi {
        options.dpi = dpi;
    }
    if let Some(transparent) = overrides.transparent {
        options.transparent_background = transparent;
    }
    if let Some(seed) = overrides.seed {
        options.accents.seed = Some(seed);
    }
    let errors = options.validate();
    if errors.is_empty() {
        Ok(options)
    } else {
        Err(ConfigError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "dpi = 600").unwrap();
        drop(f);

        let plain = load_options(&path).unwrap();
        assert_eq!(plain.dpi, 600);

        let overrides =
            CliOverrides { dpi: Some(72), transparent: Some(true), seed: Some(5) };
        let merged = load_options_with(Some(&path), &overrides).unwrap();
        assert_eq!(merged.dpi, 72);
        assert!(merged.transparent_background);
        assert_eq!(merged.accents.seed, Some(5));
    }

    #[test]
    fn test_defaults_without_file() {
        let options = load_options_with(None, &CliOverrides::default()).unwrap();
        assert_eq!(options.dpi, 300);
    }

    #[test]
    fn test_validation_failure_reported() {
        let overrides = CliOverrides { dpi: Some(0), ..Default::default() };
        let err = load_options_with(None, &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
