// Codec configuration
//
// Settings shared by the encoder and decoder, loadable from a TOML file with
// a `[codec]` table.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use courier_error::{ensure, ConfigError, ConfigResult};

/// Default nesting limit for encoded and decoded graphs
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Encoder and decoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Emit indented JSON instead of a single line
    pub pretty: bool,
    /// Deepest nesting level accepted below the root object
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    codec: CodecConfig,
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the `[codec]` table of a TOML document; absent keys keep their defaults
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        file.codec.validate()?;
        Ok(file.codec)
    }

    /// Read and parse a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded codec configuration");
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        ensure!(
            self.max_depth > 0,
            ConfigError::invalid("codec.max_depth", "must be at least 1")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert!(!config.pretty);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_table() {
        let config = CodecConfig::from_toml_str("[codec]\npretty = true\n").unwrap();
        assert!(config.pretty);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);

        let empty = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(empty, CodecConfig::default());
    }

    #[test]
    fn test_rejects_zero_depth_and_bad_types() {
        let err = CodecConfig::from_toml_str("[codec]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = CodecConfig::from_toml_str("[codec]\npretty = \"yes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[codec]\nmax_depth = 8").unwrap();

        let config = CodecConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_depth, 8);

        let missing = CodecConfig::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
