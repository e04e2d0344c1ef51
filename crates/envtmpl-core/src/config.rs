//! Render configuration.
//!
//! Stored as JSON. Every field has a default, so `{}` is a valid file and an
//! absent config file is simply `RenderConfig::default()`. The file is only
//! ever read from a path the caller names; nothing is searched for.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemplateError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Template name used in diagnostics (`template: <name>:<line>: ...`).
    pub name: String,
    pub left_delim: String,
    pub right_delim: String,
    /// Make `required` fail on an unset variable instead of rendering `""`.
    pub strict_required: bool,
}

impl RenderConfig {
    pub const DEFAULT_NAME: &'static str = "file";
    pub const DEFAULT_LEFT_DELIM: &'static str = "{{";
    pub const DEFAULT_RIGHT_DELIM: &'static str = "}}";

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| TemplateError::ConfigNotFound {
                path: path.to_path_buf(),
                source,
            })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| TemplateError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.left_delim.is_empty() || self.right_delim.is_empty() {
            return Err(TemplateError::InvalidConfig(
                "delimiters must not be empty".into(),
            ));
        }
        if self.left_delim.chars().any(char::is_whitespace)
            || self.right_delim.chars().any(char::is_whitespace)
        {
            return Err(TemplateError::InvalidConfig(
                "delimiters must not contain whitespace".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.into(),
            left_delim: Self::DEFAULT_LEFT_DELIM.into(),
            right_delim: Self::DEFAULT_RIGHT_DELIM.into(),
            strict_required: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.name, "file");
        assert_eq!(config.left_delim, "{{");
        assert_eq!(config.right_delim, "}}");
        assert!(!config.strict_required);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{"strict_required": true}"#).unwrap();
        assert!(config.strict_required);
        assert_eq!(config.name, "file");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("envtmpl.json");
        let config = RenderConfig {
            name: "app.conf".into(),
            left_delim: "<%".into(),
            right_delim: "%>".into(),
            strict_required: true,
        };
        config.save(&path).unwrap();
        assert_eq!(RenderConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RenderConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, TemplateError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            RenderConfig::load(&path),
            Err(TemplateError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_delims() {
        let config = RenderConfig {
            left_delim: String::new(),
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TemplateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_whitespace_delims() {
        let config = RenderConfig {
            right_delim: "} }".into(),
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
