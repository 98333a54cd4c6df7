//! Group configuration and group identity.
//!
//! [`GroupConfig`] is plain data: every field has a default, so partial
//! TOML or JSON documents load fine.
//!
//! ```toml
//! group_id = "editor"
//! orientation = "vertical"
//! autosave = "localStorage"
//!
//! [drag]
//! keyboard_step = 2
//! shift_multiplier = 10
//! ```

use std::fmt;
use std::path::Path;

use panegroup_core::Decimal;
use panegroup_layout::{AutosaveStrategy, Orientation};
use serde::{Deserialize, Serialize};

use crate::drag::DragSettings;

/// Settings a [`crate::GroupMachine`] is built from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Stable id; generated when absent.
    pub group_id: Option<String>,
    pub orientation: Orientation,
    /// Where autosaved snapshots go. `None` disables autosave.
    pub autosave: Option<AutosaveStrategy>,
    pub drag: DragSettings,
}

impl GroupConfig {
    /// Load from a TOML string.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Problems with this config. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.group_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            errors.push("group_id must not be empty when set".into());
        }
        if self.drag.keyboard_step <= Decimal::ZERO {
            errors.push(format!(
                "drag.keyboard_step must be > 0, got {}",
                self.drag.keyboard_step
            ));
        }
        if self.drag.shift_multiplier < Decimal::ONE {
            errors.push(format!(
                "drag.shift_multiplier must be >= 1, got {}",
                self.drag.shift_multiplier
            ));
        }

        errors
    }

    /// `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_autosave(mut self, strategy: AutosaveStrategy) -> Self {
        self.autosave = Some(strategy);
        self
    }
}

/// Errors that can occur when loading a [`GroupConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    #[cfg(feature = "toml-config")]
    Toml(toml::de::Error),
    Json(serde_json::Error),
    /// Validation problems, one message each.
    Invalid(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "toml-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Invalid(errors) => write!(f, "invalid group config: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "toml-config")]
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Group ids
// ---------------------------------------------------------------------------

/// Source of ids for groups configured without one.
pub trait GroupIdGenerator {
    fn next_id(&mut self) -> String;
}

/// `"{prefix}{n}"` with `n` counting up from zero, per generator instance.
#[derive(Debug, Clone)]
pub struct SequentialGroupIds {
    prefix: String,
    next: u64,
}

impl SequentialGroupIds {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialGroupIds {
    fn default() -> Self {
        Self::new("panel-group-")
    }
}

impl GroupIdGenerator for SequentialGroupIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

impl<F: FnMut() -> String> GroupIdGenerator for F {
    fn next_id(&mut self) -> String {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_documents_give_defaults() {
        assert_eq!(
            GroupConfig::from_json_str("{}").expect("json"),
            GroupConfig::default()
        );
        #[cfg(feature = "toml-config")]
        assert_eq!(
            GroupConfig::from_toml_str("").expect("toml"),
            GroupConfig::default()
        );
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn toml_overrides_fields() {
        let config = GroupConfig::from_toml_str(
            r#"
            group_id = "editor"
            orientation = "vertical"
            autosave = "cookie"

            [drag]
            keyboard_step = 2
            "#,
        )
        .expect("toml");
        assert_eq!(config.group_id.as_deref(), Some("editor"));
        assert_eq!(config.orientation, Orientation::Vertical);
        assert_eq!(config.autosave, Some(AutosaveStrategy::Cookie));
        assert_eq!(config.drag.keyboard_step, Decimal::from(2));
        assert_eq!(config.drag.shift_multiplier, Decimal::from(15));
    }

    #[test]
    fn json_file_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("group.json");
        std::fs::write(&path, r#"{"autosave": "localStorage"}"#).expect("write");
        let config = GroupConfig::from_json_file(&path).expect("load");
        assert_eq!(config.autosave, Some(AutosaveStrategy::LocalStorage));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GroupConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut config = GroupConfig::default().with_group_id(" ");
        config.drag.keyboard_step = Decimal::ZERO;
        config.drag.shift_multiplier = Decimal::ZERO;
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Invalid(list)) if list.len() == 3
        ));
        assert!(GroupConfig::default().validate().is_empty());
    }

    #[test]
    fn sequential_ids_are_per_instance() {
        let mut first = SequentialGroupIds::default();
        let mut second = SequentialGroupIds::new("g");
        assert_eq!(first.next_id(), "panel-group-0");
        assert_eq!(first.next_id(), "panel-group-1");
        assert_eq!(second.next_id(), "g0");
    }
}
