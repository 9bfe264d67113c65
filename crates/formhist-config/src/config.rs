//! Application configuration: load, save and sanitize.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use formhist_history::{FieldKind, FieldSpec, FormSchema, HistoryConfig};
use serde::{Deserialize, Serialize};

/// File name used when no explicit path is configured.
pub const CONFIG_FILE_NAME: &str = "formhist.json";

/// Environment variable overriding the config file location.
const CONFIG_ENV_VAR: &str = "FORMHIST_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub history: HistoryConfig,
    /// Form fields in display order.
    pub fields: Vec<FieldSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            fields: default_fields(),
        }
    }
}

fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("name"),
        FieldSpec::text("age"),
        FieldSpec::text("email"),
    ]
}

/// Resolves the config file path.
///
/// Resolution order:
/// 1. `FORMHIST_CONFIG` environment variable
/// 2. `formhist.json` next to the executable
pub fn resolve_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Broken files are left in place for the user to fix
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Drops or repairs field declarations that can't form a valid schema.
    pub fn sanitize(&mut self) {
        self.history.sanitize();

        let mut seen = HashSet::new();
        self.fields.retain(|field| {
            if field.name.is_empty() {
                tracing::warn!("Dropping field with an empty name");
                return false;
            }
            if let FieldKind::Choice { options } = &field.kind {
                if options.is_empty() {
                    tracing::warn!("Dropping choice field '{}' with no options", field.name);
                    return false;
                }
            }
            if !seen.insert(field.name.clone()) {
                tracing::warn!("Dropping duplicate field '{}'", field.name);
                return false;
            }
            true
        });

        for field in &mut self.fields {
            if let Some(default) = &field.default {
                if !field.kind.accepts(default) {
                    tracing::warn!(
                        "Default for field '{}' doesn't match its kind, resetting",
                        field.name
                    );
                    field.default = None;
                }
            }
        }

        if self.fields.is_empty() {
            self.fields = default_fields();
        }
    }

    /// Builds the form schema from the declared fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the fields are invalid. Sanitized configs always
    /// produce a valid schema.
    pub fn schema(&self) -> Result<FormSchema> {
        FormSchema::new(self.fields.clone()).context("Invalid form fields in config")
    }
}
