use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::settings::AppConfig;
use super::validation::{validate_config, validate_settings};
use super::ConfigError;

const REDACT_PLACEHOLDER: &str = "****";

const SENSITIVE_PATTERNS: [&str; 10] = [
    "api_key",
    "secret",
    "password",
    "_token",
    "token_",
    "credential",
    "private_key",
    "auth_",
    "access_key",
    "bearer",
];

const SENSITIVE_WHITELIST: [&str; 3] = ["max_tokens", "tokens", "tokenizer"];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
    explicit_path: Option<PathBuf>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self {
            paths,
            explicit_path: None,
        }
    }

    /// Uses `path` instead of the discovered `config.yml`.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.explicit_path = Some(path);
        self
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        if let Some(path) = &self.explicit_path {
            return path.clone();
        }
        if let Ok(path) = env::var("TRAVEL_RAG_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let data_config = self.paths.data_dir.join("config.yml");
        if data_config.exists() {
            return data_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    /// Raw merged document: `config.yml` overlaid with `secrets.yaml`.
    pub fn load_document(&self) -> Result<Value, ConfigError> {
        let public_config = load_yaml_file(&self.config_path())?;
        let secrets_config = load_yaml_file(&self.secrets_path())?;
        Ok(deep_merge(&public_config, &secrets_config))
    }

    /// Loads, validates and resolves the effective configuration, including
    /// environment overrides.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let document = self.load_document()?;
        validate_config(&document)?;

        let mut config: AppConfig =
            serde_json::from_value(document).map_err(|e| ConfigError::Parse {
                path: self.config_path().display().to_string(),
                message: e.to_string(),
            })?;

        apply_env_overrides(&mut config, |key| env::var(key).ok());
        validate_settings(&config)?;

        config.rag.corpus_path = self.paths.resolve(&config.rag.corpus_path);
        config.rag.index_path = self.paths.resolve(&config.rag.index_path);
        Ok(config)
    }

    pub fn redact_sensitive_values(&self, value: &Value) -> Value {
        redact_sensitive_values(value)
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value = serde_yaml::from_str::<Value>(&contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(ConfigError::Parse {
            path: path.display().to_string(),
            message: "top-level value must be a mapping".to_string(),
        }),
    }
}

pub(crate) fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if config.generation.api_key.is_none() {
        config.generation.api_key = lookup("GROQ_API_KEY").filter(|v| !v.trim().is_empty());
    }
    if config.embedding.api_key.is_none() {
        config.embedding.api_key = lookup("EMBEDDING_API_KEY").filter(|v| !v.trim().is_empty());
    }
    if let Some(port) = lookup("PORT").and_then(|val| val.parse::<u16>().ok()) {
        config.server.port = port;
    }
    if let Some(path) = lookup("TRAVEL_RAG_INDEX_PATH").filter(|v| !v.trim().is_empty()) {
        config.rag.index_path = PathBuf::from(path);
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

fn redact_sensitive_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                if is_sensitive_key(key) && !val.is_null() {
                    redacted.insert(key.clone(), Value::String(REDACT_PLACEHOLDER.to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_values(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_values).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    if SENSITIVE_WHITELIST
        .iter()
        .any(|allowed| *allowed == key_lower)
    {
        return false;
    }
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| key_lower.contains(pattern))
}
