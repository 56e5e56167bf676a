use serde_json::{Map, Value};

use super::settings::AppConfig;
use super::ConfigError;

/// Structural checks on the raw merged document, before it is deserialized.
pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(rag) = expect_optional_object(root, "rag")? {
        validate_optional_string_field(rag, "rag.corpus_path", "corpus_path")?;
        validate_optional_string_field(rag, "rag.index_path", "index_path")?;
        validate_u64_field(rag, "rag.chunk_size", "chunk_size", 1, 1_000_000)?;
        validate_u64_field(rag, "rag.chunk_overlap", "chunk_overlap", 0, 1_000_000)?;
        validate_u64_field(rag, "rag.top_k", "top_k", 1, 1_000)?;
        validate_separator_field(rag, "rag.separators", "separators")?;
        validate_u64_field(
            rag,
            "rag.max_context_chars",
            "max_context_chars",
            1,
            10_000_000,
        )?;
        validate_bool_field(rag, "rag.include_citations", "include_citations")?;
    }

    if let Some(embedding) = expect_optional_object(root, "embedding")? {
        validate_optional_string_field(embedding, "embedding.provider", "provider")?;
        validate_required_string_field(embedding, "embedding.model", "model")?;
        validate_u64_field(embedding, "embedding.dimensions", "dimensions", 1, 65_536)?;
        validate_optional_string_field(embedding, "embedding.base_url", "base_url")?;
        validate_u64_field(embedding, "embedding.batch_size", "batch_size", 1, 10_000)?;
        validate_u64_field(embedding, "embedding.timeout_secs", "timeout_secs", 1, 3_600)?;
    }

    if let Some(generation) = expect_optional_object(root, "generation")? {
        validate_optional_string_field(generation, "generation.base_url", "base_url")?;
        validate_required_string_field(generation, "generation.model", "model")?;
        validate_u64_field(generation, "generation.max_tokens", "max_tokens", 1, 1_000_000)?;
        validate_u64_field(generation, "generation.timeout_secs", "timeout_secs", 1, 3_600)?;
        validate_u64_field(
            generation,
            "generation.retry_backoff_ms",
            "retry_backoff_ms",
            0,
            60_000,
        )?;
    }

    if let Some(chat) = expect_optional_object(root, "chat")? {
        validate_bool_field(chat, "chat.enforce_response_shape", "enforce_response_shape")?;
    }

    Ok(())
}

/// Cross-field checks that only make sense on the typed configuration.
pub fn validate_settings(config: &AppConfig) -> Result<(), ConfigError> {
    let rag = &config.rag;
    if rag.chunk_overlap >= rag.chunk_size {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at 'rag.chunk_overlap': must be smaller than rag.chunk_size ({} >= {})",
            rag.chunk_overlap, rag.chunk_size
        )));
    }
    if rag.top_k == 0 {
        return Err(ConfigError::Invalid(
            "Invalid config at 'rag.top_k': must be at least 1".to_string(),
        ));
    }
    if config.embedding.dimensions == 0 {
        return Err(ConfigError::Invalid(
            "Invalid config at 'embedding.dimensions': must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ConfigError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_bool_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_bool().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "boolean"))
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_required_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

// Separators are whitespace by nature, so only emptiness is rejected.
fn validate_separator_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(text) if !text.is_empty() => {}
            Some(_) => {
                return Err(ConfigError::Invalid(format!(
                    "Invalid config at '{}[{}]': separator cannot be empty",
                    path, index
                )))
            }
            None => return Err(config_type_error(&format!("{}[{}]", path, index), "string")),
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ConfigError {
    ConfigError::Invalid(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
