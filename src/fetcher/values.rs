use anyhow::{anyhow, Result};
use std::collections::HashMap;

use crate::config::fetcher::GenericValue;

/// Resolve a configured value from its literal, environment or file source.
pub async fn resolve_value(value: &GenericValue) -> Result<String> {
    match value {
        GenericValue::Literal { value } => Ok(value.to_owned()),
        GenericValue::FromEnv { from_env } => std::env::var(from_env)
            .map_err(|err| anyhow!("env '{}': {}", from_env, err)),
        GenericValue::FromFile { path } => tokio::fs::read_to_string(path)
            .await
            .map(|res| res.trim().to_string())
            .map_err(|err| anyhow!("file '{}': {}", path, err)),
    }
}

pub async fn resolve_map(values: &HashMap<String, GenericValue>) -> Result<HashMap<String, String>> {
    let mut resolved = HashMap::with_capacity(values.len());
    for (key, value) in values {
        resolved.insert(key.to_owned(), resolve_value(value).await?);
    }
    Ok(resolved)
}
