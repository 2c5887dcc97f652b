use crate::cache::credential::Credential;
use crate::config::fetcher::{Expiration, ExpirationFormat, ExpirationSource, JwtClaims, ParseConfig, Parent};
use crate::observability::metrics::get_metrics;
use anyhow::{anyhow, Result};
use base64::Engine;
use http::HeaderMap;
use serde_json::Value;
use tracing::{debug, warn};


/// Extract a credential from a token endpoint response.
///
/// A token that cannot be located yields `Credential::missing()`. An expiration
/// that cannot be determined yields `expires_at_ms: None`, which the cache
/// treats as already expired.
pub async fn parse_credential(
    headers: &HeaderMap,
    body: &str,
    parse_config: &ParseConfig,
    now_ms: i64,
) -> Credential {
    let metrics = get_metrics().await;

    let json_body: Option<Value> = match serde_json::from_str(body) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!("Body is not valid JSON: {}", e);
            None
        }
    };

    let token = match parse_config.token.parent {
        Parent::Header => get_header_value(headers, &parse_config.token.pointer),
        Parent::Body => json_body
            .as_ref()
            .ok_or_else(|| anyhow!("body token requires a JSON body"))
            .and_then(|json| get_body_string(json, &parse_config.token.pointer)),
    };

    let token = match token {
        Ok(token) => token,
        Err(e) => {
            warn!(pointer = %parse_config.token.pointer, error = %e, "token not found in response");
            metrics.parse_failures.inc();
            return Credential::missing();
        }
    };

    let expires_at_ms = match &parse_config.expiration {
        None => None,
        Some(expiration) => match get_expiration_ms(expiration, &token, json_body.as_ref(), headers, now_ms) {
            Ok(expires_at_ms) => Some(expires_at_ms),
            Err(e) => {
                warn!(error = %e, "token expiration could not be determined, treating as expired");
                metrics.parse_failures.inc();
                None
            }
        },
    };

    Credential { token: Some(token), expires_at_ms }
}

fn get_expiration_ms(
    expiration: &Expiration,
    token: &str,
    json_body: Option<&Value>,
    headers: &HeaderMap,
    now_ms: i64,
) -> Result<i64> {
    let raw = match expiration.source {
        // `exp` is always absolute seconds
        ExpirationSource::Jwt => return Ok(decode_jwt_expiration(token)?.saturating_mul(1000)),
        ExpirationSource::Manual => {
            let ttl = expiration.manual_ttl_seconds.ok_or_else(|| {
                anyhow!("manual_ttl_seconds must be provided for manual expiration")
            })?;
            let ttl_ms = i64::try_from(ttl).unwrap_or(i64::MAX).saturating_mul(1000);
            return Ok(now_ms.saturating_add(ttl_ms));
        }
        ExpirationSource::Body => {
            let pointer = expiration.pointer.as_deref().ok_or_else(|| anyhow!("expiration.pointer required"))?;
            let json = json_body.ok_or_else(|| anyhow!("body expiration requires a JSON body"))?;
            get_body_integer(json, pointer)?
        }
        ExpirationSource::Header => {
            let pointer = expiration.pointer.as_deref().ok_or_else(|| anyhow!("expiration.pointer required"))?;
            let value = get_header_value(headers, pointer)?;
            value
                .trim()
                .parse::<i64>()
                .map_err(|e| anyhow!("invalid header value '{}': {}", pointer, e))?
        }
    };

    // caclulate token expiration according to the configured format
    Ok(match expiration.format {
        ExpirationFormat::Seconds => now_ms.saturating_add(raw.saturating_mul(1000)),
        ExpirationFormat::Unix => raw.saturating_mul(1000),
        ExpirationFormat::UnixMillis => raw,
    })
}

/// Read the `exp` claim (seconds since epoch) without verifying the signature.
pub fn decode_jwt_expiration(token: &str) -> Result<i64> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(anyhow!("invalid JWT format")),
    };

    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| anyhow!("base64 decode error: {}", e))?;

    let claims = serde_json::from_slice::<JwtClaims>(&decoded)
        .map_err(|e| anyhow!("invalid JWT payload: {}", e))?;
    debug!(expires_at = claims.exp, "jwt parsed successfully");
    Ok(claims.exp)
}

fn lookup<'a>(json: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.starts_with('/') {
        json.pointer(pointer)
    } else {
        json.get(pointer)
    }
}

fn get_body_string(json: &Value, pointer: &str) -> Result<String> {
    lookup(json, pointer)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("body field '{}' not found or not a string", pointer))
}

/// Integers may arrive as numbers or numeric strings (`"expiresIn": "3600"`).
fn get_body_integer(json: &Value, pointer: &str) -> Result<i64> {
    match lookup(json, pointer) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| anyhow!("body field '{}' is not an integer", pointer)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| anyhow!("body field '{}' is not an integer: {}", pointer, e)),
        _ => Err(anyhow!("body field '{}' not found", pointer)),
    }
}

fn get_header_value(headers: &HeaderMap, key: &str) -> Result<String> {
    headers
        .get(key)
        .ok_or_else(|| anyhow!("header '{}' not found", key))?
        .to_str()
        .map(|s| s.to_owned())
        .map_err(|e| anyhow!("invalid header '{}': {}", key, e))
}
