//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - token location vs expiration source rules
//! - request URL / method / value source rules
//! - path, logging and retry invariants

use tracing::{error, info};

use crate::config::fetcher::{
    ExpirationSource, FetcherConfig, GenericValue, HttpFetcherConfig, ParseConfig,
    PasswordFetcherConfig, RequestConfig,
};
use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    match &cfg.fetcher {
        FetcherConfig::Http(http) => validate_http_fetcher(http, &mut errors),
        FetcherConfig::Password(password) => validate_password_fetcher(password, &mut errors),
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc_by(errors.len() as u64);
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(retry) = &settings.retry {
        validate_retry("settings.retry", retry, errors);
    }

    if !settings.token_path.starts_with('/') {
        errors.push(format!(
            "settings.token_path '{}' must start with '/'",
            settings.token_path
        ));
    }

    if settings.server.host.is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }
    if metrics.is_enabled && metrics.path == settings.token_path {
        errors.push(format!(
            "settings.metrics.path and settings.token_path both use '{}'",
            metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_retry(path: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if let Some(attempts) = retry.attempts {
        if attempts == 0 {
            errors.push(format!("{}.attempts must be > 0", path));
        }
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "{}.max_delay_ms ({}) must be >= base_delay_ms ({})",
                path, max, base
            ));
        }
    }
}

/// HTTP FETCHER
fn validate_http_fetcher(cfg: &HttpFetcherConfig, errors: &mut Vec<String>) {
    validate_request("fetcher.request", &cfg.request, errors);
    validate_parse("fetcher.parse", &cfg.parse, errors);
}

fn validate_request(path: &str, request: &RequestConfig, errors: &mut Vec<String>) {
    validate_url(&format!("{}.url", path), &request.url, errors);

    match request.method.as_str() {
        "GET" | "POST" => {}
        m => errors.push(format!("{}.method '{}' must be 'GET' or 'POST'", path, m)),
    }

    if request.body.is_some() && request.form.is_some() {
        errors.push(format!("{}: 'body' and 'form' are mutually exclusive", path));
    }
    if request.method == http::Method::GET && (request.body.is_some() || request.form.is_some()) {
        errors.push(format!("{}: GET request must not define 'body' or 'form'", path));
    }

    for (section, values) in [("headers", &request.headers), ("body", &request.body), ("form", &request.form)] {
        if let Some(values) = values {
            for (key, value) in values {
                validate_generic_value(&format!("{}.{}.{}", path, section, key), value, errors);
            }
        }
    }

    if request.timeout_ms == Some(0) {
        errors.push(format!("{}.timeout_ms must be > 0", path));
    }
}

fn validate_parse(path: &str, parse: &ParseConfig, errors: &mut Vec<String>) {
    if parse.token.pointer.trim().is_empty() {
        errors.push(format!("{}.token.pointer cannot be empty", path));
    }

    let Some(expiration) = &parse.expiration else {
        return;
    };

    match expiration.source {
        ExpirationSource::Jwt => {}
        ExpirationSource::Body | ExpirationSource::Header => {
            if expiration.pointer.as_deref().map(str::trim).unwrap_or_default().is_empty() {
                errors.push(format!(
                    "{}.expiration.pointer is required when source is {:?}",
                    path, expiration.source
                ));
            }
        }
        ExpirationSource::Manual => {
            if expiration.manual_ttl_seconds.unwrap_or_default() == 0 {
                errors.push(format!(
                    "{}.expiration.manual_ttl_seconds must be > 0 when source is manual",
                    path
                ));
            }
        }
    }
}

/// PASSWORD FETCHER
fn validate_password_fetcher(cfg: &PasswordFetcherConfig, errors: &mut Vec<String>) {
    validate_url("fetcher.sign_in_url", &cfg.sign_in_url, errors);
    validate_url("fetcher.refresh_url", &cfg.refresh_url, errors);
    validate_generic_value("fetcher.email", &cfg.email, errors);
    validate_generic_value("fetcher.password", &cfg.password, errors);
    if cfg.timeout_ms == Some(0) {
        errors.push("fetcher.timeout_ms must be > 0".to_string());
    }
}

fn validate_url(path: &str, url: &str, errors: &mut Vec<String>) {
    let url = url.trim();
    if url.is_empty() {
        errors.push(format!("{} cannot be empty", path));
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!("{} '{}' must start with http:// or https://", path, url));
    }
}

fn validate_generic_value(path: &str, value: &GenericValue, errors: &mut Vec<String>) {
    match value {
        GenericValue::Literal { .. } => {}
        GenericValue::FromEnv { from_env } => {
            if from_env.trim().is_empty() {
                errors.push(format!("{}.from_env cannot be empty", path));
            }
        }
        GenericValue::FromFile { path: file } => {
            if !std::path::Path::new(file).is_absolute() {
                errors.push(format!("{}.path '{}' must be an absolute path", path, file));
            }
        }
    }
}
