#[cfg(test)]
mod tests {

    use std::io::Write;

    use serial_test::serial;

    use crate::config::fetcher::{ExpirationSource, FetcherConfig, GenericValue};
    use crate::config::proc_loader::{expand_env_vars, file_to_config, parse_config};
    use crate::config::proc_validator::validate_service_config;
    use crate::config::settings::LogFormat;
    use crate::config::types::ServiceConfig;
    use crate::utils::config_loader;

    const VALID_YAML: &str = r#"
settings:
  token_path: /token
  server:
    host: 127.0.0.1
    port: "8080"
  metrics:
    path: /metrics
    is_enabled: true
  logging:
    level: debug
    format: json
  retry:
    attempts: 3
    base_delay_ms: 100
    max_delay_ms: 1000
fetcher:
  type: http
  request:
    url: "https://auth.example.com/oauth2/token"
    method: POST
    headers:
      x-api-key:
        from_env: API_KEY
    form:
      grant_type:
        value: client_credentials
  parse:
    token:
      parent: body
      pointer: access_token
    expiration:
      source: body
      pointer: expires_in
"#;

    #[tokio::test]
    async fn valid_http_config_is_parsed_with_defaults() {
        let service_config = parse_config(VALID_YAML.to_string()).await.unwrap();

        let logging = service_config.settings.logging.as_ref().unwrap();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);
        assert!(service_config.settings.metrics.is_enabled);

        match &service_config.fetcher {
            FetcherConfig::Http(http) => {
                assert_eq!(http.request.method, http::Method::POST);
                assert_eq!(
                    http.request.headers.as_ref().unwrap()["x-api-key"],
                    GenericValue::FromEnv { from_env: "API_KEY".into() }
                );
                let expiration = http.parse.expiration.as_ref().unwrap();
                assert_eq!(expiration.source, ExpirationSource::Body);
            }
            other => panic!("unexpected fetcher {:?}", other),
        }
    }

    #[tokio::test]
    async fn password_config_with_minimal_settings() {
        let yaml = r#"
settings: {}
fetcher:
  type: password
  sign_in_url: "https://identity.example.com/v1/accounts:signInWithPassword"
  refresh_url: "https://securetoken.example.com/v1/token"
  email:
    value: ada@example.com
  password:
    from_env: LECTURES_PASSWORD
"#;
        let service_config = parse_config(yaml.to_string()).await.unwrap();
        assert_eq!(service_config.fetcher.kind(), "password");
        assert_eq!(service_config.settings.token_path, "/token");
        assert_eq!(service_config.settings.server.port, "8080");
        assert!(!service_config.settings.metrics.is_enabled);
        assert!(service_config.settings.logging.is_some());
    }

    #[tokio::test]
    async fn invalid_config_reports_all_errors() {
        // Intentionally invalid config (bad token path, bad port, retry bounds,
        // GET with form, missing expiration pointer, relative secret path)
        let invalid_yaml = r#"
settings:
  token_path: token
  server:
    host: 127.0.0.1
    port: "eighty"
  logging:
    level: verbose
    format: compact
  retry:
    attempts: 0
    base_delay_ms: 500
    max_delay_ms: 100
fetcher:
  type: http
  request:
    url: "ftp://auth.example.com/token"
    method: GET
    form:
      client_secret:
        path: secrets/client_secret
  parse:
    token:
      parent: body
      pointer: access_token
    expiration:
      source: header
"#;
        let service_config: ServiceConfig = serde_yaml::from_str(invalid_yaml).unwrap();
        let errors = validate_service_config(&service_config).await.unwrap_err();

        let expected = [
            "settings.token_path",
            "settings.server.port",
            "settings.logging.level",
            "settings.retry.attempts",
            "settings.retry.max_delay_ms",
            "fetcher.request.url",
            "GET request must not define",
            "fetcher.request.form.client_secret.path",
            "fetcher.parse.expiration.pointer",
        ];
        for needle in expected {
            assert!(
                errors.iter().any(|e| e.contains(needle)),
                "missing error containing '{}' in {:#?}",
                needle,
                errors
            );
        }
        assert_eq!(errors.len(), expected.len(), "{:#?}", errors);

        let err = parse_config(invalid_yaml.to_string()).await.unwrap_err();
        assert!(err.to_string().contains("config is not valid"));
    }

    #[tokio::test]
    async fn unknown_fetcher_type_is_rejected() {
        let yaml = r#"
settings: {}
fetcher:
  type: google
"#;
        assert!(parse_config(yaml.to_string()).await.is_err());
    }

    #[test]
    #[serial]
    fn env_vars_are_expanded_with_defaults() {
        std::env::set_var("CC_TEST_TOKEN_HOST", "auth.internal");
        std::env::remove_var("CC_TEST_TOKEN_PORT");

        let expanded = expand_env_vars("url: https://${CC_TEST_TOKEN_HOST}:${CC_TEST_TOKEN_PORT:8443}/token").unwrap();
        assert_eq!(expanded, "url: https://auth.internal:8443/token");

        std::env::remove_var("CC_TEST_TOKEN_HOST");
    }

    #[tokio::test]
    #[serial]
    async fn config_file_is_loaded_from_disk() {
        std::env::set_var("CC_TEST_SIGN_IN_URL", "https://identity.example.com/signIn");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"
settings:
  server:
    port: "9090"
fetcher:
  type: password
  sign_in_url: "${{CC_TEST_SIGN_IN_URL}}"
  refresh_url: "${{CC_TEST_REFRESH_URL:https://identity.example.com/refresh}}"
  email:
    value: ada@example.com
  password:
    value: hunter2
"#).unwrap();

        let path = file.path().to_string_lossy().into_owned();
        let service_config = config_loader::run(&path).await.unwrap();
        match &service_config.fetcher {
            FetcherConfig::Password(password) => {
                assert_eq!(password.sign_in_url, "https://identity.example.com/signIn");
                assert_eq!(password.refresh_url, "https://identity.example.com/refresh");
            }
            other => panic!("unexpected fetcher {:?}", other),
        }
        assert_eq!(service_config.settings.server.port, "9090");

        assert!(file_to_config(std::path::Path::new("/nonexistent/credential-cache.yaml")).await.is_err());
        std::env::remove_var("CC_TEST_SIGN_IN_URL");
    }
}
