#[cfg(test)]
mod tests {
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;
    use serial_test::serial;

    use crate::cache::token_cache::TokenCache;
    use crate::config::proc_loader::parse_config;
    use crate::errors::CacheError;
    use crate::fetcher::{build_fetcher, FetcherKind, TokenFetcher};
    use crate::helpers::time::now_ms;
    use crate::tests::common::{sample_jwt, spawn_axum};
    use axum::{routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn fetcher_from_yaml(yaml: String) -> FetcherKind {
        let service_config = parse_config(yaml).await.expect("valid config");
        build_fetcher(&service_config.fetcher).expect("fetcher")
    }

    #[tokio::test]
    #[serial]
    async fn client_credentials_token_is_fetched_once_and_cached() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(POST)
                .path("/oauth2/token")
                .header("x-api-key", "key-123");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "access_token": "oauth-abc",
                    "expires_in": 3600,
                    "token_type": "Bearer"
                }));
        }).await;

        std::env::set_var("CC_TEST_CLIENT_SECRET", "s3cr3t");
        let yaml = format!(r#"
settings:
  token_path: /token
fetcher:
  type: http
  request:
    url: "{}"
    method: POST
    headers:
      x-api-key:
        value: key-123
    form:
      grant_type:
        value: client_credentials
      client_secret:
        from_env: CC_TEST_CLIENT_SECRET
  parse:
    token:
      parent: body
      pointer: access_token
    expiration:
      source: body
      pointer: expires_in
      format: seconds
"#, server.url("/oauth2/token"));

        let fetcher = fetcher_from_yaml(yaml).await;
        assert_eq!(fetcher.name(), "http");
        let cache = TokenCache::new(fetcher);

        let before = now_ms();
        assert_eq!(cache.get_token().await.unwrap(), "oauth-abc");
        assert_eq!(cache.get_token().await.unwrap(), "oauth-abc");
        mock.assert_async().await;

        let expires_at_ms = cache.current().await.expires_at_ms.unwrap();
        assert!(expires_at_ms >= before + 3_600_000);
        assert!(expires_at_ms <= now_ms() + 3_600_000);

        std::env::remove_var("CC_TEST_CLIENT_SECRET");
    }

    #[tokio::test]
    #[serial]
    async fn jwt_expiration_from_header_token() {
        let exp = now_ms() / 1000 + 600;
        let jwt = sample_jwt(exp);

        let server = MockServer::start_async().await;
        let jwt_clone = jwt.clone();
        let mock = server.mock_async(move |when, then| {
            when.method(POST).path("/issue");
            then.status(200)
                .header("x-id-token", jwt_clone.as_str())
                .body("");
        }).await;

        let yaml = format!(r#"
settings: {{}}
fetcher:
  type: http
  request:
    url: "{}"
  parse:
    token:
      parent: header
      pointer: x-id-token
    expiration:
      source: jwt
"#, server.url("/issue"));

        let cache = TokenCache::new(fetcher_from_yaml(yaml).await);
        assert_eq!(cache.get_token().await.unwrap(), jwt);
        assert_eq!(cache.current().await.expires_at_ms, Some(exp * 1000));
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn response_without_token_fails_fetch() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(200).json_body(json!({ "unexpected": true }));
        }).await;

        let yaml = format!(r#"
settings: {{}}
fetcher:
  type: http
  request:
    url: "{}"
  parse:
    token:
      parent: body
      pointer: access_token
"#, server.url("/oauth2/token"));

        let cache = TokenCache::new(fetcher_from_yaml(yaml).await);
        let err = cache.get_token().await.unwrap_err();
        assert!(matches!(err, CacheError::TokenFetchFailed(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[serial]
    async fn token_without_expiration_is_refetched_every_call() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let router = Router::new().route("/oauth2/token", post(move || {
            let c = counter_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "access_token": "no-exp" }))
            }
        }));
        let (handle, addr) = spawn_axum(router).await;

        let yaml = format!(r#"
settings: {{}}
fetcher:
  type: http
  request:
    url: "http://{}/oauth2/token"
  parse:
    token:
      parent: body
      pointer: access_token
"#, addr);

        let cache = TokenCache::new(fetcher_from_yaml(yaml).await);
        assert_eq!(cache.get_token().await.unwrap(), "no-exp");
        assert_eq!(cache.get_token().await.unwrap(), "no-exp");
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        handle.abort();
    }
}
