#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde::Deserialize;
    use serde_json::{json, Value};

    use crate::cache::token_cache::TokenCache;
    use crate::config::proc_loader::parse_config;
    use crate::config::types::ServiceConfig;
    use crate::fetcher::build_fetcher;
    use crate::server::server::router;
    use crate::tests::common::{build_reqwest_client, spawn_axum};

    #[derive(Debug, Deserialize)]
    struct TokenBody {
        token: String,
        expires_at_ms: Option<i64>,
    }

    async fn service_config(token_url: String) -> ServiceConfig {
        let yaml = format!(r#"
settings:
  token_path: /v1/token
  metrics:
    path: /metrics
    is_enabled: true
fetcher:
  type: http
  request:
    url: "{}"
  parse:
    token:
      parent: body
      pointer: access_token
    expiration:
      source: body
      pointer: expires_at
      format: unix
"#, token_url);
        parse_config(yaml).await.expect("valid config")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn serves_cached_token_and_metrics() {
        let authority = MockServer::start_async().await;
        let mock = authority.mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200).json_body(json!({
                "access_token": "served-abc",
                "expires_at": 4_102_444_800i64
            }));
        }).await;

        let cfg = service_config(authority.url("/token")).await;
        let cache = Arc::new(TokenCache::new(build_fetcher(&cfg.fetcher).unwrap()));
        let (handle, addr) = spawn_axum(router(&cfg.settings, cache).await).await;
        let client = build_reqwest_client();

        for _ in 0..3 {
            let res = client.get(format!("http://{}/v1/token", addr)).send().await.unwrap();
            assert!(res.status().is_success(), "unexpected status: {}", res.status());
            let body: TokenBody = res.json().await.unwrap();
            assert_eq!(body.token, "served-abc");
            assert_eq!(body.expires_at_ms, Some(4_102_444_800_000));
        }
        mock.assert_async().await;

        let res = client.get(format!("http://{}/metrics", addr)).send().await.unwrap();
        assert!(res.status().is_success());
        let text = res.text().await.unwrap();
        assert!(text.contains("credentialcache_cache_hits_total"));
        assert!(text.contains("credentialcache_fetch_requests_total"));

        handle.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fetch_failure_maps_to_service_unavailable() {
        let authority = MockServer::start_async().await;
        authority.mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(401).json_body(json!({ "error": "invalid_client" }));
        }).await;

        let cfg = service_config(authority.url("/token")).await;
        let cache = Arc::new(TokenCache::new(build_fetcher(&cfg.fetcher).unwrap()));
        let (handle, addr) = spawn_axum(router(&cfg.settings, cache).await).await;

        let res = build_reqwest_client()
            .get(format!("http://{}/v1/token", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), http::StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = res.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("token fetch failed"));

        handle.abort();
    }
}
