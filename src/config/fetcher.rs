use http::Method;
use serde::Deserialize;
use std::collections::HashMap;

/// ================================
/// Token fetchers
/// ================================
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FetcherConfig {
    /// generic token endpoint, response parsed per `parse`
    Http(HttpFetcherConfig),
    /// email/password sign-in with refresh-token renewal
    Password(PasswordFetcherConfig),
}

impl FetcherConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            FetcherConfig::Http(_) => "http",
            FetcherConfig::Password(_) => "password",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpFetcherConfig {
    pub request: RequestConfig,
    pub parse: ParseConfig,
}

/// HTTP request details
#[derive(Debug, Deserialize, Clone)]
pub struct RequestConfig {
    pub url: String,
    #[serde(with = "http_serde::method", default = "default_method")]
    pub method: Method, // GET, POST
    pub headers: Option<HashMap<String, GenericValue>>,
    /// sent as JSON
    pub body: Option<HashMap<String, GenericValue>>,
    /// sent as application/x-www-form-urlencoded
    pub form: Option<HashMap<String, GenericValue>>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordFetcherConfig {
    /// `POST {email, password, returnSecureToken}` -> `{idToken, refreshToken, expiresIn}`
    pub sign_in_url: String,
    /// `POST grant_type=refresh_token` -> `{id_token, refresh_token, expires_in}`
    pub refresh_url: String,
    pub email: GenericValue,
    pub password: GenericValue,
    pub timeout_ms: Option<u64>,
}

/// Header, body and credential value sources
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum GenericValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

/// ================================
/// Parsing - Token & Expiration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ParseConfig {
    pub token: TokenField,
    pub expiration: Option<Expiration>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Parent {
    Body,
    Header,
}

/// Location of the token in the response
#[derive(Debug, Deserialize, Clone)]
pub struct TokenField {
    pub parent: Parent,
    /// top-level body key, JSON pointer (`/a/b`) or header name
    pub pointer: String,
}

/// Expiration definition
#[derive(Debug, Deserialize, Clone)]
pub struct Expiration {
    pub source: ExpirationSource,
    pub pointer: Option<String>,         // required if source=body|header
    pub manual_ttl_seconds: Option<u64>, // required if source=manual
    #[serde(default)]
    pub format: ExpirationFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationFormat {
    /// Duration in seconds until expiration.
    #[default]
    Seconds,

    /// Unix timestamp (integer seconds since epoch)
    Unix,

    /// Unix timestamp in milliseconds
    UnixMillis,
}

/// Expiration sources
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationSource {
    Jwt,    // `exp` claim of the token itself
    Body,   // JSON body field
    Header, // response header
    Manual, // user-defined TTL
}

// jwt token
#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub exp: i64,
}

fn default_method() -> Method {
    Method::POST
}
