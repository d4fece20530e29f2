use serde::Deserialize;

/// Upstream API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Base URL every relative request path is resolved against
    /// Also stripped from absolute targets before fingerprinting, so
    /// "http://api:8080/blocks" and "/blocks" are the same logical request
    /// Example: "http://127.0.0.1:8080" or "http://node:3000/api/v1"
    pub base_url: String,
    /// Bearer token sent as `Authorization: Bearer <token>` on every request
    /// Default: None
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Value of the `User-Agent` header
    /// Default: None (no header is added)
    #[serde(default)]
    pub user_agent: Option<String>,
}
