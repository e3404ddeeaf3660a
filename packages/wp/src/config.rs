use serde::Deserialize;

/// Connection settings for the WordPress REST API.
#[derive(Debug, Deserialize, Clone)]
pub struct WpConfig {
    /// Site base URL, e.g. "https://blog.example.com".
    pub base_url: String,
    /// WordPress account username.
    pub username: String,
    /// Application password for that account.
    pub app_password: String,
    /// Posts fetched per page. Default: 100, the API maximum.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Per-request timeout in seconds. Default: 30.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_page_size() -> u32 {
    100
}
fn default_fetch_timeout_secs() -> u64 {
    30
}
