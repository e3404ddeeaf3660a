use std::time::Duration;

use tracing::debug;

use crate::config::WpConfig;
use crate::error::WpError;
use crate::models::WpPost;

/// Client for the WordPress REST API, authenticated with an
/// application password.
#[derive(Debug, Clone)]
pub struct WpClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    app_password: String,
    page_size: u32,
}

impl WpClient {
    pub fn new(config: &WpConfig) -> Result<Self, WpError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| WpError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            app_password: config.app_password.clone(),
            page_size: config.page_size,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetches one page of posts, embedded media included. Returns
    /// `Ok(None)` past the last page: WordPress answers an invalid
    /// page number with 400 (and some installations with 404).
    pub async fn fetch_page(&self, page: u32) -> Result<Option<Vec<WpPost>>, WpError> {
        let url = format!(
            "{}/wp-json/wp/v2/posts?per_page={}&page={}&status=any&_embed",
            self.base_url, self.page_size, page
        );
        debug!(page, "fetching WordPress page");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.app_password))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(WpError::Status {
                status: status.as_u16(),
            });
        }

        let posts = response.json::<Vec<WpPost>>().await?;
        Ok(Some(posts))
    }
}
