// src/utils/http.rs

//! HTTP client utilities for loading form pages.

use std::time::Duration;

use crate::error::Result;
use crate::models::FetchConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page body, failing on non-success status codes.
pub async fn fetch_page_async(client: &reqwest::Client, url: &str) -> Result<String> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}
