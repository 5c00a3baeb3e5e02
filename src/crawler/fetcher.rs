//! HTTP session for the quiz site
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client with a cookie store and user agent
//! - Logging in and applying the login-failure policy
//! - GET requests for listing, answer and category pages
//! - Binary downloads for question images

use crate::config::SiteConfig;
use crate::site::SiteUrls;
use crate::HarvestError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// A fetched HTML document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Builds an HTTP client with proper configuration
///
/// The cookie store carries the login session across every request of a run.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("quiz-harvest/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// The one authenticated session a run uses for every request
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    urls: SiteUrls,
}

impl Session {
    pub fn new(urls: SiteUrls) -> Result<Self, HarvestError> {
        let client = build_http_client()?;
        tracing::debug!("Session established for {}", urls.base());
        Ok(Self { client, urls })
    }

    pub fn urls(&self) -> &SiteUrls {
        &self.urls
    }

    /// Posts the login form and returns the HTTP status code
    pub async fn login(&self, username: &str, password: &str) -> Result<u16, HarvestError> {
        let url = self.urls.login()?;
        let response = self
            .client
            .post(url.clone())
            .form(&[("name", username), ("pass", password)])
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        tracing::debug!("Login attempt resulted in HTTP status code: {}", status);
        Ok(status)
    }

    /// Fetches an HTML page
    ///
    /// A non-success status is logged and the body returned anyway; only
    /// transport failures are errors.
    pub async fn get_page(&self, url: &Url) -> Result<FetchedPage, HarvestError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            tracing::debug!("Fetched {} with status code {}", url, status.as_u16());
        } else {
            tracing::warn!("Fetched {} with status code {}", url, status.as_u16());
        }

        let body = response.text().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchedPage {
            url: url.to_string(),
            status_code: status.as_u16(),
            body,
        })
    }

    /// Downloads a binary resource; any non-success status is an error
    pub async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, HarvestError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let bytes = response.bytes().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

/// Logs in when credentials are configured
///
/// A rejected login (anything but 200) aborts with
/// [`HarvestError::LoginRejected`] when `abort-on-login-failure` is set and
/// is otherwise logged, the run continuing with an anonymous session.
pub async fn authenticate(session: &Session, site: &SiteConfig) -> Result<(), HarvestError> {
    if !site.has_credentials() {
        tracing::info!("No credentials configured, scraping anonymously");
        return Ok(());
    }

    let status = session.login(&site.username, &site.password).await?;
    if status == StatusCode::OK.as_u16() {
        tracing::info!("Logged in as {}", site.username);
        return Ok(());
    }

    if site.abort_on_login_failure {
        tracing::error!("Login for {} rejected with status {}", site.username, status);
        return Err(HarvestError::LoginRejected { status });
    }

    tracing::warn!(
        "Login for {} returned status {}, continuing without a session",
        site.username,
        status
    );
    Ok(())
}
