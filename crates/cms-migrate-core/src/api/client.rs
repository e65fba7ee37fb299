//! HTTP client for the target CMS.
//!
//! Wraps reqwest with:
//! - Basic-auth login and bearer token handling
//! - Uniform mapping of non-success statuses to [`MigrateError::Remote`]
//! - Conflict (409) handling for idempotent asset writes
//! - Dry-run mode that logs mutating calls instead of sending them

use crate::api::types::{LoginBody, NewPage, PageRef, VersionRef};
use crate::api::{AssetWrite, CmsApi, NewVersion};
use crate::config::CmsApiConfig;
use crate::error::{MigrateError, Result};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, info, warn};
use url::Url;

/// Login credentials for the target CMS.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Authenticated client for the CMS API.
pub struct CmsClient {
    client: Client,
    /// `{base}/api/cms/v1`, without trailing slash.
    cms_url: String,
    token: String,
    dry_run: bool,
}

impl CmsClient {
    /// Log in at `{base_url}/api/v2/auth/login` and return a client carrying the token.
    ///
    /// The token is read from the `Authorization` response header, falling
    /// back to the `access_token` field of a JSON body. Any failure here is
    /// fatal for the run.
    pub async fn login(base_url: &str, credentials: &Credentials, dry_run: bool) -> Result<Self> {
        let base = normalize_base_url(base_url)?;
        let client = Client::builder()
            .user_agent(CmsApiConfig::USER_AGENT)
            .build()
            .map_err(|e| MigrateError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let auth_url = format!("{}{}", base, CmsApiConfig::AUTH_PATH);
        info!("Authenticating at {}", auth_url);

        let response = client
            .get(&auth_url)
            .basic_auth(&credentials.user, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| MigrateError::Authentication {
                message: format!("GET {} failed: {}", auth_url, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MigrateError::Authentication {
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        let header_token = response
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim_start_matches("Bearer ").trim().to_string())
            .filter(|token| !token.is_empty());

        let token = match header_token {
            Some(token) => token,
            None => read_json_lenient::<LoginBody>(response)
                .await
                .access_token
                .filter(|token| !token.is_empty())
                .ok_or_else(|| MigrateError::Authentication {
                    message: "No token in login response".to_string(),
                })?,
        };

        info!("Authenticated as {}", credentials.user);

        Ok(Self {
            client,
            cms_url: format!("{}{}", base, CmsApiConfig::CMS_PATH),
            token,
            dry_run,
        })
    }

    pub fn cms_url(&self) -> &str {
        &self.cms_url
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.cms_url, endpoint)
    }

    async fn send(&self, request: RequestBuilder, method: &str, url: &str) -> Result<Response> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| MigrateError::Transport {
                message: format!("{} {} failed: {}", method, url, e),
                source: Some(e),
            })?;

        debug!("{} {} -> {}", method, url, response.status());
        check_response_status(response, url).await
    }

    /// Shared handling of the two asset POSTs: 409 is not an error.
    async fn write_asset(&self, request: RequestBuilder, url: &str) -> Result<AssetWrite> {
        match self.send(request, "POST", url).await {
            Ok(_) => Ok(AssetWrite::Created),
            Err(e) if e.is_conflict() => Ok(AssetWrite::AlreadyExists),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl CmsApi for CmsClient {
    async fn create_page(&self, slug: &str) -> Result<Option<i64>> {
        let url = self.url("/pages");
        if self.dry_run {
            warn!("[dry-run] Would POST {} (slug {})", url, slug);
            return Ok(Some(0));
        }

        let request = self.client.post(&url).json(&NewPage { slug });
        let response = self.send(request, "POST", &url).await?;
        Ok(read_json_lenient::<PageRef>(response).await.id)
    }

    async fn find_page_by_slug(&self, slug: &str) -> Result<Option<i64>> {
        let url = self.url(&format!("/pages?slug={}", urlencoding::encode(slug)));
        let response = self.send(self.client.get(&url), "GET", &url).await?;
        let pages: Vec<PageRef> = read_json_lenient(response).await;
        Ok(pages.first().and_then(|page| page.id))
    }

    async fn create_version(&self, page_id: i64, version: &NewVersion) -> Result<Option<i64>> {
        let url = self.url(&format!("/pages/{}/versions", page_id));
        if self.dry_run {
            warn!(
                "[dry-run] Would POST {} ({} translations)",
                url,
                version.translations.len()
            );
            return Ok(Some(1));
        }

        let request = self.client.post(&url).json(version);
        let response = self.send(request, "POST", &url).await?;
        Ok(read_json_lenient::<VersionRef>(response).await.version_number)
    }

    async fn create_asset_directory(&self, path: &str) -> Result<AssetWrite> {
        let url = self.url(&format!("/assets/{}?directory=true", path));
        if self.dry_run {
            warn!("[dry-run] Would create asset directory {}", path);
            return Ok(AssetWrite::Created);
        }

        self.write_asset(self.client.post(&url), &url).await
    }

    async fn upload_asset(&self, path: &str, bytes: Vec<u8>) -> Result<AssetWrite> {
        let url = self.url(&format!("/assets/{}", path));
        if self.dry_run {
            warn!("[dry-run] Would upload {} bytes to {}", bytes.len(), path);
            return Ok(AssetWrite::Created);
        }

        let request = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        self.write_asset(request, &url).await
    }
}

/// Validate the base URL and strip any trailing slash.
fn normalize_base_url(base_url: &str) -> Result<String> {
    let parsed = Url::parse(base_url).map_err(|e| MigrateError::Config {
        message: format!("Invalid base URL {}: {}", base_url, e),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(MigrateError::Config {
            message: format!("Unsupported URL scheme: {}", parsed.scheme()),
        });
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

async fn check_response_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(MigrateError::Remote {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}

/// Parse a success body, treating empty or malformed JSON as the default value.
async fn read_json_lenient<T: DeserializeOwned + Default>(response: Response) -> T {
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Failed to read response body: {}", e);
            return T::default();
        }
    };

    if bytes.is_empty() {
        return T::default();
    }

    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        debug!("Ignoring non-JSON response body: {}", e);
        T::default()
    })
}
