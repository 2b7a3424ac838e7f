//! HTTP client for glove registration and glove images.

use alloy::primitives::Address;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::assets::{AssetError, AssetResult};
use crate::config::AssetConfig;

/// Which hand a glove image is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AssetClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl AssetClient {
    pub fn new(config: &AssetConfig) -> AssetResult<Self> {
        let mut base_url: Url = config
            .base_url
            .parse()
            .map_err(|e| AssetError::InvalidUrl(format!("'{}': {}", config.base_url, e)))?;
        // Endpoint paths are joined onto the base, which must read as a directory.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .user_agent(format!("handroyal-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AssetError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    fn url(&self, path: &str) -> AssetResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AssetError::InvalidUrl(e.to_string()))
    }

    /// Upload a glove image for `address` as `multipart/form-data`.
    pub async fn register_glove(
        &self,
        address: Address,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> AssetResult<String> {
        let form = Form::new()
            .text("address", address.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let response = self
            .http
            .post(self.url("register-glove")?)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AssetError::Transport(e.to_string()))?;
        let body = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(|e| AssetError::Transport(e.to_string()))?;
        tracing::info!(glove = %address, "Glove registered with asset service");
        Ok(body)
    }

    /// Fetch the rendered image of a glove.
    pub async fn glove_image(&self, glove: Address, hand: Hand) -> AssetResult<Vec<u8>> {
        let mut url = self.url("get-glove-image")?;
        url.query_pairs_mut()
            .append_pair("gloveAddress", &glove.to_string())
            .append_pair("hand", hand.as_str());
        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AssetError::Transport(e.to_string()))?;
        let bytes = ensure_success(response)
            .await?
            .bytes()
            .await
            .map_err(|e| AssetError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

async fn ensure_success(response: Response) -> AssetResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "Asset service returned error status");
    Err(AssetError::Status {
        status: status.as_u16(),
        body,
    })
}
