//! imgbb image host.
//!
//! Uploads go to `POST /1/upload` as a urlencoded form with the API key and
//! either the base64 file contents or a URL imgbb fetches itself. The
//! response carries the public link under `data.url`.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use vitrina_core::media::{MediaExternalizer, VIDEO_EXTENSIONS};
use vitrina_types::error::MediaError;
use vitrina_types::event::MediaSource;

const DEFAULT_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// [`MediaExternalizer`] backed by imgbb. Images only.
///
/// The API key is held as a [`SecretString`] and only exposed while the form
/// body is built.
pub struct ImgbbExternalizer {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
}

impl ImgbbExternalizer {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MediaError::Upload(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Override the upload endpoint (tests, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    data: Option<UploadData>,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadError {
    #[serde(default)]
    message: String,
}

/// The form value for `image`: base64 contents or a fetchable URL.
fn image_field(source: &MediaSource) -> Result<String, MediaError> {
    match source {
        MediaSource::Bytes { data, file_name } => {
            let extension = file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .unwrap_or_default();
            if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
                return Err(MediaError::Rejected(format!(
                    "{file_name}: videos are not supported"
                )));
            }
            if data.is_empty() {
                return Err(MediaError::Rejected(format!("{file_name}: empty file")));
            }
            Ok(STANDARD.encode(data))
        }
        MediaSource::PlatformUrl(url) => Ok(url.clone()),
    }
}

/// Extract the public URL from a response body.
fn parse_response(status: reqwest::StatusCode, body: &str) -> Result<String, MediaError> {
    let parsed: UploadResponse = serde_json::from_str(body).map_err(|e| {
        if status.is_success() {
            MediaError::Upload(format!("unreadable response: {e}"))
        } else {
            MediaError::Upload(format!("HTTP {status}"))
        }
    })?;

    match parsed {
        UploadResponse {
            success: true,
            data: Some(data),
            ..
        } if status.is_success() && !data.url.is_empty() => Ok(data.url),
        UploadResponse {
            error: Some(error), ..
        } if status.is_client_error() => Err(MediaError::Rejected(error.message)),
        UploadResponse {
            error: Some(error), ..
        } => Err(MediaError::Upload(format!("HTTP {status}: {}", error.message))),
        _ => Err(MediaError::Upload(format!("HTTP {status}: no url in response"))),
    }
}

impl MediaExternalizer for ImgbbExternalizer {
    fn name(&self) -> &str {
        "imgbb"
    }

    async fn externalize(&self, source: &MediaSource) -> Result<String, MediaError> {
        let image = image_field(source)?;

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("key", self.api_key.expose_secret()), ("image", image.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MediaError::Timeout
                } else {
                    MediaError::Upload(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MediaError::Upload(format!("could not read response: {e}")))?;
        let url = parse_response(status, &body)?;
        tracing::debug!(%url, "image uploaded to imgbb");
        Ok(url)
    }
}
