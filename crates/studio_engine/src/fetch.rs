use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::api::{EnhanceResponse, ErrorBody, ImagesResponse, RemovalResponse};
use crate::{FailureKind, FetchError};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_body_bytes: u64,
    pub removal: RemovalOptions,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_bytes: 50 * 1024 * 1024,
            removal: RemovalOptions::default(),
        }
    }
}

/// Optional form fields understood by the background-removal endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalOptions {
    pub preserve_partial_alpha: bool,
    pub sync: bool,
    pub content_moderation: bool,
}

impl Default for RemovalOptions {
    fn default() -> Self {
        Self {
            preserve_partial_alpha: true,
            sync: true,
            content_moderation: false,
        }
    }
}

/// File sent as the `image` part of a background-removal upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

/// Sends `request`, giving up after `timeout` or when `cancel` fires.
///
/// Losing the race drops the in-flight request. A timeout is reported as
/// [`FailureKind::Timeout`], distinct from transport failures.
pub async fn fetch_with_timeout(
    request: reqwest::RequestBuilder,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<reqwest::Response, FetchError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::new(FailureKind::Cancelled, "request cancelled")),
        outcome = tokio::time::timeout(timeout, request.send()) => match outcome {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(map_reqwest_error(err)),
            Err(_) => Err(FetchError::new(FailureKind::Timeout, TIMEOUT_MESSAGE)),
        },
    }
}

#[async_trait::async_trait]
pub trait StudioApi: Send + Sync {
    async fn enhance_prompt(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<EnhanceResponse, FetchError>;

    async fn generate_images(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<ImagesResponse, FetchError>;

    async fn remove_background(
        &self,
        upload: &ImageUpload,
        cancel: &CancellationToken,
    ) -> Result<RemovalResponse, FetchError>;

    /// Fetches an absolute URL as raw bytes.
    async fn download(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStudioApi {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestStudioApi {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    /// Bounds a whole round trip, body included, by the request timeout.
    async fn within_deadline<T>(
        &self,
        round_trip: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        tokio::time::timeout(self.settings.request_timeout, round_trip)
            .await
            .unwrap_or_else(|_| Err(FetchError::new(FailureKind::Timeout, TIMEOUT_MESSAGE)))
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, FetchError> {
        let raw = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path);
        url::Url::parse(&raw).map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: url::Url,
        cancel: &CancellationToken,
    ) -> Result<T, FetchError> {
        engine_debug!("GET {}", url);
        self.within_deadline(async {
            let response = fetch_with_timeout(
                self.client.get(url),
                self.settings.request_timeout,
                cancel,
            )
            .await?;
            self.read_json(response, cancel).await
        })
        .await
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        cancel: &CancellationToken,
    ) -> Result<T, FetchError> {
        let status = response.status();
        let body = read_limited(response, self.settings.max_body_bytes, cancel).await?;

        if !status.is_success() {
            let parsed = serde_json::from_slice::<ErrorBody>(&body).unwrap_or_default();
            if let Some(details) = parsed.details.as_deref() {
                engine_warn!("Server reported {}: {}", status, details);
            }
            return Err(FetchError::http_status(
                status.as_u16(),
                status.to_string(),
                parsed.error,
            ));
        }

        serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::InvalidResponse, err.to_string()))
    }
}

#[async_trait::async_trait]
impl StudioApi for ReqwestStudioApi {
    async fn enhance_prompt(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<EnhanceResponse, FetchError> {
        let url = self.endpoint(&format!("prompt/{}", urlencoding::encode(text)))?;
        self.get_json(url, cancel).await
    }

    async fn generate_images(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<ImagesResponse, FetchError> {
        let url = self.endpoint(&format!("image/{}", urlencoding::encode(text)))?;
        self.get_json(url, cancel).await
    }

    async fn remove_background(
        &self,
        upload: &ImageUpload,
        cancel: &CancellationToken,
    ) -> Result<RemovalResponse, FetchError> {
        let url = self.endpoint("removebg")?;
        let bytes = tokio::fs::read(&upload.path).await.map_err(|err| {
            FetchError::new(
                FailureKind::InvalidUpload,
                format!("could not read {}: {err}", upload.path.display()),
            )
        })?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|err| FetchError::new(FailureKind::InvalidUpload, err.to_string()))?;
        let options = self.settings.removal;
        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("preserve_partial_alpha", options.preserve_partial_alpha.to_string())
            .text("sync", options.sync.to_string())
            .text("content_moderation", options.content_moderation.to_string());

        engine_debug!("POST {} file={}", url, upload.file_name);
        self.within_deadline(async {
            let response = fetch_with_timeout(
                self.client.post(url).multipart(form),
                self.settings.request_timeout,
                cancel,
            )
            .await?;
            self.read_json(response, cancel).await
        })
        .await
    }

    async fn download(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, FetchError> {
        let parsed = url::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        self.within_deadline(async {
            let response = fetch_with_timeout(
                self.client.get(parsed),
                self.settings.request_timeout,
                cancel,
            )
            .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::http_status(status.as_u16(), status.to_string(), None));
            }
            read_limited(response, self.settings.max_body_bytes, cancel).await
        })
        .await
    }
}

async fn read_limited(
    response: reqwest::Response,
    max_bytes: u64,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, FetchError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(content_len),
                },
                "response too large",
            ));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(FetchError::new(FailureKind::Cancelled, "request cancelled"));
            }
            chunk = stream.next() => chunk,
        };
        let Some(chunk) = chunk else {
            break;
        };
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(next_len),
                },
                "response too large",
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, TIMEOUT_MESSAGE);
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
