//! JSON bodies exchanged with the image service.
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EnhanceResponse {
    #[serde(default)]
    pub original_prompt: Option<String>,
    #[serde(default)]
    pub enhanced_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    image_urls: Option<Vec<String>>,
}

impl ImagesResponse {
    pub fn new(image_urls: Vec<String>) -> Self {
        Self {
            prompt: None,
            image_urls: Some(image_urls),
        }
    }

    /// A missing or `null` list reads as empty.
    pub fn image_urls(&self) -> &[String] {
        self.image_urls.as_deref().unwrap_or_default()
    }

    pub fn into_image_urls(self) -> Vec<String> {
        self.image_urls.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RemovalResponse {
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}
