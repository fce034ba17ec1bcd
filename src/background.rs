use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::{sync::Arc, time::Duration};

use crate::config::AppConfig;

/// Upper bound on one background-removal round trip, upload included.
pub const REMOVE_BG_TIMEOUT: Duration = Duration::from_secs(30);

/// An image payload together with its MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBytes {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// BackgroundRemover
///
/// Optional image post-processing applied to uploads. Implementations never fail:
/// when processing is unavailable or errors, the input comes back unchanged.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    async fn remove_background(&self, image: ImageBytes) -> ImageBytes;
}

/// RemoveBgClient
///
/// Calls a remove.bg-compatible endpoint (`X-Api-Key` header, multipart `image_file`
/// field). Without an API key every call is a no-op.
#[derive(Clone)]
pub struct RemoveBgClient {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl RemoveBgClient {
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>) -> Self {
        Self::with_timeout(api_key, endpoint, REMOVE_BG_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: Option<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not build background-removal client, calls will not time out");
                reqwest::Client::new()
            });
        Self {
            client,
            api_key,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.remove_bg_api_key.clone(), config.remove_bg_endpoint.clone())
    }

    async fn call(&self, api_key: &str, image: &ImageBytes) -> Result<Vec<u8>, String> {
        let part = Part::bytes(image.bytes.clone())
            .file_name("upload")
            .mime_str(&image.content_type)
            .map_err(|e| e.to_string())?;
        let form = Form::new().part("image_file", part).text("size", "auto");

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Api-Key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("remove.bg responded with {}", response.status()));
        }

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl BackgroundRemover for RemoveBgClient {
    async fn remove_background(&self, image: ImageBytes) -> ImageBytes {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("background removal skipped: no API key configured");
            return image;
        };

        match self.call(api_key, &image).await {
            // The service always answers with a PNG.
            Ok(bytes) if !bytes.is_empty() => ImageBytes {
                bytes,
                content_type: "image/png".to_string(),
            },
            Ok(_) => image,
            Err(e) => {
                tracing::warn!(error = %e, "background removal failed, keeping original image");
                image
            }
        }
    }
}

/// BackgroundState
pub type BackgroundState = Arc<dyn BackgroundRemover>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_returns_original() {
        let client = RemoveBgClient::new(None, "http://127.0.0.1:9/unused");
        let image = ImageBytes {
            bytes: vec![1, 2, 3],
            content_type: "image/jpeg".to_string(),
        };
        assert_eq!(client.remove_background(image.clone()).await, image);
    }

    #[tokio::test]
    async fn unreachable_service_returns_original() {
        let client = RemoveBgClient::new(Some("key".to_string()), "http://127.0.0.1:9/removebg");
        let image = ImageBytes {
            bytes: vec![9, 9],
            content_type: "image/png".to_string(),
        };
        assert_eq!(client.remove_background(image.clone()).await, image);
    }

    #[tokio::test]
    async fn stalled_service_times_out_with_original() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/removebg", listener.local_addr().unwrap());
        // Accepts connections and never answers.
        let stall = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = RemoveBgClient::with_timeout(
            Some("key".to_string()),
            endpoint,
            Duration::from_millis(200),
        );
        let image = ImageBytes {
            bytes: vec![4, 2],
            content_type: "image/png".to_string(),
        };
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            client.remove_background(image.clone()),
        )
        .await
        .expect("background removal did not honour its timeout");
        assert_eq!(result, image);
        stall.abort();
    }
}
