use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

use crate::error::AppError;
use crate::food::analysis::detection::RawDetection;
use crate::food::config::RoboflowConfig;
use crate::providers::traits::DetectionBackend;

/// Hosted Roboflow object-detection model.
#[derive(Debug, Clone)]
pub struct RoboflowClient {
    config: RoboflowConfig,
    http: reqwest::Client,
}

impl RoboflowClient {
    pub fn new(config: RoboflowConfig, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    fn model_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model_id,
            self.config.version
        )
    }

    async fn request(&self, image: Vec<u8>, file_name: &str) -> Result<RawDetection, String> {
        let form = Form::new().part("file", Part::bytes(image).file_name(file_name.to_string()));

        let response = self
            .http
            .post(self.model_url())
            .query(&[("api_key", self.config.api_key.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Roboflow API Error {}: {}", status.as_u16(), body));
        }

        response
            .json::<RawDetection>()
            .await
            .map_err(|e| format!("Failed to parse detection response: {}", e))
    }
}

#[async_trait]
impl DetectionBackend for RoboflowClient {
    async fn detect(&self, image: Vec<u8>, file_name: &str) -> RawDetection {
        tracing::debug!(file_name, bytes = image.len(), "sending image for detection");

        match self.request(image, file_name).await {
            Ok(raw) => {
                tracing::info!(predictions = raw.predictions.len(), "detection completed");
                raw
            }
            Err(message) => {
                tracing::warn!(error = %message, "detection failed");
                RawDetection::failed(message)
            }
        }
    }
}
