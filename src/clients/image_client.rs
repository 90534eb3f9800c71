/// 图片生成与下载客户端
///
/// 生成走 OpenAI 兼容的 `/images/generations` 接口，下载走普通 HTTP GET
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ImageFetchService, ImageGenerationService};
use crate::config::Config;

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

/// HTTP 图片服务
pub struct HttpImageService {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
    size: String,
    download_timeout: Duration,
}

impl HttpImageService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.llm_api_key.clone(),
            api_base_url: config.image_api_base_url.trim_end_matches('/').to_string(),
            model_name: config.image_model_name.clone(),
            size: config.image_size.clone(),
            download_timeout: config.download_timeout(),
        }
    }
}

#[async_trait]
impl ImageGenerationService for HttpImageService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/images/generations", self.api_base_url);
        debug!("请求图片生成: {}", url);

        let body = ImageRequest {
            model: &self.model_name,
            prompt,
            n: 1,
            size: &self.size,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("图片生成请求失败")?
            .error_for_status()
            .context("图片生成接口返回错误状态")?;

        let parsed: ImageResponse = response.json().await.context("图片生成响应解析失败")?;
        parsed
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| anyhow!("图片生成响应中没有 URL"))
    }
}

#[async_trait]
impl ImageFetchService for HttpImageService {
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("下载图片: {}", url);
        let response = self
            .http
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .context("图片下载请求失败")?
            .error_for_status()
            .context("图片下载返回错误状态")?;

        let bytes = response.bytes().await.context("读取图片内容失败")?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = ImageRequest {
            model: "dall-e-3",
            prompt: "p",
            n: 1,
            size: "1024x1024",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "dall-e-3");
        assert_eq!(json["n"], 1);
    }

    #[test]
    fn test_response_without_url() {
        let parsed: ImageResponse = serde_json::from_str(r#"{"data": [{"b64_json": "x"}]}"#).unwrap();
        assert!(parsed.data.into_iter().find_map(|d| d.url).is_none());
    }

    #[tokio::test]
    #[ignore]
    async fn test_generate_real_api() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = HttpImageService::new(&Config::from_env());
        let url = service
            .generate("Professional educational illustration about the solar system")
            .await
            .unwrap();
        let bytes = service.download(&url).await.unwrap();
        assert!(!bytes.is_empty());
    }
}
