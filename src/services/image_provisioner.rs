//! 配图服务 - 业务能力层
//!
//! 只为需要配图的单元申请图片；任何失败都只影响本单元

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::clients::{ImageFetchService, ImageGenerationService};
use crate::config::Config;
use crate::error::ImageUnavailable;
use crate::infrastructure::ImageStore;
use crate::models::{ContentUnit, ImageFormat};
use crate::utils::text::first_words;

/// 提示词中引用的正文词数
const PROMPT_BODY_WORDS: usize = 30;

/// 配图服务
///
/// 职责：
/// - 生成配图提示词
/// - 带超时地请求生成与下载
/// - 校验图片格式并写入任务目录
pub struct ImageProvisioner {
    generator: Arc<dyn ImageGenerationService>,
    fetcher: Arc<dyn ImageFetchService>,
    store: ImageStore,
    generation_timeout: Duration,
    download_timeout: Duration,
    delay: Duration,
}

impl ImageProvisioner {
    pub fn new(
        generator: Arc<dyn ImageGenerationService>,
        fetcher: Arc<dyn ImageFetchService>,
        store: ImageStore,
        config: &Config,
    ) -> Self {
        Self {
            generator,
            fetcher,
            store,
            generation_timeout: config.image_timeout(),
            download_timeout: config.download_timeout(),
            delay: config.image_delay(),
        }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// 配图提示词
    pub fn build_prompt(unit: &ContentUnit) -> String {
        format!(
            "Professional educational illustration about {}: {}. Academic style, clean background, no text overlay",
            unit.title.trim(),
            first_words(&unit.raw_body, PROMPT_BODY_WORDS)
        )
    }

    /// 为单个单元获取图片，成功时返回本地路径
    pub async fn acquire(&self, job_id: &str, unit: &ContentUnit) -> Result<PathBuf, ImageUnavailable> {
        let prompt = Self::build_prompt(unit);
        debug!("配图提示词 (单元 {}): {}", unit.index, prompt);

        let url = timeout(self.generation_timeout, self.generator.generate(&prompt))
            .await
            .map_err(|_| ImageUnavailable::Timeout(self.generation_timeout.as_secs()))?
            .map_err(ImageUnavailable::GenerationFailed)?;

        let bytes = timeout(self.download_timeout, self.fetcher.download(&url))
            .await
            .map_err(|_| {
                ImageUnavailable::DownloadFailed(anyhow!(
                    "下载超时 ({} 秒)",
                    self.download_timeout.as_secs()
                ))
            })?
            .map_err(ImageUnavailable::DownloadFailed)?;

        let format = ImageFormat::sniff(&bytes).ok_or(ImageUnavailable::UnsupportedFormat)?;

        self.store
            .save(job_id, unit.index, format, &bytes)
            .await
            .map_err(ImageUnavailable::Storage)
    }

    /// 为单个单元配图；失败只记录日志，`image_ref` 保持为空
    pub async fn provision(&self, job_id: &str, unit: &mut ContentUnit) -> bool {
        if !unit.layout_type.needs_image() {
            return false;
        }
        match self.acquire(job_id, unit).await {
            Ok(path) => {
                debug!("✓ 单元 {} 配图完成: {}", unit.index, path.display());
                unit.image_ref = Some(path);
                true
            }
            Err(e) => {
                warn!("⚠️ 单元 {} 配图不可用，仅渲染文字: {}", unit.index, e);
                unit.image_ref = None;
                false
            }
        }
    }

    /// 按顺序为所有需要的单元配图，两次请求之间固定间隔
    ///
    /// 返回成功配图的单元数
    pub async fn provision_all(&self, job_id: &str, units: &mut [ContentUnit]) -> usize {
        let wanted = units.iter().filter(|u| u.layout_type.needs_image()).count();
        if wanted == 0 {
            return 0;
        }
        info!("🖼️ 需要配图的单元: {} 个", wanted);

        let mut requested = 0;
        let mut succeeded = 0;
        for unit in units.iter_mut().filter(|u| u.layout_type.needs_image()) {
            if requested > 0 {
                sleep(self.delay).await;
            }
            requested += 1;
            if self.provision(job_id, unit).await {
                succeeded += 1;
            }
        }

        info!("🖼️ 配图完成: {}/{}", succeeded, wanted);
        succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LayoutType;
    use anyhow::Result;
    use async_trait::async_trait;

    const PNG: [u8; 9] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0];

    struct FakeGenerator {
        hang: bool,
    }

    #[async_trait]
    impl ImageGenerationService for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if self.hang {
                sleep(Duration::from_secs(60)).await;
            }
            Ok(format!("https://images.test/{}", prompt.len()))
        }
    }

    struct FakeFetcher {
        bytes: Vec<u8>,
    }

    #[async_trait]
    impl ImageFetchService for FakeFetcher {
        async fn download(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.bytes.clone())
        }
    }

    fn provisioner(dir: &std::path::Path, hang: bool, bytes: Vec<u8>) -> ImageProvisioner {
        provisioner_with_delay(dir, hang, bytes, 0)
    }

    fn provisioner_with_delay(
        dir: &std::path::Path,
        hang: bool,
        bytes: Vec<u8>,
        image_delay_ms: u64,
    ) -> ImageProvisioner {
        let config = Config {
            image_timeout_secs: 1,
            image_delay_ms,
            ..Config::default()
        };
        ImageProvisioner::new(
            Arc::new(FakeGenerator { hang }),
            Arc::new(FakeFetcher { bytes }),
            ImageStore::new(dir),
            &config,
        )
    }

    #[test]
    fn test_prompt_uses_title_and_body_prefix() {
        let body = (1..=50).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let unit = ContentUnit::new(2, "Quyosh tizimi", body, LayoutType::TextWithImage);
        let prompt = ImageProvisioner::build_prompt(&unit);
        assert!(prompt.starts_with("Professional educational illustration about Quyosh tizimi: w1 "));
        assert!(prompt.contains("w30."));
        assert!(!prompt.contains("w31"));
    }

    #[tokio::test]
    async fn test_provision_sets_image_ref() {
        let dir = tempfile::tempdir().unwrap();
        let p = provisioner(dir.path(), false, PNG.to_vec());
        let mut unit = ContentUnit::new(2, "t", "b", LayoutType::TextWithImage);

        assert!(p.provision("job", &mut unit).await);
        let path = unit.image_ref.unwrap();
        assert!(path.ends_with("job/unit_002.png"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_timeout_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let p = provisioner(dir.path(), true, PNG.to_vec());
        let mut unit = ContentUnit::new(3, "t", "b", LayoutType::TextWithImage);

        let err = p.acquire("job", &unit).await.unwrap_err();
        assert!(matches!(err, ImageUnavailable::Timeout(1)));
        assert!(!p.provision("job", &mut unit).await);
        assert!(unit.image_ref.is_none());
    }

    #[tokio::test]
    async fn test_rejects_non_image_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let p = provisioner(dir.path(), false, b"<html>error</html>".to_vec());
        let unit = ContentUnit::new(2, "t", "b", LayoutType::TextWithImage);
        assert!(matches!(
            p.acquire("job", &unit).await,
            Err(ImageUnavailable::UnsupportedFormat)
        ));
    }

    #[tokio::test]
    async fn test_skips_layouts_without_image() {
        let dir = tempfile::tempdir().unwrap();
        let p = provisioner(dir.path(), false, PNG.to_vec());
        let mut units = vec![
            ContentUnit::new(1, "t", "", LayoutType::Title),
            ContentUnit::new(2, "t", "b", LayoutType::TextWithImage),
            ContentUnit::new(3, "t", "b", LayoutType::ThreeColumn),
        ];
        assert_eq!(p.provision_all("job", &mut units).await, 1);
        assert!(units[0].image_ref.is_none());
        assert!(units[1].image_ref.is_some());
        assert!(units[2].image_ref.is_none());
    }

    #[tokio::test]
    async fn test_delay_between_image_requests() {
        let dir = tempfile::tempdir().unwrap();
        let p = provisioner_with_delay(dir.path(), false, PNG.to_vec(), 60);
        let mut units = vec![
            ContentUnit::new(1, "t", "", LayoutType::Title),
            ContentUnit::new(2, "t", "b", LayoutType::TextWithImage),
            ContentUnit::new(3, "t", "b", LayoutType::TextWithImage),
            ContentUnit::new(4, "t", "b", LayoutType::TextWithImage),
        ];

        let started = std::time::Instant::now();
        assert_eq!(p.provision_all("job", &mut units).await, 3);
        // 三次请求之间两次间隔
        assert!(started.elapsed() >= Duration::from_millis(120));
    }
}
