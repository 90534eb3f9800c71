//! 本地文件系统上的模板背景资源

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::AssetStore;
use crate::models::Template;

pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn read(&self, template: &Template) -> Result<Option<Vec<u8>>> {
        let Some(asset) = &template.background_asset else {
            return Ok(None);
        };
        let path = self.root.join(asset);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!("读取模板背景 {} ({} 字节)", path.display(), bytes.len());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("⚠️ 模板 {} 的背景文件不存在: {}", template.id, path.display());
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("读取背景文件失败: {}", path.display())),
        }
    }
}
