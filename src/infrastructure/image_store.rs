//! 临时图片存储 - 基础设施层
//!
//! 每个任务一个目录，文件按单元序号命名，不同任务之间不会冲突

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::ImageFormat;

/// 临时图片存储
///
/// 职责：
/// - 决定图片落盘路径：`{root}/{job_id}/unit_{index:03}.{ext}`
/// - 任务结束时清理整个任务目录
/// - 不关心图片从哪里来
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.root.join(job_id)
    }

    pub fn unit_path(&self, job_id: &str, index: usize, format: ImageFormat) -> PathBuf {
        self.job_dir(job_id)
            .join(format!("unit_{:03}.{}", index, format.extension()))
    }

    /// 写入单元图片，返回文件路径
    pub async fn save(
        &self,
        job_id: &str,
        index: usize,
        format: ImageFormat,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let dir = self.job_dir(job_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("创建图片目录失败: {}", dir.display()))?;

        let path = self.unit_path(job_id, index, format);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("写入图片失败: {}", path.display()))?;

        debug!("图片已保存: {} ({} 字节)", path.display(), bytes.len());
        Ok(path)
    }

    /// 删除任务目录，目录不存在时视为成功
    pub async fn cleanup(&self, job_id: &str) -> Result<()> {
        let dir = self.job_dir(job_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!("已清理临时图片目录: {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("清理图片目录失败: {}", dir.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_path_is_namespaced() {
        let store = ImageStore::new("/tmp/images");
        assert_eq!(
            store.unit_path("job-a", 3, ImageFormat::Png),
            PathBuf::from("/tmp/images/job-a/unit_003.png")
        );
        assert_ne!(
            store.unit_path("job-a", 3, ImageFormat::Png),
            store.unit_path("job-b", 3, ImageFormat::Png)
        );
    }

    #[tokio::test]
    async fn test_save_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let path = store.save("job-1", 2, ImageFormat::Jpeg, b"data").await.unwrap();
        assert!(path.ends_with("job-1/unit_002.jpeg"));
        assert!(path.exists());

        store.cleanup("job-1").await.unwrap();
        assert!(!store.job_dir("job-1").exists());
        // 重复清理不报错
        store.cleanup("job-1").await.unwrap();
    }
}
