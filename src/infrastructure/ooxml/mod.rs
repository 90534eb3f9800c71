//! OOXML 打包 - 基础设施层
//!
//! 只负责把 XML 部件和媒体写进 zip 包并安全落盘，不认识单元和布局

pub mod docx;
pub mod pptx;

use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::AssemblyError;

pub use docx::{DocxBuilder, DocxParagraph};
pub use pptx::build_pptx;

pub(crate) const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// 内存中的 zip 包
pub struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl Package {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// 添加一个部件
    pub fn add(&mut self, name: &str, data: &[u8]) -> Result<(), AssemblyError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(data)?;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, AssemblyError> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

/// XML 文本转义
pub fn xml_escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// 即将落盘的产物
///
/// 写入在阻塞线程里一次完成：调用方被中止时，写入仍会走完（成功或清理干净），
/// 而 `discard` 会等进行中的写入结束后再删除
#[derive(Debug, Clone)]
pub struct PendingArtifact {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl PendingArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 先写临时文件再改名，失败时不留下半成品
    pub async fn write(&self, bytes: Vec<u8>) -> Result<(), AssemblyError> {
        let guard = self.lock.clone().lock_owned().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            write_then_rename(&path, &bytes)
        })
        .await
        .map_err(|e| AssemblyError::Io(std::io::Error::other(e.to_string())))??;
        Ok(())
    }

    /// 删除产物及可能残留的临时文件
    pub async fn discard(&self) -> std::io::Result<()> {
        let _guard = self.lock.lock().await;
        for path in [part_path(&self.path), self.path.clone()] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("🗑️ 已删除产物: {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

fn write_then_rename(path: &Path, bytes: &[u8]) -> Result<(), AssemblyError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let part = part_path(path);
    let written = std::fs::write(&part, bytes).and_then(|_| std::fs::rename(&part, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&part);
        return Err(AssemblyError::Io(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_package_roundtrip_entry() {
        let mut package = Package::new();
        package.add("a/b.xml", b"<x/>").unwrap();
        let bytes = package.finish().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive
            .by_name("a/b.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<x/>");
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[tokio::test]
    async fn test_write_leaves_no_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/doc.pptx");
        PendingArtifact::new(&path).write(b"payload".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
        assert!(!part_path(&path).exists());
    }

    #[tokio::test]
    async fn test_discard_removes_written_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = PendingArtifact::new(dir.path().join("doc.docx"));
        std::fs::write(part_path(artifact.path()), b"half").unwrap();
        artifact.write(b"payload".to_vec()).await.unwrap();
        assert!(artifact.path().exists());

        artifact.discard().await.unwrap();
        assert!(!artifact.path().exists());
        assert!(!part_path(artifact.path()).exists());

        // 没有写过也可以丢弃
        artifact.discard().await.unwrap();
    }

    #[tokio::test]
    async fn test_aborted_write_still_finishes_before_discard() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = PendingArtifact::new(dir.path().join("out/doc.pptx"));

        let writer = {
            let artifact = artifact.clone();
            tokio::spawn(async move { artifact.write(vec![7u8; 4 * 1024 * 1024]).await })
        };
        tokio::task::yield_now().await;
        writer.abort();
        let _ = writer.await;

        artifact.discard().await.unwrap();
        assert!(!artifact.path().exists());
        assert!(!part_path(artifact.path()).exists());
    }
}
