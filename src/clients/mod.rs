//! 外部协作方
//!
//! 流水线只依赖这里的 trait；真实实现与测试替身都实现这些 trait

pub mod asset_store;
pub mod image_client;
pub mod llm_client;
pub mod sinks;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::{DocumentKind, Template};

pub use asset_store::FsAssetStore;
pub use image_client::HttpImageService;
pub use llm_client::LlmTextService;
pub use sinks::{TracingBilling, TracingStatusSink};

/// 一次文本生成请求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPrompt {
    pub system: Option<String>,
    pub user: String,
}

impl GenerationPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
        }
    }
}

/// 协作方返回的单个单元，所有字段都可能缺失
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratedUnit {
    #[serde(default)]
    pub slide_number: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub layout_type: Option<String>,
}

impl GeneratedUnit {
    pub fn new(number: usize, title: &str, content: &str) -> Self {
        Self {
            slide_number: Some(Value::from(number)),
            title: Some(title.to_string()),
            content: Some(Value::from(content)),
            layout_type: None,
        }
    }

    /// 单元序号，接受数字或数字字符串
    pub fn number(&self) -> Option<usize> {
        match self.slide_number.as_ref()? {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// 一次请求返回的单元列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedBatch {
    pub units: Vec<GeneratedUnit>,
}

/// 回复无法解析为单元列表
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchParseError {
    #[error("回复中没有 JSON 对象")]
    NoJson,
    #[error("JSON 解析失败: {0}")]
    InvalidJson(String),
    #[error("回复中没有单元列表")]
    NoUnitList,
}

/// 从模型回复中提取单元列表
///
/// 容忍代码块包裹；列表可位于 `slides`、`units` 或 `sections` 键下，也可以是顶层数组
pub fn parse_batch(reply: &str) -> Result<GeneratedBatch, BatchParseError> {
    let json = extract_json(reply).ok_or(BatchParseError::NoJson)?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| BatchParseError::InvalidJson(e.to_string()))?;

    let list = match &value {
        Value::Array(items) => items,
        Value::Object(map) => ["slides", "units", "sections"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .ok_or(BatchParseError::NoUnitList)?,
        _ => return Err(BatchParseError::NoUnitList),
    };

    let units = list
        .iter()
        .filter_map(|item| match serde_json::from_value::<GeneratedUnit>(item.clone()) {
            Ok(unit) => Some(unit),
            Err(e) => {
                warn!("⚠️ 跳过无法解析的单元: {}", e);
                None
            }
        })
        .collect();

    Ok(GeneratedBatch { units })
}

fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find(['{', '['])?;
    let close = if reply[start..].starts_with('{') { '}' } else { ']' };
    let end = reply.rfind(close)?;
    (end >= start).then(|| &reply[start..=end])
}

/// 文本生成服务
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// 纯文本补全，重试策略由实现自行负责
    async fn complete(&self, prompt: &GenerationPrompt) -> Result<String>;

    /// 结构化请求：返回单元列表
    async fn request(&self, prompt: &GenerationPrompt) -> Result<GeneratedBatch> {
        let reply = self.complete(prompt).await?;
        Ok(parse_batch(&reply)?)
    }
}

/// 图片生成服务：返回图片 URL
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// 图片下载服务：返回图片字节
#[async_trait]
pub trait ImageFetchService: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// 模板背景资源读取
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// 模板无背景或文件不存在时返回 `Ok(None)`
    async fn read(&self, template: &Template) -> Result<Option<Vec<u8>>>;
}

/// 对外报告的任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 订单状态回写
#[async_trait]
pub trait JobStatusSink: Send + Sync {
    async fn update(&self, job_id: &str, status: JobStatus, artifact: Option<&Path>) -> Result<()>;
}

/// 计费，只在任务成功后调用
#[async_trait]
pub trait BillingSink: Send + Sync {
    async fn charge(&self, job_id: &str, kind: DocumentKind, unit_count: usize) -> Result<()>;
}
