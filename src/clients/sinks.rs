//! 默认的状态回写与计费实现：只写日志

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::{BillingSink, JobStatus, JobStatusSink};
use crate::models::DocumentKind;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusSink;

#[async_trait]
impl JobStatusSink for TracingStatusSink {
    async fn update(&self, job_id: &str, status: JobStatus, artifact: Option<&Path>) -> Result<()> {
        match artifact {
            Some(path) => info!("📮 任务 {} 状态: {} ({})", job_id, status, path.display()),
            None => info!("📮 任务 {} 状态: {}", job_id, status),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBilling;

#[async_trait]
impl BillingSink for TracingBilling {
    async fn charge(&self, job_id: &str, kind: DocumentKind, unit_count: usize) -> Result<()> {
        info!("💰 任务 {} 计费: {} x {}", job_id, kind, unit_count);
        Ok(())
    }
}
