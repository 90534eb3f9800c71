//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：加载模板目录、创建协作方、组装流程
//! 2. **任务提交**：交给 `JobRunner` 调度
//! 3. **资源管理**：持有唯一的模板目录实例，只读共享给所有任务

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::models::Document;
use crate::orchestrator::job_runner::{JobHandle, JobRunner};
use crate::services::TemplateRegistry;
use crate::utils::logging::log_startup;
use crate::workflow::{Collaborators, JobFlow, JobRequest};

/// 应用主结构
pub struct App {
    config: Config,
    templates: Arc<TemplateRegistry>,
    runner: JobRunner,
}

impl App {
    /// 使用真实协作方初始化
    pub fn initialize(config: Config) -> Result<Self> {
        let collaborators = Collaborators::from_config(&config);
        Self::with_collaborators(config, collaborators)
    }

    /// 使用指定协作方初始化
    pub fn with_collaborators(config: Config, collaborators: Collaborators) -> Result<Self> {
        log_startup(config.max_concurrent_jobs, config.batch_size);

        let templates = Arc::new(TemplateRegistry::load(
            config.template_catalog.as_deref().map(Path::new),
        )?);
        info!("🎨 可用模板: {} 个", templates.all().len());

        let flow = Arc::new(JobFlow::new(&config, collaborators, templates.clone()));
        let runner = JobRunner::new(flow, config.max_concurrent_jobs);

        Ok(Self {
            config,
            templates,
            runner,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn runner(&self) -> &JobRunner {
        &self.runner
    }

    /// 提交任务
    pub fn submit(&self, request: JobRequest) -> JobHandle {
        self.runner.submit(request)
    }

    /// 提交并等待任务完成
    pub async fn run(&self, request: JobRequest) -> Result<Document> {
        let document = self.submit(request).wait().await?;
        Ok(document)
    }
}
