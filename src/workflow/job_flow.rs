//! 任务处理流程 - 流程层
//!
//! 核心职责：定义"一个任务"的完整处理流程
//!
//! 流程顺序：
//! 1. 参数校验 → 回写 pending
//! 2. 演示文稿：生成 → 整理 → 配图 → 组装
//!    长文：大纲 → 章节 → 参考文献 → 组装
//! 3. 清理临时图片 → 计费 → 回写 completed
//! 4. 失败或取消：删除已登记的产物，清理临时图片，回写 failed

use std::future::Future;
use std::sync::{Arc, OnceLock};

use tracing::{error, info, warn};

use crate::clients::{
    AssetStore, BillingSink, FsAssetStore, HttpImageService, ImageFetchService,
    ImageGenerationService, JobStatus, JobStatusSink, LlmTextService, TextGenerationService,
    TracingBilling, TracingStatusSink,
};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::infrastructure::{ImageStore, PendingArtifact};
use crate::models::{Document, GenerationJob};
use crate::services::{
    ContentReshaper, DocumentAssembler, ImageProvisioner, LayoutAssigner, PreparedDocument,
    ReshapeConfig, TemplateRegistry,
};
use crate::utils::logging::{log_job_complete, log_job_start, truncate_text};
use crate::workflow::generation_orchestrator::GenerationOrchestrator;
use crate::workflow::job_ctx::JobCtx;
use crate::workflow::long_form::LongFormOrchestrator;

/// 外部提交的任务请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub job: GenerationJob,
    /// 仅演示文稿使用；未知 id 使用默认模板
    pub template_id: String,
    pub author: String,
}

impl JobRequest {
    pub fn new(job: GenerationJob, template_id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            job,
            template_id: template_id.into(),
            author: author.into(),
        }
    }
}

/// 流程依赖的全部外部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub text: Arc<dyn TextGenerationService>,
    pub image_generator: Arc<dyn ImageGenerationService>,
    pub image_fetcher: Arc<dyn ImageFetchService>,
    pub assets: Arc<dyn AssetStore>,
    pub status: Arc<dyn JobStatusSink>,
    pub billing: Arc<dyn BillingSink>,
}

impl Collaborators {
    /// 按配置创建真实实现
    pub fn from_config(config: &Config) -> Self {
        let images = Arc::new(HttpImageService::new(config));
        Self {
            text: Arc::new(LlmTextService::new(config)),
            image_generator: images.clone(),
            image_fetcher: images,
            assets: Arc::new(FsAssetStore::new(&config.assets_dir)),
            status: Arc::new(TracingStatusSink),
            billing: Arc::new(TracingBilling),
        }
    }
}

/// 任务处理流程
///
/// - 编排单个任务的完整流程
/// - 决定何时生成、何时整理、何时组装
/// - 只依赖业务能力（services）和协作方 trait
pub struct JobFlow {
    max_unit_count: usize,
    reshape: ReshapeConfig,
    generation: GenerationOrchestrator,
    long_form: LongFormOrchestrator,
    provisioner: ImageProvisioner,
    assembler: DocumentAssembler,
    status: Arc<dyn JobStatusSink>,
    billing: Arc<dyn BillingSink>,
}

impl JobFlow {
    pub fn new(config: &Config, collaborators: Collaborators, templates: Arc<TemplateRegistry>) -> Self {
        let Collaborators {
            text,
            image_generator,
            image_fetcher,
            assets,
            status,
            billing,
        } = collaborators;

        Self {
            max_unit_count: config.max_unit_count,
            reshape: config.reshape,
            generation: GenerationOrchestrator::new(
                text.clone(),
                LayoutAssigner::new(config.layout_cycle),
                config,
            ),
            long_form: LongFormOrchestrator::new(text, config),
            provisioner: ImageProvisioner::new(
                image_generator,
                image_fetcher,
                ImageStore::new(&config.temp_dir),
                config,
            ),
            assembler: DocumentAssembler::new(templates, assets, &config.documents_dir),
            status,
            billing,
        }
    }

    pub fn image_store(&self) -> &ImageStore {
        self.provisioner.store()
    }

    /// 执行一个任务，返回最终产物
    pub async fn run(&self, ctx: &JobCtx, request: &JobRequest) -> PipelineResult<Document> {
        self.run_until(ctx, request, std::future::pending()).await
    }

    /// 执行一个任务；`cancelled` 先完成时，任务在当前挂起点中止
    ///
    /// 计费返回后进入收尾阶段，不再响应取消
    pub async fn run_until(
        &self,
        ctx: &JobCtx,
        request: &JobRequest,
        cancelled: impl Future<Output = ()>,
    ) -> PipelineResult<Document> {
        let job = &request.job;
        log_job_start(ctx, &truncate_text(&job.topic, 80), job.unit_count);

        let artifact = OnceLock::new();
        let outcome = tokio::select! {
            biased;
            _ = cancelled => Err(PipelineError::Cancelled),
            result = self.produce(ctx, request, &artifact) => result,
        };

        match outcome {
            Ok(document) => {
                log_job_complete(ctx, document.slide_count, &document.path);
                self.report(ctx, JobStatus::Completed, Some(&document)).await;
                Ok(document)
            }
            Err(e) => {
                if let Some(artifact) = artifact.get() {
                    if let Err(err) = artifact.discard().await {
                        warn!("{} ⚠️ 删除未完成的产物失败: {}", ctx, err);
                    }
                }
                self.cleanup(ctx).await;
                match &e {
                    PipelineError::Cancelled => warn!("{} ⚠️ 任务已取消", ctx),
                    _ => error!("{} ❌ 任务失败: {}", ctx, e),
                }
                self.report(ctx, JobStatus::Failed, None).await;
                Err(e)
            }
        }
    }

    /// 任务未能正常走完（开始前被取消或执行体异常）：清理临时文件并回写失败
    pub async fn abandon(&self, ctx: &JobCtx) {
        warn!("{} ⚠️ 任务已放弃", ctx);
        self.cleanup(ctx).await;
        self.report(ctx, JobStatus::Failed, None).await;
    }

    /// 可取消阶段：生成、落盘、清理、计费
    async fn produce(
        &self,
        ctx: &JobCtx,
        request: &JobRequest,
        artifact: &OnceLock<PendingArtifact>,
    ) -> PipelineResult<Document> {
        let job = &request.job;
        let document = self.execute(ctx, request, artifact).await?;
        self.cleanup(ctx).await;

        if let Err(e) = self
            .billing
            .charge(&ctx.job_id, job.document_kind, job.unit_count)
            .await
        {
            warn!("{} ⚠️ 计费回写失败: {}", ctx, e);
        }
        Ok(document)
    }

    async fn execute(
        &self,
        ctx: &JobCtx,
        request: &JobRequest,
        artifact: &OnceLock<PendingArtifact>,
    ) -> PipelineResult<Document> {
        let job = &request.job;
        job.validate(self.max_unit_count)?;
        self.report(ctx, JobStatus::Pending, None).await;

        if job.document_kind.is_long_form() {
            let content = self.long_form.generate(ctx, job).await?;
            let prepared = self.assembler.prepare_long_form(
                &content.sections,
                &content.references,
                job.document_kind,
                &job.topic,
                job.language,
            )?;
            return self.persist(prepared, artifact).await;
        }

        let mut units = self.generation.generate(ctx, job).await?;

        ContentReshaper::new(self.reshape, job.language).reshape_all(&mut units);
        info!("{} 🧩 内容整理完成", ctx);

        self.provisioner.provision_all(&ctx.job_id, &mut units).await;

        let prepared = self
            .assembler
            .prepare(
                &units,
                &request.template_id,
                &job.topic,
                &request.author,
                job.language,
            )
            .await?;
        self.persist(prepared, artifact).await
    }

    /// 落盘前先登记产物路径，中止后由 `run_until` 删除
    async fn persist(
        &self,
        prepared: PreparedDocument,
        artifact: &OnceLock<PendingArtifact>,
    ) -> PipelineResult<Document> {
        let _ = artifact.set(prepared.artifact().clone());
        Ok(prepared.persist().await?)
    }

    async fn cleanup(&self, ctx: &JobCtx) {
        if let Err(e) = self.image_store().cleanup(&ctx.job_id).await {
            warn!("{} ⚠️ 清理临时图片失败: {}", ctx, e);
        }
    }

    async fn report(&self, ctx: &JobCtx, status: JobStatus, document: Option<&Document>) {
        let artifact = document.map(|d| d.path.as_path());
        if let Err(e) = self.status.update(&ctx.job_id, status, artifact).await {
            warn!("{} ⚠️ 状态回写失败: {}", ctx, e);
        }
    }
}
