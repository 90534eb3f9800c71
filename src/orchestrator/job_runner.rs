//! 任务运行器 - 编排层
//!
//! ## 职责
//!
//! 1. **分配任务 ID**：每次提交创建独立的任务
//! 2. **并发控制**：使用 Semaphore 限制同时运行的任务数
//! 3. **状态跟踪**：通过 watch 通道发布 `JobState`
//! 4. **等待与取消**：`JobHandle` 可等待结果，也可发出取消信号，任务在下一个挂起点中止
//!
//! 不同任务之间没有共享的可变状态，只共享只读的模板目录

use std::sync::Arc;

use tokio::sync::{oneshot, watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{PipelineError, PipelineResult};
use crate::models::Document;
use crate::workflow::{JobCtx, JobFlow, JobRequest};

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_finished(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// 已提交任务的句柄
pub struct JobHandle {
    ctx: JobCtx,
    state_tx: Arc<watch::Sender<JobState>>,
    state_rx: watch::Receiver<JobState>,
    cancel_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<PipelineResult<Document>>,
    flow: Arc<JobFlow>,
}

impl JobHandle {
    pub fn job_id(&self) -> &str {
        &self.ctx.job_id
    }

    pub fn ctx(&self) -> &JobCtx {
        &self.ctx
    }

    /// 当前状态
    pub fn state(&self) -> JobState {
        *self.state_rx.borrow()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state_rx.clone()
    }

    /// 等待任务结束
    pub async fn wait(mut self) -> PipelineResult<Document> {
        let joined = (&mut self.task).await;
        match joined {
            Ok(result) => result,
            Err(e) => {
                if e.is_cancelled() {
                    warn!("{} ⚠️ 任务执行体被中止", self.ctx);
                } else {
                    error!("{} ❌ 任务执行体异常退出: {}", self.ctx, e);
                }
                self.flow.abandon(&self.ctx).await;
                self.state_tx.send_replace(JobState::Failed);
                if e.is_cancelled() {
                    Err(PipelineError::Cancelled)
                } else {
                    Err(PipelineError::Join(e.to_string()))
                }
            }
        }
    }

    /// 取消任务
    ///
    /// 任务在下一个挂起点中止；已经计费或已经结束的任务返回其原本结果
    pub async fn cancel(mut self) -> PipelineResult<Document> {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            info!("{} 🛑 请求取消任务", self.ctx);
            let _ = cancel_tx.send(());
        }
        self.wait().await
    }
}

/// 取消信号；句柄被丢弃时任务继续运行
async fn cancellation(cancel_rx: oneshot::Receiver<()>) {
    if cancel_rx.await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// 任务运行器
#[derive(Clone)]
pub struct JobRunner {
    flow: Arc<JobFlow>,
    semaphore: Arc<Semaphore>,
}

impl JobRunner {
    pub fn new(flow: Arc<JobFlow>, max_concurrent_jobs: usize) -> Self {
        Self {
            flow,
            semaphore: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    pub fn flow(&self) -> &JobFlow {
        &self.flow
    }

    /// 提交任务，立即返回句柄
    pub fn submit(&self, request: JobRequest) -> JobHandle {
        let job_id = Uuid::new_v4().simple().to_string();
        let ctx = JobCtx::new(job_id, request.job.document_kind, request.job.language);
        let (state_tx, state_rx) = watch::channel(JobState::Pending);
        let state_tx = Arc::new(state_tx);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        info!("{} 📥 任务已提交", ctx);

        let task = {
            let ctx = ctx.clone();
            let flow = self.flow.clone();
            let semaphore = self.semaphore.clone();
            let state_tx = state_tx.clone();
            tokio::spawn(async move {
                let mut cancelled = Box::pin(cancellation(cancel_rx));

                // 排队等待许可时也可以取消
                let permit = tokio::select! {
                    biased;
                    _ = &mut cancelled => None,
                    permit = semaphore.acquire_owned() => permit.ok(),
                };
                let Some(_permit) = permit else {
                    flow.abandon(&ctx).await;
                    state_tx.send_replace(JobState::Failed);
                    return Err(PipelineError::Cancelled);
                };
                state_tx.send_replace(JobState::Running);

                let result = flow.run_until(&ctx, &request, cancelled).await;
                state_tx.send_replace(match result {
                    Ok(_) => JobState::Succeeded,
                    Err(_) => JobState::Failed,
                });
                result
            })
        };

        JobHandle {
            ctx,
            state_tx,
            state_rx,
            cancel_tx: Some(cancel_tx),
            task,
            flow: self.flow.clone(),
        }
    }
}
