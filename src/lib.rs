//! # Slide Forge
//!
//! 把一个主题变成完整的演示文稿（PPTX）或长文（DOCX）
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 只暴露能力，不认识业务
//! - `ImageStore` - 按任务隔离的临时图片目录
//! - `ooxml` - zip/XML 打包与原子落盘
//!
//! ### ② 协作方（Clients）
//! - `clients/` - 外部服务的 trait 与真实实现
//! - `LlmTextService` - 文本生成
//! - `HttpImageService` - 图片生成与下载
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `LayoutAssigner` - 按序号分配布局
//! - `ContentReshaper` - 把松散文本整理成布局要求的结构
//! - `ImageProvisioner` - 为单元配图，失败不影响任务
//! - `DocumentAssembler` - 渲染并落盘最终产物
//! - `TemplateRegistry` - 只读模板目录
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一个任务"的完整处理流程
//! - `JobCtx` - 上下文封装（job_id + 文档类型）
//! - `JobFlow` - 流程编排（生成 → 整理 → 配图 → 组装）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/job_runner` - 任务调度、并发控制、状态跟踪
//! - `orchestrator/app` - 应用入口

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{
    AssemblyError, GenerationFailure, ImageUnavailable, PipelineError, PipelineResult,
    ValidationError,
};
pub use models::{ContentUnit, Document, DocumentKind, GenerationJob, Language, LayoutType};
pub use orchestrator::{App, JobHandle, JobRunner, JobState};
pub use workflow::{Collaborators, JobCtx, JobFlow, JobRequest};
