//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 加载模板目录，创建协作方
//! - 持有唯一的 `JobRunner`
//!
//! ### `job_runner` - 任务运行器
//! - 为每个任务分配 ID 和状态通道
//! - 控制并发数量（Semaphore）
//! - 返回可等待、可取消的 `JobHandle`
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! job_runner (调度多个任务)
//!     ↓
//! workflow::JobFlow (处理单个任务)
//!     ↓
//! services (能力层：layout / reshape / image / assemble)
//!     ↓
//! infrastructure (基础设施：ImageStore / ooxml)
//! ```

pub mod app;
pub mod job_runner;

pub use app::App;
pub use job_runner::{JobHandle, JobRunner, JobState};
