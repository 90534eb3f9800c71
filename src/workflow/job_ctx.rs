//! 任务上下文
//!
//! 封装"我正在处理哪个任务"这一信息，用作日志前缀

use std::fmt::Display;

use crate::models::{DocumentKind, Language};

/// 任务上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 任务ID
    pub job_id: String,

    /// 文档类型
    pub kind: DocumentKind,

    /// 生成语言
    pub language: Language,
}

impl JobCtx {
    pub fn new(job_id: impl Into<String>, kind: DocumentKind, language: Language) -> Self {
        Self {
            job_id: job_id.into(),
            kind,
            language,
        }
    }

    /// 日志中显示的短 ID
    pub fn short_id(&self) -> &str {
        match self.job_id.char_indices().nth(8) {
            Some((end, _)) => &self.job_id[..end],
            None => &self.job_id,
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[job {} {}]", self.short_id(), self.kind)
    }
}
