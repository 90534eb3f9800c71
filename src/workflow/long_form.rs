//! 长文内容生成 - 流程层
//!
//! 流程顺序：
//! 1. 大纲（一次 JSON 请求）
//! 2. 逐章正文（每章一次纯文本请求，顺序执行）
//! 3. 参考文献（失败时使用占位）

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::clients::{BatchParseError, GenerationPrompt, TextGenerationService};
use crate::config::Config;
use crate::error::GenerationFailure;
use crate::models::{DocumentKind, GenerationJob, Language, Section};
use crate::services::content_reshaper::items::clean_item;
use crate::utils::text::collapse_whitespace;
use crate::workflow::job_ctx::JobCtx;

/// 参考文献条数
pub const REFERENCE_COUNT: usize = 8;

const SYSTEM_PROMPT: &str = "You are an experienced academic writer helping students prepare coursework.";

/// 长文生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongFormContent {
    pub sections: Vec<Section>,
    pub references: Vec<String>,
}

/// 长文生成编排器
pub struct LongFormOrchestrator {
    text: Arc<dyn TextGenerationService>,
    delay: Duration,
}

impl LongFormOrchestrator {
    pub fn new(text: Arc<dyn TextGenerationService>, config: &Config) -> Self {
        Self {
            text,
            delay: config.batch_delay(),
        }
    }

    pub async fn generate(
        &self,
        ctx: &JobCtx,
        job: &GenerationJob,
    ) -> Result<LongFormContent, GenerationFailure> {
        let titles = self.outline(ctx, job).await?;
        info!("{} 📑 大纲: {} 个章节", ctx, titles.len());

        let mut sections = Vec::with_capacity(titles.len());
        for (i, title) in titles.into_iter().enumerate() {
            let index = i + 1;
            if i > 0 {
                sleep(self.delay).await;
            }
            info!("{} ✍️ 正在撰写第 {}/{} 章: {}", ctx, index, job.unit_count, title);

            let prompt = section_prompt(job, index, &title);
            let reply = self
                .text
                .complete(&prompt)
                .await
                .map_err(|source| GenerationFailure::Section { index, source })?;

            let mut body = collapse_whitespace(&reply);
            if body.is_empty() {
                warn!("{} ⚠️ 第 {} 章正文为空，使用占位", ctx, index);
                body = job.language.placeholder_body().to_string();
            }
            sections.push(Section { index, title, body });
        }

        sleep(self.delay).await;
        let references = self.references(ctx, job).await;

        Ok(LongFormContent { sections, references })
    }

    /// 章节标题：多余的截断，缺失的补占位
    async fn outline(&self, ctx: &JobCtx, job: &GenerationJob) -> Result<Vec<String>, GenerationFailure> {
        let batch = self
            .text
            .request(&outline_prompt(job))
            .await
            .map_err(GenerationFailure::Outline)?;

        if batch.units.is_empty() {
            return Err(GenerationFailure::Outline(BatchParseError::NoUnitList.into()));
        }

        let total = job.unit_count;
        let mut returned = batch.units.into_iter().map(|u| u.title);
        let titles = (1..=total)
            .map(|index| match returned.next().flatten() {
                Some(title) if !title.trim().is_empty() => title.trim().to_string(),
                _ => {
                    warn!("{} ⚠️ 大纲缺少第 {} 章标题", ctx, index);
                    job.language.placeholder_section_title(index, total)
                }
            })
            .collect();
        Ok(titles)
    }

    /// 参考文献，失败不影响任务
    async fn references(&self, ctx: &JobCtx, job: &GenerationJob) -> Vec<String> {
        match self.text.complete(&references_prompt(job)).await {
            Ok(reply) => {
                let references = parse_references(&reply);
                if references.is_empty() {
                    warn!("{} ⚠️ 参考文献为空，使用占位", ctx);
                    placeholder_references(job.language)
                } else {
                    debug!("{} 参考文献: {} 条", ctx, references.len());
                    references
                }
            }
            Err(e) => {
                warn!("{} ⚠️ 参考文献生成失败，使用占位: {}", ctx, e);
                placeholder_references(job.language)
            }
        }
    }
}

fn kind_name(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Referat => "research paper (referat)",
        _ => "independent work",
    }
}

fn outline_prompt(job: &GenerationJob) -> GenerationPrompt {
    GenerationPrompt::new(
        SYSTEM_PROMPT,
        format!(
            r#"{lang}. Plan a {kind} about "{topic}" with exactly {count} sections.
The first section is the introduction and the last is the conclusion.
Return valid JSON only: {{"sections": [{{"title": "Section title"}}]}}"#,
            lang = job.language.prompt_instruction(),
            kind = kind_name(job.document_kind),
            topic = job.topic,
            count = job.unit_count,
        ),
    )
}

fn section_prompt(job: &GenerationJob, index: usize, title: &str) -> GenerationPrompt {
    GenerationPrompt::new(
        SYSTEM_PROMPT,
        format!(
            r#"{lang}. Write section {index} of {count}, "{title}", of a {kind} about "{topic}".
Write 400-500 words of continuous academic prose. Plain text only, no headings, no lists."#,
            lang = job.language.prompt_instruction(),
            index = index,
            count = job.unit_count,
            title = title,
            kind = kind_name(job.document_kind),
            topic = job.topic,
        ),
    )
}

fn references_prompt(job: &GenerationJob) -> GenerationPrompt {
    GenerationPrompt::new(
        SYSTEM_PROMPT,
        format!(
            r#"{lang}. List {n} literature references for a {kind} about "{topic}".
One reference per line, formatted as: Author. Title. City: Publisher, Year."#,
            lang = job.language.prompt_instruction(),
            n = REFERENCE_COUNT,
            kind = kind_name(job.document_kind),
            topic = job.topic,
        ),
    )
}

/// 按行拆分参考文献，去掉行首编号，最多保留 8 条
pub fn parse_references(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(clean_item)
        .filter(|line| !line.is_empty())
        .take(REFERENCE_COUNT)
        .collect()
}

pub fn placeholder_references(language: Language) -> Vec<String> {
    (1..=REFERENCE_COUNT)
        .map(|n| language.placeholder_reference(n))
        .collect()
}
