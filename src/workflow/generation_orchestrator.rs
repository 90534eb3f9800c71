//! 演示文稿内容生成 - 流程层
//!
//! 核心职责：把任务拆成顺序批次，逐批请求文本生成服务，合并为有序的单元列表
//!
//! 流程顺序：
//! 1. 按批次大小切分 1..=unit_count
//! 2. 每批一次请求（提示词中写明每个单元的布局要求）
//! 3. 解析回复，缺失字段用占位补齐
//! 4. 批次之间固定间隔

use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::clients::{BatchParseError, GeneratedBatch, GeneratedUnit, GenerationPrompt, TextGenerationService};
use crate::config::Config;
use crate::error::GenerationFailure;
use crate::models::{ContentUnit, GenerationJob, Language, LayoutType};
use crate::services::content_reshaper::columns::COLUMN_SEPARATOR;
use crate::services::LayoutAssigner;
use crate::utils::logging::log_batch_start;
use crate::workflow::job_ctx::JobCtx;

const SYSTEM_PROMPT: &str = "You are an expert educational content writer. Reply with valid JSON only, no commentary.";

/// 批次生成编排器
///
/// - 批次严格顺序执行，保证上下文连贯
/// - 单元只按提交顺序追加，从不重排
/// - 调用失败即整体失败，已生成的批次直接丢弃
pub struct GenerationOrchestrator {
    text: Arc<dyn TextGenerationService>,
    assigner: LayoutAssigner,
    batch_size: usize,
    batch_delay: Duration,
}

impl GenerationOrchestrator {
    pub fn new(text: Arc<dyn TextGenerationService>, assigner: LayoutAssigner, config: &Config) -> Self {
        Self {
            text,
            assigner,
            batch_size: config.batch_size.max(1),
            batch_delay: config.batch_delay(),
        }
    }

    pub fn assigner(&self) -> &LayoutAssigner {
        &self.assigner
    }

    /// 生成全部单元
    pub async fn generate(
        &self,
        ctx: &JobCtx,
        job: &GenerationJob,
    ) -> Result<Vec<ContentUnit>, GenerationFailure> {
        let batches = batch_ranges(job.unit_count, self.batch_size);
        let mut units = Vec::with_capacity(job.unit_count);

        for (i, range) in batches.iter().enumerate() {
            if i > 0 {
                sleep(self.batch_delay).await;
            }
            let (first, last) = (*range.start(), *range.end());
            log_batch_start(ctx, i + 1, batches.len(), first, last);

            let batch = self.generate_batch(ctx, job, first, last).await?;
            units.extend(batch);
        }

        info!("{} ✓ 内容生成完成: {} 个单元", ctx, units.len());
        Ok(units)
    }

    async fn generate_batch(
        &self,
        ctx: &JobCtx,
        job: &GenerationJob,
        first: usize,
        last: usize,
    ) -> Result<Vec<ContentUnit>, GenerationFailure> {
        let prompt = self.build_prompt(job, first, last);
        debug!("{} 批次提示词:\n{}", ctx, prompt.user);

        let batch = self.text.request(&prompt).await.map_err(|e| {
            match e.downcast_ref::<BatchParseError>() {
                Some(parse) => GenerationFailure::Unparsable {
                    first,
                    last,
                    reason: parse.to_string(),
                },
                None => GenerationFailure::RequestFailed { first, last, source: e },
            }
        })?;

        if batch.units.is_empty() {
            return Err(GenerationFailure::Unparsable {
                first,
                last,
                reason: "单元列表为空".to_string(),
            });
        }

        Ok(self.merge_batch(ctx, first, last, batch, job.language))
    }

    /// 构建批次提示词
    pub fn build_prompt(&self, job: &GenerationJob, first: usize, last: usize) -> GenerationPrompt {
        let mut requirements = String::new();
        for index in first..=last {
            let layout = self.assigner.assign(index);
            let _ = writeln!(
                requirements,
                "Slide {} ({}): {}",
                index,
                layout,
                layout_constraint(layout)
            );
        }

        let user = format!(
            r#"Generate content for slides {first}-{last} of {total} for a presentation about "{topic}". {lang}.

CRITICAL LAYOUT REQUIREMENTS:
{requirements}
For each slide, provide:
- slide_number: {first} to {last}
- title: relevant slide title
- content: ALWAYS a single string, never an array or list
- layout_type: the layout named above

Return valid JSON: {{"slides": [{{"slide_number": {first}, "title": "...", "content": "...", "layout_type": "..."}}]}}"#,
            first = first,
            last = last,
            total = job.unit_count,
            topic = job.topic,
            lang = job.language.prompt_instruction(),
            requirements = requirements,
        );

        GenerationPrompt::new(SYSTEM_PROMPT, user)
    }

    /// 把一批回复对齐到请求的序号上
    ///
    /// 优先按 `slide_number` 匹配，其余按出现顺序补位；多余的单元丢弃
    fn merge_batch(
        &self,
        ctx: &JobCtx,
        first: usize,
        last: usize,
        batch: GeneratedBatch,
        language: Language,
    ) -> Vec<ContentUnit> {
        let mut numbered: HashMap<usize, GeneratedUnit> = HashMap::new();
        let mut unnumbered: VecDeque<GeneratedUnit> = VecDeque::new();
        for unit in batch.units {
            match unit.number() {
                Some(n) if (first..=last).contains(&n) && !numbered.contains_key(&n) => {
                    numbered.insert(n, unit);
                }
                Some(n) if !(first..=last).contains(&n) => {
                    warn!("{} ⚠️ 丢弃批次外的单元 {}", ctx, n);
                }
                _ => unnumbered.push_back(unit),
            }
        }

        let units = (first..=last)
            .map(|index| {
                let generated = numbered.remove(&index).or_else(|| unnumbered.pop_front());
                self.to_content_unit(ctx, index, generated, language)
            })
            .collect();

        if !unnumbered.is_empty() {
            warn!("{} ⚠️ 丢弃 {} 个多余单元", ctx, unnumbered.len());
        }
        units
    }

    fn to_content_unit(
        &self,
        ctx: &JobCtx,
        index: usize,
        generated: Option<GeneratedUnit>,
        language: Language,
    ) -> ContentUnit {
        let layout = self.assigner.assign(index);
        let Some(generated) = generated else {
            warn!("{} ⚠️ 单元 {} 缺失，使用占位内容", ctx, index);
            return ContentUnit::new(
                index,
                language.placeholder_title(index),
                language.placeholder_body(),
                layout,
            );
        };

        if let Some(returned) = generated.layout_type.as_deref().and_then(LayoutType::from_str) {
            if returned != layout {
                debug!("{} 单元 {} 返回布局 {}，按 {} 处理", ctx, index, returned, layout);
            }
        }

        let title = match generated.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => {
                warn!("{} ⚠️ 单元 {} 缺少标题", ctx, index);
                language.placeholder_title(index)
            }
        };
        let body = match content_to_string(generated.content.as_ref()) {
            Some(body) if !body.trim().is_empty() => body,
            _ => {
                warn!("{} ⚠️ 单元 {} 缺少正文", ctx, index);
                language.placeholder_body().to_string()
            }
        };

        ContentUnit::new(index, title, body, layout)
    }
}

/// 切分批次：`[1..=B], [B+1..=2B], ...`
pub fn batch_ranges(unit_count: usize, batch_size: usize) -> Vec<RangeInclusive<usize>> {
    let size = batch_size.max(1);
    (1..=unit_count)
        .step_by(size)
        .map(|start| start..=(start + size - 1).min(unit_count))
        .collect()
}

/// 各布局写入提示词的写作要求
pub fn layout_constraint(layout: LayoutType) -> String {
    match layout {
        LayoutType::Title => "a one-sentence subtitle introducing the topic".to_string(),
        LayoutType::BulletList => {
            "five distinct points, 70-80 words each, every point starting with '• '".to_string()
        }
        LayoutType::TextWithImage => {
            "one continuous paragraph of 80-100 words that also describes something worth illustrating".to_string()
        }
        LayoutType::ThreeColumn => format!(
            "three labeled segments in the exact format Header1{sep}Body1{sep}Header2{sep}Body2{sep}Header3{sep}Body3, each body at least 40 words",
            sep = COLUMN_SEPARATOR
        ),
        LayoutType::ThreeBullets => {
            "three points, 60-70 words each, every point starting with '• '".to_string()
        }
        LayoutType::FourNumbered => {
            "four numbered points (1. 2. 3. 4.), 50-60 words each, one per line".to_string()
        }
    }
}

/// 把协作方返回的 `content` 统一转成字符串
///
/// 数组按行拼接，对象序列化，null 视为缺失
pub fn content_to_string(content: Option<&Value>) -> Option<String> {
    match content? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| content_to_string(Some(item)))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentKind;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// 按顺序返回预设回复，并记录收到的提示词
    struct ScriptedText {
        replies: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedText {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerationService for ScriptedText {
        async fn complete(&self, prompt: &GenerationPrompt) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.user.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no more replies")))
        }
    }

    fn reply(numbers: RangeInclusive<usize>) -> Result<String> {
        let slides: Vec<Value> = numbers
            .map(|n| json!({"slide_number": n, "title": format!("T{}", n), "content": format!("Body {}", n)}))
            .collect();
        Ok(json!({ "slides": slides }).to_string())
    }

    fn orchestrator(text: Arc<ScriptedText>) -> GenerationOrchestrator {
        orchestrator_with_delay(text, 0)
    }

    fn orchestrator_with_delay(text: Arc<ScriptedText>, batch_delay_ms: u64) -> GenerationOrchestrator {
        let config = Config {
            batch_delay_ms,
            ..Config::default()
        };
        GenerationOrchestrator::new(text, LayoutAssigner::default(), &config)
    }

    fn ctx() -> JobCtx {
        JobCtx::new("test-job", DocumentKind::Deck, Language::English)
    }

    fn job(count: usize) -> GenerationJob {
        GenerationJob::new("Photosynthesis", count, Language::English, DocumentKind::Deck)
    }

    #[test]
    fn test_batch_ranges() {
        assert_eq!(batch_ranges(7, 3), vec![1..=3, 4..=6, 7..=7]);
        assert_eq!(batch_ranges(3, 3), vec![1..=3]);
        assert_eq!(batch_ranges(2, 0), vec![1..=1, 2..=2]);
    }

    #[test]
    fn test_content_to_string() {
        assert_eq!(content_to_string(Some(&json!("a"))), Some("a".to_string()));
        assert_eq!(content_to_string(Some(&json!(["a", "b"]))), Some("a\nb".to_string()));
        assert_eq!(content_to_string(Some(&json!({"k": 1}))), Some(r#"{"k":1}"#.to_string()));
        assert_eq!(content_to_string(Some(&Value::Null)), None);
        assert_eq!(content_to_string(None), None);
    }

    #[tokio::test]
    async fn test_generate_seven_units_in_order() {
        let text = Arc::new(ScriptedText::new(vec![reply(1..=3), reply(4..=6), reply(7..=7)]));
        let units = orchestrator(text.clone()).generate(&ctx(), &job(7)).await.unwrap();

        assert_eq!(units.iter().map(|u| u.index).collect::<Vec<_>>(), (1..=7).collect::<Vec<_>>());
        assert_eq!(
            units.iter().map(|u| u.layout_type).collect::<Vec<_>>(),
            vec![
                LayoutType::Title,
                LayoutType::TextWithImage,
                LayoutType::ThreeColumn,
                LayoutType::ThreeBullets,
                LayoutType::TextWithImage,
                LayoutType::FourNumbered,
                LayoutType::TextWithImage,
            ]
        );
        assert_eq!(units[6].raw_body, "Body 7");

        let prompts = text.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("Slide 3 (three_column)"));
        assert!(prompts[0].contains("|||"));
    }

    #[tokio::test]
    async fn test_partial_defects_get_placeholders() {
        let reply = json!({"slides": [
            {"slide_number": 2, "title": "  ", "content": ["• a", "• b"]},
            {"slide_number": 9, "title": "stray", "content": "x"}
        ]});
        let text = Arc::new(ScriptedText::new(vec![Ok(reply.to_string())]));
        let units = orchestrator(text).generate(&ctx(), &job(3)).await.unwrap();

        assert_eq!(units.len(), 3);
        assert_eq!(units[0].title, "Slide 1");
        assert_eq!(units[0].raw_body, "Content being generated...");
        assert_eq!(units[1].title, "Slide 2");
        assert_eq!(units[1].raw_body, "• a\n• b");
        assert_eq!(units[2].title, "Slide 3");
    }

    #[tokio::test]
    async fn test_unnumbered_units_fill_in_order() {
        let reply = json!({"units": [{"title": "A", "content": "a"}, {"title": "B", "content": "b"}]});
        let text = Arc::new(ScriptedText::new(vec![Ok(reply.to_string())]));
        let units = orchestrator(text).generate(&ctx(), &job(2)).await.unwrap();
        assert_eq!(units[0].title, "A");
        assert_eq!(units[1].title, "B");
    }

    #[tokio::test]
    async fn test_empty_list_is_unparsable() {
        let text = Arc::new(ScriptedText::new(vec![Ok(r#"{"slides": []}"#.to_string())]));
        let err = orchestrator(text).generate(&ctx(), &job(2)).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::Unparsable { first: 1, last: 2, .. }));
    }

    #[tokio::test]
    async fn test_invalid_reply_is_unparsable() {
        let text = Arc::new(ScriptedText::new(vec![Ok("sorry, I cannot".to_string())]));
        let err = orchestrator(text).generate(&ctx(), &job(2)).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::Unparsable { .. }));
    }

    #[tokio::test]
    async fn test_request_failure_discards_earlier_batches() {
        let text = Arc::new(ScriptedText::new(vec![reply(1..=3), Err(anyhow!("connection reset"))]));
        let err = orchestrator(text).generate(&ctx(), &job(5)).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::RequestFailed { first: 4, last: 5, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_batches() {
        let text = Arc::new(ScriptedText::new(vec![reply(1..=3), reply(4..=6), reply(7..=7)]));
        let started = tokio::time::Instant::now();
        let units = orchestrator_with_delay(text, 500)
            .generate(&ctx(), &job(7))
            .await
            .unwrap();

        assert_eq!(units.len(), 7);
        // 三个批次之间两次间隔，第一批之前不等待
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1500), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_batch_has_no_delay() {
        let text = Arc::new(ScriptedText::new(vec![reply(1..=3)]));
        let started = tokio::time::Instant::now();
        orchestrator_with_delay(text, 500)
            .generate(&ctx(), &job(3))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
