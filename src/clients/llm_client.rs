//! LLM 文本生成客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{GenerationPrompt, TextGenerationService};
use crate::config::Config;

/// LLM 文本生成服务
///
/// 职责：
/// - 调用聊天补全接口
/// - 失败时按配置重试
/// - 不关心单元、批次与布局
pub struct LlmTextService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: usize,
    retry_delay: Duration,
}

impl LlmTextService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            max_retries: config.llm_max_retries,
            retry_delay: config.llm_retry_delay(),
        }
    }

    /// 单次调用，不重试
    async fn send_once(&self, prompt: &GenerationPrompt) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", prompt.user.chars().count());

        let mut messages = Vec::new();

        if let Some(system) = &prompt.system {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(system.as_str())
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.user.as_str())
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| anyhow!("LLM API 调用失败: {}", e))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl TextGenerationService for LlmTextService {
    async fn complete(&self, prompt: &GenerationPrompt) -> Result<String> {
        let attempts = self.max_retries + 1;
        let mut last_err = anyhow!("LLM 未被调用");

        for attempt in 1..=attempts {
            match self.send_once(prompt).await {
                Ok(content) => {
                    debug!("LLM API 调用成功 (第 {} 次尝试)", attempt);
                    return Ok(content);
                }
                Err(e) => {
                    warn!("LLM 调用失败 (尝试 {}/{}): {}", attempt, attempts, e);
                    last_err = e;
                    if attempt < attempts {
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(last_err.context(format!("LLM 调用失败，已尝试 {} 次", attempts)))
    }
}
