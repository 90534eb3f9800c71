use std::time::Duration;

use crate::services::content_reshaper::ReshapeConfig;
use crate::services::layout_assigner::LayoutCycle;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时运行的任务数量
    pub max_concurrent_jobs: usize,
    /// 单个任务允许的最大单元数
    pub max_unit_count: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单次调用失败后的重试次数
    pub llm_max_retries: usize,
    pub llm_retry_delay_ms: u64,
    // --- 图片生成配置 ---
    pub image_api_base_url: String,
    pub image_model_name: String,
    pub image_size: String,
    pub image_timeout_secs: u64,
    pub download_timeout_secs: u64,
    /// 同一任务内两次配图请求的间隔
    pub image_delay_ms: u64,
    // --- 生成流程 ---
    pub batch_size: usize,
    /// 两批之间的间隔
    pub batch_delay_ms: u64,
    pub layout_cycle: LayoutCycle,
    pub reshape: ReshapeConfig,
    // --- 目录 ---
    pub documents_dir: String,
    pub temp_dir: String,
    pub assets_dir: String,
    /// 可选的模板目录文件（TOML），为空时使用内置模板
    pub template_catalog: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            max_unit_count: 30,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 4000,
            llm_max_retries: 3,
            llm_retry_delay_ms: 2000,
            image_api_base_url: "https://api.openai.com/v1".to_string(),
            image_model_name: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            image_timeout_secs: 15,
            download_timeout_secs: 30,
            image_delay_ms: 1000,
            batch_size: 3,
            batch_delay_ms: 500,
            layout_cycle: LayoutCycle::default(),
            reshape: ReshapeConfig::default(),
            documents_dir: "generated_documents".to_string(),
            temp_dir: "temp".to_string(),
            assets_dir: "attached_assets".to_string(),
            template_catalog: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_jobs: env_parse("MAX_CONCURRENT_JOBS", default.max_concurrent_jobs),
            max_unit_count: env_parse("MAX_UNIT_COUNT", default.max_unit_count),
            verbose_logging: env_parse("VERBOSE_LOGGING", default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: env_parse("LLM_TEMPERATURE", default.llm_temperature),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS", default.llm_max_tokens),
            llm_max_retries: env_parse("LLM_MAX_RETRIES", default.llm_max_retries),
            llm_retry_delay_ms: env_parse("LLM_RETRY_DELAY_MS", default.llm_retry_delay_ms),
            image_api_base_url: std::env::var("IMAGE_API_BASE_URL").unwrap_or(default.image_api_base_url),
            image_model_name: std::env::var("IMAGE_MODEL_NAME").unwrap_or(default.image_model_name),
            image_size: std::env::var("IMAGE_SIZE").unwrap_or(default.image_size),
            image_timeout_secs: env_parse("IMAGE_TIMEOUT_SECS", default.image_timeout_secs),
            download_timeout_secs: env_parse("DOWNLOAD_TIMEOUT_SECS", default.download_timeout_secs),
            image_delay_ms: env_parse("IMAGE_DELAY_MS", default.image_delay_ms),
            batch_size: env_parse("BATCH_SIZE", default.batch_size).max(1),
            batch_delay_ms: env_parse("BATCH_DELAY_MS", default.batch_delay_ms),
            layout_cycle: std::env::var("LAYOUT_CYCLE")
                .ok()
                .and_then(|v| LayoutCycle::from_str(&v))
                .unwrap_or(default.layout_cycle),
            reshape: ReshapeConfig {
                min_bullet_chunk_words: env_parse("MIN_BULLET_CHUNK_WORDS", default.reshape.min_bullet_chunk_words),
                min_column_words: env_parse("MIN_COLUMN_WORDS", default.reshape.min_column_words),
            },
            documents_dir: std::env::var("DOCUMENTS_DIR").unwrap_or(default.documents_dir),
            temp_dir: std::env::var("TEMP_DIR").unwrap_or(default.temp_dir),
            assets_dir: std::env::var("ASSETS_DIR").unwrap_or(default.assets_dir),
            template_catalog: std::env::var("TEMPLATE_CATALOG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or(default.template_catalog),
        }
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn image_delay(&self) -> Duration {
        Duration::from_millis(self.image_delay_ms)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn llm_retry_delay(&self) -> Duration {
        Duration::from_millis(self.llm_retry_delay_ms)
    }
}

/// 解析环境变量，缺失或非法时使用默认值
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.batch_delay(), Duration::from_millis(500));
        assert_eq!(config.image_timeout(), Duration::from_secs(15));
        assert_eq!(config.reshape.min_column_words, 20);
        assert!(config.llm_api_key.is_empty());
    }

    #[test]
    fn test_env_parse_falls_back() {
        std::env::set_var("SLIDE_FORGE_TEST_BAD_NUMBER", "abc");
        assert_eq!(env_parse("SLIDE_FORGE_TEST_BAD_NUMBER", 7usize), 7);
        std::env::set_var("SLIDE_FORGE_TEST_GOOD_NUMBER", " 12 ");
        assert_eq!(env_parse("SLIDE_FORGE_TEST_GOOD_NUMBER", 7usize), 12);
    }
}
