use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// 主题最短字符数
pub const MIN_TOPIC_CHARS: usize = 3;
/// 主题最长字符数
pub const MAX_TOPIC_CHARS: usize = 200;

/// 生成语言
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// 乌兹别克语
    #[default]
    Uzbek,
    /// 俄语
    Russian,
    /// 英语
    English,
}

impl Language {
    /// 语言代码
    pub fn code(self) -> &'static str {
        match self {
            Language::Uzbek => "uz",
            Language::Russian => "ru",
            Language::English => "en",
        }
    }

    /// 从语言代码或名称解析
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "uz" | "uzbek" => Some(Language::Uzbek),
            "ru" | "russian" => Some(Language::Russian),
            "en" | "english" => Some(Language::English),
            _ => None,
        }
    }

    /// 写入提示词的语言要求
    pub fn prompt_instruction(self) -> &'static str {
        match self {
            Language::Uzbek => "O'zbek tilida",
            Language::Russian => "На русском языке",
            Language::English => "In English",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 文档类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// 演示文稿
    #[default]
    Deck,
    /// 长文 A：独立作业
    #[serde(rename = "long-form-a")]
    IndependentWork,
    /// 长文 B：专题报告
    #[serde(rename = "long-form-b")]
    Referat,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Deck => "deck",
            DocumentKind::IndependentWork => "long-form-a",
            DocumentKind::Referat => "long-form-b",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "deck" | "presentation" => Some(DocumentKind::Deck),
            "long-form-a" | "independent_work" => Some(DocumentKind::IndependentWork),
            "long-form-b" | "referat" => Some(DocumentKind::Referat),
            _ => None,
        }
    }

    pub fn is_long_form(self) -> bool {
        !matches!(self, DocumentKind::Deck)
    }

    /// 产物扩展名
    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Deck => "pptx",
            _ => "docx",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 生成任务
///
/// 提交后不可变；任务 ID 由运行器分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub topic: String,
    pub unit_count: usize,
    pub language: Language,
    pub document_kind: DocumentKind,
}

impl GenerationJob {
    pub fn new(
        topic: impl Into<String>,
        unit_count: usize,
        language: Language,
        document_kind: DocumentKind,
    ) -> Self {
        Self {
            topic: topic.into().trim().to_string(),
            unit_count,
            language,
            document_kind,
        }
    }

    /// 校验任务参数
    pub fn validate(&self, max_unit_count: usize) -> Result<(), ValidationError> {
        let len = self.topic.trim().chars().count();
        if len < MIN_TOPIC_CHARS {
            return Err(ValidationError::TopicTooShort {
                len,
                min: MIN_TOPIC_CHARS,
            });
        }
        if len > MAX_TOPIC_CHARS {
            return Err(ValidationError::TopicTooLong {
                len,
                max: MAX_TOPIC_CHARS,
            });
        }
        if self.unit_count == 0 || self.unit_count > max_unit_count {
            return Err(ValidationError::UnitCountOutOfRange {
                count: self.unit_count,
                max: max_unit_count,
            });
        }
        Ok(())
    }
}

/// 根据页数上限换算长文章节数
pub fn sections_for_pages(kind: DocumentKind, max_pages: usize) -> usize {
    match kind {
        DocumentKind::IndependentWork => match max_pages {
            0..=15 => 6,
            16..=20 => 9,
            21..=25 => 12,
            _ => 15,
        },
        DocumentKind::Referat => match max_pages {
            0..=10 => 4,
            11..=12 => 5,
            _ => 6,
        },
        DocumentKind::Deck => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_topic_length() {
        let job = GenerationJob::new("  ab  ", 5, Language::English, DocumentKind::Deck);
        assert_eq!(
            job.validate(30),
            Err(ValidationError::TopicTooShort { len: 2, min: 3 })
        );

        let long = "x".repeat(201);
        let job = GenerationJob::new(long, 5, Language::English, DocumentKind::Deck);
        assert!(matches!(
            job.validate(30),
            Err(ValidationError::TopicTooLong { len: 201, .. })
        ));
    }

    #[test]
    fn test_validate_unit_count() {
        let job = GenerationJob::new("Biologiya", 0, Language::Uzbek, DocumentKind::Deck);
        assert!(job.validate(30).is_err());

        let job = GenerationJob::new("Biologiya", 31, Language::Uzbek, DocumentKind::Deck);
        assert!(job.validate(30).is_err());

        let job = GenerationJob::new("Biologiya", 30, Language::Uzbek, DocumentKind::Deck);
        assert!(job.validate(30).is_ok());
    }

    #[test]
    fn test_topic_uses_char_count() {
        // 西里尔字母按字符计数，而不是字节
        let job = GenerationJob::new("Мир", 3, Language::Russian, DocumentKind::Deck);
        assert!(job.validate(30).is_ok());
    }

    #[test]
    fn test_sections_for_pages() {
        assert_eq!(sections_for_pages(DocumentKind::IndependentWork, 15), 6);
        assert_eq!(sections_for_pages(DocumentKind::IndependentWork, 20), 9);
        assert_eq!(sections_for_pages(DocumentKind::IndependentWork, 25), 12);
        assert_eq!(sections_for_pages(DocumentKind::IndependentWork, 30), 15);
        assert_eq!(sections_for_pages(DocumentKind::Referat, 10), 4);
        assert_eq!(sections_for_pages(DocumentKind::Referat, 12), 5);
        assert_eq!(sections_for_pages(DocumentKind::Referat, 20), 6);
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!(Language::from_code("RU"), Some(Language::Russian));
        assert_eq!(Language::from_code("de"), None);
        assert_eq!(DocumentKind::from_str("referat"), Some(DocumentKind::Referat));
        assert_eq!(DocumentKind::from_str("long-form-a"), Some(DocumentKind::IndependentWork));
        assert!(DocumentKind::Referat.is_long_form());
    }
}
