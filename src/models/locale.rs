//! 本地化文案
//!
//! 流水线自己合成的所有文字（占位、补齐、标题页等）都从这里取

use super::job::{DocumentKind, Language};
use super::unit::Column;

impl Language {
    /// 缺失标题时的占位
    pub fn placeholder_title(self, index: usize) -> String {
        match self {
            Language::Uzbek => format!("Slayd {}", index),
            Language::Russian => format!("Слайд {}", index),
            Language::English => format!("Slide {}", index),
        }
    }

    /// 缺失正文时的占位
    pub fn placeholder_body(self) -> &'static str {
        match self {
            Language::Uzbek => "Mazmun yaratilmoqda...",
            Language::Russian => "Содержание создаётся...",
            Language::English => "Content being generated...",
        }
    }

    /// 要点不足时的补齐条目
    pub fn padding_item(self, n: usize) -> String {
        match self {
            Language::Uzbek => format!("Qo'shimcha ma'lumot {}", n),
            Language::Russian => format!("Дополнительная информация {}", n),
            Language::English => format!("Additional information {}", n),
        }
    }

    /// 栏目正文过短时追加的说明句
    pub fn elaboration(self) -> &'static str {
        match self {
            Language::Uzbek => {
                "Ushbu yo'nalish bo'yicha qo'shimcha tushuntirishlar, misollar va amaliy xulosalar mavzuni chuqurroq anglashga yordam beradi."
            }
            Language::Russian => {
                "Дополнительные пояснения, примеры и практические выводы по этому направлению помогают глубже понять тему."
            }
            Language::English => {
                "Further explanation, examples and practical conclusions on this aspect help build a deeper understanding of the topic."
            }
        }
    }

    /// 分隔符格式中缺失标题时的默认栏目标题
    pub fn separator_headers(self) -> [&'static str; 3] {
        match self {
            Language::Uzbek => ["Asosiy Jihat", "Qo'shimcha Ma'lumot", "Muhim Nuqta"],
            Language::Russian => ["Основной аспект", "Дополнительные сведения", "Важный момент"],
            Language::English => ["Key Aspect", "Additional Details", "Important Point"],
        }
    }

    /// 栏目不足三个时的补齐栏
    pub fn filler_column(self, position: usize) -> Column {
        let header = self
            .separator_headers()
            .get(position)
            .map(|h| h.to_string())
            .unwrap_or_else(|| self.column_label(position + 1));
        Column::new(header, self.elaboration())
    }

    fn column_label(self, n: usize) -> String {
        match self {
            Language::Uzbek => format!("Ustun {}", n),
            Language::Russian => format!("Колонка {}", n),
            Language::English => format!("Column {}", n),
        }
    }

    /// 标题页主标题
    pub fn deck_heading(self) -> &'static str {
        match self {
            Language::Uzbek => "Taqdimot",
            Language::Russian => "Презентация",
            Language::English => "Presentation",
        }
    }

    /// 未提供作者时的签名行
    pub fn author_line(self, author: &str) -> String {
        let author = author.trim();
        if author.is_empty() {
            "__________________".to_string()
        } else {
            author.to_string()
        }
    }

    /// 长文封面标题
    pub fn long_form_heading(self, kind: DocumentKind) -> &'static str {
        match (self, kind) {
            (Language::Uzbek, DocumentKind::Referat) => "REFERAT",
            (Language::Uzbek, _) => "MUSTAQIL ISH",
            (Language::Russian, DocumentKind::Referat) => "РЕФЕРАТ",
            (Language::Russian, _) => "САМОСТОЯТЕЛЬНАЯ РАБОТА",
            (Language::English, DocumentKind::Referat) => "RESEARCH PAPER",
            (Language::English, _) => "INDEPENDENT WORK",
        }
    }

    /// 目录页标题
    pub fn contents_heading(self) -> &'static str {
        match self {
            Language::Uzbek => "REJA",
            Language::Russian => "ПЛАН",
            Language::English => "CONTENTS",
        }
    }

    /// 参考文献页标题
    pub fn references_heading(self) -> &'static str {
        match self {
            Language::Uzbek => "FOYDALANILGAN ADABIYOTLAR",
            Language::Russian => "СПИСОК ЛИТЕРАТУРЫ",
            Language::English => "REFERENCES",
        }
    }

    /// 大纲缺失时的章节标题
    pub fn placeholder_section_title(self, index: usize, total: usize) -> String {
        match (self, index) {
            (Language::Uzbek, 1) => "Kirish".to_string(),
            (Language::Russian, 1) => "Введение".to_string(),
            (Language::English, 1) => "Introduction".to_string(),
            (Language::Uzbek, i) if i == total => "Xulosa".to_string(),
            (Language::Russian, i) if i == total => "Заключение".to_string(),
            (Language::English, i) if i == total => "Conclusion".to_string(),
            (Language::Uzbek, i) => format!("Bo'lim {}", i),
            (Language::Russian, i) => format!("Раздел {}", i),
            (Language::English, i) => format!("Section {}", i),
        }
    }

    /// 参考文献生成失败时的占位
    pub fn placeholder_reference(self, n: usize) -> String {
        match self {
            Language::Uzbek => format!("Manba {}", n),
            Language::Russian => format!("Источник {}", n),
            Language::English => format!("Reference {}", n),
        }
    }
}
