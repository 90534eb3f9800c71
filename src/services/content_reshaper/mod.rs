//! 内容整理 - 业务能力层
//!
//! 把 LLM 返回的松散文本整理成各布局要求的精确结构：
//! - 列表类布局：固定条数，每条非空
//! - 三栏布局：固定三栏，每栏正文不少于最少词数
//!
//! 同样的输入总是得到同样的输出

pub mod columns;
pub mod items;

use tracing::debug;

use crate::models::{Column, ContentUnit, Language, LayoutType, StructuredBody};

/// 整理阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReshapeConfig {
    /// 按词切分要点时每块最少词数
    pub min_bullet_chunk_words: usize,
    /// 每栏正文最少词数
    pub min_column_words: usize,
}

impl Default for ReshapeConfig {
    fn default() -> Self {
        Self {
            min_bullet_chunk_words: 30,
            min_column_words: 20,
        }
    }
}

/// 内容整理器
///
/// 职责：
/// - 按布局分派整理逻辑
/// - 只改写 `structured_body`，不动标题和原文
#[derive(Debug, Clone, Copy)]
pub struct ContentReshaper {
    config: ReshapeConfig,
    language: Language,
}

impl ContentReshaper {
    pub fn new(config: ReshapeConfig, language: Language) -> Self {
        Self { config, language }
    }

    /// 整理单个单元
    pub fn reshape(&self, unit: &mut ContentUnit) {
        let body = self.structure(unit.layout_type, &unit.title, &unit.raw_body);
        unit.structured_body = Some(body);
    }

    /// 整理全部单元
    pub fn reshape_all(&self, units: &mut [ContentUnit]) {
        for unit in units.iter_mut() {
            self.reshape(unit);
        }
    }

    /// 按布局计算结构化正文
    pub fn structure(&self, layout: LayoutType, title: &str, raw_body: &str) -> StructuredBody {
        match layout {
            LayoutType::Title => StructuredBody::Title,
            LayoutType::BulletList | LayoutType::ThreeBullets => {
                StructuredBody::Bullets(self.reshape_items(raw_body, layout.item_count().unwrap_or(5)))
            }
            LayoutType::FourNumbered => {
                StructuredBody::Numbered(self.reshape_items(raw_body, layout.item_count().unwrap_or(4)))
            }
            LayoutType::TextWithImage => {
                let text = raw_body.trim();
                if text.is_empty() {
                    StructuredBody::Paragraph(self.language.placeholder_body().to_string())
                } else {
                    StructuredBody::Paragraph(text.to_string())
                }
            }
            LayoutType::ThreeColumn => StructuredBody::Columns(self.reshape_columns(raw_body, title)),
        }
    }

    /// 切分为恰好 `target` 个非空条目
    pub fn reshape_items(&self, raw_body: &str, target: usize) -> Vec<String> {
        let (strategy, mut items) = items::split_items(raw_body, target, self.config.min_bullet_chunk_words);
        debug!(
            "要点切分策略: {}，得到 {} 条，目标 {} 条",
            strategy.unwrap_or("padding"),
            items.len(),
            target
        );

        items.truncate(target);
        while items.len() < target {
            items.push(self.language.padding_item(items.len() + 1));
        }
        items
    }

    /// 切分为恰好三栏
    pub fn reshape_columns(&self, raw_body: &str, title: &str) -> Vec<Column> {
        let min_words = self.config.min_column_words;

        let mut cols = if raw_body.contains(columns::COLUMN_SEPARATOR) {
            debug!("三栏：使用分隔符格式");
            columns::parse_separated(raw_body, self.language)
        } else {
            let headers = columns::derive_headers(title, self.language);
            let cleaned = columns::strip_markers(raw_body);
            let parts = columns::split_three(&cleaned, min_words);
            headers
                .into_iter()
                .zip(parts)
                .map(|(header, body)| Column::new(header, body))
                .collect()
        };

        while cols.len() < 3 {
            cols.push(self.language.filler_column(cols.len()));
        }
        cols.truncate(3);

        for col in cols.iter_mut() {
            col.body = columns::pad_body(&col.body, min_words, self.language);
        }
        cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::text::word_count;

    fn reshaper() -> ContentReshaper {
        ContentReshaper::new(ReshapeConfig::default(), Language::English)
    }

    fn sample_bodies() -> Vec<String> {
        vec![
            String::new(),
            "   ".to_string(),
            "word".to_string(),
            "• a • b".to_string(),
            "line one\nline two\nline three\nline four\nline five\nline six".to_string(),
            "One. Two. Three.".to_string(),
            (1..=500).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" "),
            "A|||B|||C".to_string(),
            "||| ||| |||".to_string(),
            "- \n- \n•".to_string(),
        ]
    }

    #[test]
    fn test_bullets_always_five_non_empty() {
        let r = reshaper();
        for body in sample_bodies() {
            let items = r.reshape_items(&body, 5);
            assert_eq!(items.len(), 5, "input: {:?}", body);
            assert!(items.iter().all(|i| !i.trim().is_empty()), "input: {:?}", body);
        }
    }

    #[test]
    fn test_empty_body_gives_placeholders() {
        let items = reshaper().reshape_items("", 5);
        assert_eq!(
            items,
            (1..=5).map(|n| format!("Additional information {}", n)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_columns_always_three_and_long_enough() {
        let r = reshaper();
        for body in sample_bodies() {
            let cols = r.reshape_columns(&body, "Market trends");
            assert_eq!(cols.len(), 3, "input: {:?}", body);
            for col in &cols {
                assert!(!col.header.trim().is_empty());
                assert!(word_count(&col.body) >= 20, "input: {:?}", body);
            }
        }
    }

    #[test]
    fn test_separator_with_long_bodies_is_unchanged() {
        let body_a = "B C D E F G H I J K L M N O P Q R S T U V";
        let body_b = "b2 c2 d2 e2 f2 g2 h2 i2 j2 k2 l2 m2 n2 o2 p2 q2 r2 s2 t2 u2";
        let body_c = "b3 c3 d3 e3 f3 g3 h3 i3 j3 k3 l3 m3 n3 o3 p3 q3 r3 s3 t3 u3";
        let raw = format!("A|||{}|||Title2|||{}|||Title3|||{}", body_a, body_b, body_c);

        let cols = reshaper().reshape_columns(&raw, "anything");
        assert_eq!(
            cols,
            vec![
                Column::new("A", body_a),
                Column::new("Title2", body_b),
                Column::new("Title3", body_c),
            ]
        );
    }

    #[test]
    fn test_separator_short_body_is_padded() {
        let cols = reshaper().reshape_columns("H1|||short|||H2|||short|||H3|||short", "x");
        assert!(cols[0].body.starts_with("short "));
        assert!(cols[0].body.contains(Language::English.elaboration()));
    }

    #[test]
    fn test_columns_use_derived_headers() {
        let text = (1..=90).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let cols = reshaper().reshape_columns(&text, "Digital innovation");
        let headers: Vec<_> = cols.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["Technology", "Application", "Future"]);
        assert!(cols[0].body.starts_with("w1 "));
        assert!(cols[2].body.ends_with("w90"));
    }

    #[test]
    fn test_reshape_is_deterministic() {
        let r = ContentReshaper::new(ReshapeConfig::default(), Language::Uzbek);
        for layout in [
            LayoutType::BulletList,
            LayoutType::ThreeColumn,
            LayoutType::ThreeBullets,
            LayoutType::FourNumbered,
        ] {
            for body in sample_bodies() {
                assert_eq!(
                    r.structure(layout, "Tarix", &body),
                    r.structure(layout, "Tarix", &body)
                );
            }
        }
    }

    #[test]
    fn test_structure_fits_layout() {
        let r = reshaper();
        let assigner = crate::services::LayoutAssigner::default();
        for index in 1..=12 {
            let layout = assigner.assign(index);
            for body in sample_bodies() {
                let mut unit = ContentUnit::new(index, "Title", body, layout);
                r.reshape(&mut unit);
                let structured = unit.structured_body.unwrap();
                assert!(structured.fits(layout), "{} -> {:?}", layout, structured);
            }
        }
    }

    #[test]
    fn test_numbered_and_three_bullets_counts() {
        let r = reshaper();
        match r.structure(LayoutType::FourNumbered, "t", "one. two.") {
            StructuredBody::Numbered(items) => assert_eq!(items.len(), 4),
            other => panic!("unexpected {:?}", other),
        }
        match r.structure(LayoutType::ThreeBullets, "t", "One. Two. Three. Four.") {
            StructuredBody::Bullets(items) => assert_eq!(items, vec!["One.", "Two.", "Three."]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_text_with_image_placeholder() {
        let body = reshaper().structure(LayoutType::TextWithImage, "t", "  ");
        assert_eq!(
            body,
            StructuredBody::Paragraph("Content being generated...".to_string())
        );
    }
}
