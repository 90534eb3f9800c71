use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::layout::LayoutType;

/// 三栏中的一栏
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub header: String,
    pub body: String,
}

impl Column {
    pub fn new(header: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            body: body.into(),
        }
    }
}

/// 按布局整理后的正文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StructuredBody {
    /// 标题页无正文
    Title,
    /// 无序要点
    Bullets(Vec<String>),
    /// 编号要点
    Numbered(Vec<String>),
    /// 整段文字
    Paragraph(String),
    /// 三栏
    Columns(Vec<Column>),
}

impl StructuredBody {
    /// 检查结构是否满足布局要求
    pub fn fits(&self, layout: LayoutType) -> bool {
        match (layout, self) {
            (LayoutType::Title, StructuredBody::Title) => true,
            (LayoutType::BulletList, StructuredBody::Bullets(items))
            | (LayoutType::ThreeBullets, StructuredBody::Bullets(items))
            | (LayoutType::FourNumbered, StructuredBody::Numbered(items)) => {
                Some(items.len()) == layout.item_count()
            }
            (LayoutType::TextWithImage, StructuredBody::Paragraph(_)) => true,
            (LayoutType::ThreeColumn, StructuredBody::Columns(columns)) => columns.len() == 3,
            _ => false,
        }
    }
}

/// 内容单元（一页幻灯片）
///
/// 由生成编排器创建，整理器与配图服务就地修改，渲染器只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnit {
    /// 从 1 开始，连续无空缺
    pub index: usize,
    pub title: String,
    /// 原始正文，始终为字符串
    pub raw_body: String,
    pub layout_type: LayoutType,
    #[serde(default)]
    pub structured_body: Option<StructuredBody>,
    #[serde(default)]
    pub image_ref: Option<PathBuf>,
}

impl ContentUnit {
    pub fn new(
        index: usize,
        title: impl Into<String>,
        raw_body: impl Into<String>,
        layout_type: LayoutType,
    ) -> Self {
        Self {
            index,
            title: title.into(),
            raw_body: raw_body.into(),
            layout_type,
            structured_body: None,
            image_ref: None,
        }
    }
}

/// 长文章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub index: usize,
    pub title: String,
    pub body: String,
}
