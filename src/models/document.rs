use std::path::PathBuf;

use super::job::DocumentKind;
use super::layout::LayoutType;
use super::media::Media;
use super::template::Rgb;

/// 矩形区域，单位 EMU（1 英寸 = 914400）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    pub const EMU_PER_INCH: i64 = 914_400;

    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// 以英寸构造
    pub fn inches(x: f64, y: f64, cx: f64, cy: f64) -> Self {
        let emu = |v: f64| (v * Self::EMU_PER_INCH as f64).round() as i64;
        Self::new(emu(x), emu(y), emu(cx), emu(cy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Justify,
}

impl Align {
    /// DrawingML 对齐属性值
    pub fn as_ooxml(self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Justify => "just",
        }
    }
}

/// 文本框用途，决定取哪种调色板颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Title,
    Subtitle,
    Header,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    /// 行首标记，如 `•` 或 `1.`
    pub marker: Option<String>,
    /// 字号（磅）
    pub size_pt: u32,
    pub bold: bool,
    pub align: Align,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, size_pt: u32) -> Self {
        Self {
            text: text.into(),
            marker: None,
            size_pt,
            bold: false,
            align: Align::Left,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// 带标记的完整文本
    pub fn display_text(&self) -> String {
        match &self.marker {
            Some(marker) => format!("{} {}", marker, self.text),
            None => self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBox {
    pub role: TextRole,
    pub rect: Rect,
    pub color: Rgb,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureRole {
    /// 模板背景，铺满整页
    Background,
    /// 单元配图
    Illustration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub role: PictureRole,
    pub rect: Rect,
    pub media: Media,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Text(TextBox),
    Picture(Picture),
}

/// 渲染完成的一页
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSlide {
    pub index: usize,
    pub layout: LayoutType,
    pub shapes: Vec<Shape>,
}

impl RenderedSlide {
    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Picture(p) => Some(p),
            _ => None,
        })
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBox> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn has_picture(&self, role: PictureRole) -> bool {
        self.pictures().any(|p| p.role == role)
    }
}

/// 最终产物
///
/// 只在组装完整成功后创建
#[derive(Debug, Clone)]
pub struct Document {
    pub kind: DocumentKind,
    pub path: PathBuf,
    pub slides: Vec<RenderedSlide>,
    /// 演示文稿为页数，长文为章节数
    pub slide_count: usize,
}

impl Document {
    pub fn layout_sequence(&self) -> Vec<LayoutType> {
        self.slides.iter().map(|s| s.layout).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_inches() {
        let r = Rect::inches(0.5, 1.0, 13.333, 7.5);
        assert_eq!(r.x, 457_200);
        assert_eq!(r.y, 914_400);
        assert_eq!(r.cy, 6_858_000);
    }

    #[test]
    fn test_paragraph_display_text() {
        let p = Paragraph::new("Birinchi", 18).with_marker("1.");
        assert_eq!(p.display_text(), "1. Birinchi");
        assert_eq!(Paragraph::new("x", 18).display_text(), "x");
    }
}
