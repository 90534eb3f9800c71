//! 单页排版：把结构化单元变成定位好的文本框和图片

use crate::error::AssemblyError;
use crate::infrastructure::ooxml::pptx::{SLIDE_HEIGHT, SLIDE_WIDTH};
use crate::models::{
    Align, Column, ContentUnit, Language, LayoutType, Media, Palette, Paragraph, Picture,
    PictureRole, Rect, RenderedSlide, Shape, StructuredBody, TextBox, TextRole,
};

const MARGIN: f64 = 0.5;
const CONTENT_WIDTH: f64 = 12.33;
const BODY_TOP: f64 = 1.5;
const BODY_HEIGHT: f64 = 5.5;
const COLUMN_GAP: f64 = 0.3;

const TITLE_PT: u32 = 32;
const BODY_PT: u32 = 18;

/// 一次组装共享的排版参数
pub struct SlideRenderer<'a> {
    pub palette: Palette,
    pub background: Option<&'a Media>,
    pub title: &'a str,
    pub author: &'a str,
    pub language: Language,
}

impl SlideRenderer<'_> {
    /// 渲染整份单元列表，序号必须从 1 开始连续
    pub fn render_all(
        &self,
        units: &[ContentUnit],
        illustration: impl Fn(&ContentUnit) -> Option<Media>,
    ) -> Result<Vec<RenderedSlide>, AssemblyError> {
        if units.is_empty() {
            return Err(AssemblyError::Empty);
        }
        units
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                if unit.index != i + 1 {
                    return Err(AssemblyError::IndexGap {
                        expected: i + 1,
                        found: unit.index,
                    });
                }
                self.render(unit, illustration(unit))
            })
            .collect()
    }

    pub fn render(
        &self,
        unit: &ContentUnit,
        illustration: Option<Media>,
    ) -> Result<RenderedSlide, AssemblyError> {
        let body = unit
            .structured_body
            .as_ref()
            .filter(|body| body.fits(unit.layout_type))
            .ok_or_else(|| AssemblyError::MissingStructure {
                index: unit.index,
                layout: unit.layout_type.to_string(),
            })?;

        let mut shapes = Vec::new();
        if let Some(background) = self.background {
            shapes.push(Shape::Picture(Picture {
                role: PictureRole::Background,
                rect: Rect::new(0, 0, SLIDE_WIDTH, SLIDE_HEIGHT),
                media: background.clone(),
            }));
        }

        match body {
            StructuredBody::Title => self.title_slide(&mut shapes),
            StructuredBody::Bullets(items) => {
                shapes.push(self.heading(&unit.title));
                let size = if unit.layout_type == LayoutType::ThreeBullets { 20 } else { BODY_PT };
                let paragraphs = items
                    .iter()
                    .map(|item| Paragraph::new(item.as_str(), size).with_marker("•"))
                    .collect();
                shapes.push(self.body_box(Rect::inches(0.7, BODY_TOP, 11.93, BODY_HEIGHT), paragraphs));
            }
            StructuredBody::Numbered(items) => {
                shapes.push(self.heading(&unit.title));
                let paragraphs = items
                    .iter()
                    .enumerate()
                    .map(|(n, item)| Paragraph::new(item.as_str(), BODY_PT).with_marker(format!("{}.", n + 1)))
                    .collect();
                shapes.push(self.body_box(Rect::inches(0.7, BODY_TOP, 11.93, BODY_HEIGHT), paragraphs));
            }
            StructuredBody::Paragraph(text) => {
                shapes.push(self.heading(&unit.title));
                let paragraph = Paragraph::new(text.as_str(), BODY_PT).align(Align::Justify);
                match illustration {
                    Some(media) => {
                        shapes.push(self.body_box(Rect::inches(MARGIN, BODY_TOP, 6.8, BODY_HEIGHT), vec![paragraph]));
                        shapes.push(Shape::Picture(Picture {
                            role: PictureRole::Illustration,
                            rect: Rect::inches(7.6, 1.6, 5.2, 5.2),
                            media,
                        }));
                    }
                    // 无配图时文字占满整行
                    None => shapes.push(self.body_box(
                        Rect::inches(0.7, BODY_TOP, 11.93, BODY_HEIGHT),
                        vec![paragraph],
                    )),
                }
            }
            StructuredBody::Columns(columns) => {
                shapes.push(self.heading(&unit.title));
                self.columns(&mut shapes, columns);
            }
        }

        Ok(RenderedSlide {
            index: unit.index,
            layout: unit.layout_type,
            shapes,
        })
    }

    fn title_slide(&self, shapes: &mut Vec<Shape>) {
        shapes.push(Shape::Text(TextBox {
            role: TextRole::Title,
            rect: Rect::inches(0.75, 1.8, 11.83, 1.2),
            color: self.palette.title_color,
            paragraphs: vec![Paragraph::new(self.language.deck_heading(), 36)
                .bold()
                .align(Align::Center)],
        }));
        shapes.push(Shape::Text(TextBox {
            role: TextRole::Subtitle,
            rect: Rect::inches(0.75, 3.2, 11.83, 2.8),
            color: self.palette.text_color,
            paragraphs: vec![
                Paragraph::new(self.title, 24).bold().align(Align::Center),
                Paragraph::new("", 20).align(Align::Center),
                Paragraph::new(self.language.author_line(self.author), 20).align(Align::Center),
            ],
        }));
    }

    fn heading(&self, text: &str) -> Shape {
        Shape::Text(TextBox {
            role: TextRole::Title,
            rect: Rect::inches(MARGIN, 0.3, CONTENT_WIDTH, 1.0),
            color: self.palette.title_color,
            paragraphs: vec![Paragraph::new(text, TITLE_PT).bold().align(Align::Center)],
        })
    }

    fn body_box(&self, rect: Rect, paragraphs: Vec<Paragraph>) -> Shape {
        Shape::Text(TextBox {
            role: TextRole::Body,
            rect,
            color: self.palette.text_color,
            paragraphs,
        })
    }

    fn columns(&self, shapes: &mut Vec<Shape>, columns: &[Column]) {
        let width = (CONTENT_WIDTH - 2.0 * COLUMN_GAP) / 3.0;
        for (i, column) in columns.iter().enumerate() {
            let x = MARGIN + i as f64 * (width + COLUMN_GAP);
            shapes.push(Shape::Text(TextBox {
                role: TextRole::Header,
                rect: Rect::inches(x, BODY_TOP, width, 0.8),
                color: self.palette.title_color,
                paragraphs: vec![Paragraph::new(column.header.as_str(), 20)
                    .bold()
                    .align(Align::Center)],
            }));
            shapes.push(self.body_box(
                Rect::inches(x, BODY_TOP + 0.9, width, BODY_HEIGHT - 0.9),
                vec![Paragraph::new(column.body.as_str(), 14).align(Align::Justify)],
            ));
        }
    }
}
