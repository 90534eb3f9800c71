pub mod document;
pub mod job;
pub mod layout;
mod locale;
pub mod media;
pub mod template;
pub mod unit;

pub use document::{Align, Document, Paragraph, Picture, PictureRole, Rect, RenderedSlide, Shape, TextBox, TextRole};
pub use job::{sections_for_pages, DocumentKind, GenerationJob, Language};
pub use layout::LayoutType;
pub use media::{ImageFormat, Media};
pub use template::{Palette, Rgb, Template};
pub use unit::{Column, ContentUnit, Section, StructuredBody};
