//! 文档组装 - 业务能力层
//!
//! 把结构化单元和模板渲染成最终产物；任何渲染失败都不会留下半成品文件

pub mod slides;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clients::AssetStore;
use crate::error::AssemblyError;
use crate::infrastructure::ooxml::{build_pptx, DocxBuilder, DocxParagraph, PendingArtifact};
use crate::models::{
    Align, ContentUnit, Document, DocumentKind, ImageFormat, Language, Media, RenderedSlide,
    Section, Template,
};
use crate::services::template_registry::TemplateRegistry;

pub use slides::SlideRenderer;

/// 半英寸（twip）
const HALF_INCH_TWIPS: i32 = 720;

/// 文档组装器
///
/// 模板目录只读共享，可被多个任务同时使用
pub struct DocumentAssembler {
    templates: Arc<TemplateRegistry>,
    assets: Arc<dyn AssetStore>,
    documents_dir: PathBuf,
}

impl DocumentAssembler {
    pub fn new(
        templates: Arc<TemplateRegistry>,
        assets: Arc<dyn AssetStore>,
        documents_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            templates,
            assets,
            documents_dir: documents_dir.into(),
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// 组装演示文稿并落盘
    pub async fn assemble(
        &self,
        units: &[ContentUnit],
        template_id: &str,
        title: &str,
        author: &str,
        language: Language,
    ) -> Result<Document, AssemblyError> {
        self.prepare(units, template_id, title, author, language)
            .await?
            .persist()
            .await
    }

    /// 渲染演示文稿，确定输出路径但暂不写盘
    pub async fn prepare(
        &self,
        units: &[ContentUnit],
        template_id: &str,
        title: &str,
        author: &str,
        language: Language,
    ) -> Result<PreparedDocument, AssemblyError> {
        let template = self.templates.get(template_id);
        let background = self.load_background(template).await?;
        let illustrations = load_illustrations(units).await?;

        let renderer = SlideRenderer {
            palette: template.palette,
            background: background.as_ref(),
            title,
            author,
            language,
        };
        let slides = renderer.render_all(units, |unit| illustrations.get(&unit.index).cloned())?;
        let bytes = build_pptx(&slides)?;
        debug!("模板 {} 渲染完成: {} 页", template.id, slides.len());

        let path = self.output_path("presentation", DocumentKind::Deck);
        let slide_count = slides.len();
        Ok(PreparedDocument::new(
            Document {
                kind: DocumentKind::Deck,
                path,
                slides,
                slide_count,
            },
            bytes,
        ))
    }

    /// 组装长文（DOCX）并落盘
    pub async fn assemble_long_form(
        &self,
        sections: &[Section],
        references: &[String],
        kind: DocumentKind,
        topic: &str,
        language: Language,
    ) -> Result<Document, AssemblyError> {
        self.prepare_long_form(sections, references, kind, topic, language)?
            .persist()
            .await
    }

    /// 排版长文：封面、目录、正文章节、参考文献
    pub fn prepare_long_form(
        &self,
        sections: &[Section],
        references: &[String],
        kind: DocumentKind,
        topic: &str,
        language: Language,
    ) -> Result<PreparedDocument, AssemblyError> {
        if sections.is_empty() {
            return Err(AssemblyError::Empty);
        }
        let bytes = render_long_form(sections, references, kind, topic, language)?;

        let prefix = match kind {
            DocumentKind::Referat => "referat",
            _ => "independent_work",
        };
        let path = self.output_path(prefix, kind);
        Ok(PreparedDocument::new(
            Document {
                kind,
                path,
                slides: Vec::<RenderedSlide>::new(),
                slide_count: sections.len(),
            },
            bytes,
        ))
    }

    fn output_path(&self, prefix: &str, kind: DocumentKind) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let suffix = Uuid::new_v4().simple().to_string();
        self.documents_dir.join(format!(
            "{}_{}_{}.{}",
            prefix,
            timestamp,
            &suffix[..8],
            kind.extension()
        ))
    }

    /// 背景只接受 PNG/JPEG；文件缺失时退回纯色背景
    async fn load_background(&self, template: &Template) -> Result<Option<Media>, AssemblyError> {
        let bytes = self
            .assets
            .read(template)
            .await
            .map_err(|e| AssemblyError::CorruptAsset(format!("模板 {} 背景读取失败: {:#}", template.id, e)))?;

        let Some(bytes) = bytes else {
            if template.background_asset.is_some() {
                warn!("⚠️ 模板 {} 背景缺失，使用纯色背景", template.id);
            }
            return Ok(None);
        };

        match Media::from_bytes(bytes) {
            Some(media) if matches!(media.format, ImageFormat::Png | ImageFormat::Jpeg) => {
                debug!("模板 {} 背景: {} 字节", template.id, media.bytes.len());
                Ok(Some(media))
            }
            _ => Err(AssemblyError::CorruptAsset(format!(
                "模板 {} 的背景不是 PNG/JPEG",
                template.id
            ))),
        }
    }
}

/// 已渲染、尚未落盘的文档
pub struct PreparedDocument {
    document: Document,
    artifact: PendingArtifact,
    bytes: Vec<u8>,
}

impl PreparedDocument {
    fn new(document: Document, bytes: Vec<u8>) -> Self {
        Self {
            artifact: PendingArtifact::new(document.path.clone()),
            document,
            bytes,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// 落盘前交给调用方，用于任务中止时删除
    pub fn artifact(&self) -> &PendingArtifact {
        &self.artifact
    }

    pub async fn persist(self) -> Result<Document, AssemblyError> {
        self.artifact.write(self.bytes).await?;
        let document = self.document;
        match document.kind {
            DocumentKind::Deck => info!(
                "✓ 演示文稿已保存: {} ({} 页)",
                document.path.display(),
                document.slide_count
            ),
            _ => info!(
                "✓ 长文已保存: {} ({} 个章节)",
                document.path.display(),
                document.slide_count
            ),
        }
        Ok(document)
    }
}

/// 读取所有单元配图，按单元序号索引
async fn load_illustrations(units: &[ContentUnit]) -> Result<HashMap<usize, Media>, AssemblyError> {
    let mut loaded = HashMap::new();
    for unit in units {
        let Some(path) = &unit.image_ref else {
            continue;
        };
        loaded.insert(unit.index, read_media(path).await?);
    }
    Ok(loaded)
}

async fn read_media(path: &Path) -> Result<Media, AssemblyError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AssemblyError::AssetRead {
            path: path.display().to_string(),
            source,
        })?;
    Media::from_bytes(bytes)
        .ok_or_else(|| AssemblyError::CorruptAsset(format!("无法识别的图片: {}", path.display())))
}

/// 长文排版
pub fn render_long_form(
    sections: &[Section],
    references: &[String],
    kind: DocumentKind,
    topic: &str,
    language: Language,
) -> Result<Vec<u8>, AssemblyError> {
    let mut doc = DocxBuilder::new();

    doc.paragraph(
        DocxParagraph::new(language.long_form_heading(kind))
            .size(16)
            .bold()
            .align(Align::Center),
    )
    .blank()
    .paragraph(DocxParagraph::new(topic).size(14).bold().align(Align::Center))
    .page_break();

    doc.paragraph(
        DocxParagraph::new(language.contents_heading())
            .size(14)
            .bold()
            .align(Align::Center),
    )
    .blank();
    for section in sections {
        doc.paragraph(
            DocxParagraph::new(format!("{}. {}", section.index, section.title)).indent(HALF_INCH_TWIPS),
        );
    }
    doc.page_break();

    for section in sections {
        doc.paragraph(
            DocxParagraph::new(format!("{}. {}", section.index, section.title))
                .size(14)
                .bold()
                .align(Align::Center),
        )
        .blank()
        .paragraph(
            DocxParagraph::new(section.body.as_str())
                .align(Align::Justify)
                .indent(HALF_INCH_TWIPS),
        )
        .blank();
    }

    if !references.is_empty() {
        doc.page_break().paragraph(
            DocxParagraph::new(language.references_heading())
                .size(14)
                .bold()
                .align(Align::Center),
        );
        doc.blank();
        for (n, reference) in references.iter().enumerate() {
            doc.paragraph(DocxParagraph::new(format!("{}. {}", n + 1, reference)).indent(-HALF_INCH_TWIPS));
        }
    }

    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::FsAssetStore;
    use crate::models::{LayoutType, PictureRole, StructuredBody};
    use std::io::{Cursor, Read};

    const PNG: [u8; 9] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0];

    fn structured_units(image: Option<PathBuf>) -> Vec<ContentUnit> {
        let mut title = ContentUnit::new(1, "Fotosintez", "", LayoutType::Title);
        title.structured_body = Some(StructuredBody::Title);
        let mut text = ContentUnit::new(2, "Jarayon", "matn", LayoutType::TextWithImage);
        text.structured_body = Some(StructuredBody::Paragraph("matn".into()));
        text.image_ref = image;
        vec![title, text]
    }

    fn assembler(assets: &Path, out: &Path) -> DocumentAssembler {
        DocumentAssembler::new(
            Arc::new(TemplateRegistry::builtin()),
            Arc::new(FsAssetStore::new(assets)),
            out,
        )
    }

    #[tokio::test]
    async fn test_assemble_writes_pptx() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("template_1.png"), PNG).unwrap();
        let image = dir.path().join("unit_002.png");
        std::fs::write(&image, PNG).unwrap();

        let doc = assembler(dir.path(), &dir.path().join("out"))
            .assemble(&structured_units(Some(image)), "template_1", "Fotosintez", "Ali", Language::Uzbek)
            .await
            .unwrap();

        assert_eq!(doc.slide_count, 2);
        assert_eq!(doc.layout_sequence(), vec![LayoutType::Title, LayoutType::TextWithImage]);
        assert!(doc.slides.iter().all(|s| s.has_picture(PictureRole::Background)));
        assert!(doc.slides[1].has_picture(PictureRole::Illustration));
        assert!(doc.path.exists());
        assert_eq!(doc.path.extension().and_then(|e| e.to_str()), Some("pptx"));
    }

    #[tokio::test]
    async fn test_missing_background_renders_plain() {
        let dir = tempfile::tempdir().unwrap();
        let doc = assembler(dir.path(), dir.path())
            .assemble(&structured_units(None), "template_3", "t", "", Language::English)
            .await
            .unwrap();
        assert!(!doc.slides[0].has_picture(PictureRole::Background));
    }

    #[tokio::test]
    async fn test_corrupt_background_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("template_1.png"), b"not an image").unwrap();
        let out = dir.path().join("out");

        let result = assembler(dir.path(), &out)
            .assemble(&structured_units(None), "template_1", "t", "", Language::English)
            .await;
        assert!(matches!(result, Err(AssemblyError::CorruptAsset(_))));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_unreadable_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = assembler(dir.path(), dir.path())
            .assemble(
                &structured_units(Some(dir.path().join("gone.png"))),
                "template_20",
                "t",
                "",
                Language::English,
            )
            .await;
        assert!(matches!(result, Err(AssemblyError::AssetRead { .. })));
    }

    #[test]
    fn test_render_long_form_layout() {
        let sections = vec![
            Section {
                index: 1,
                title: "Kirish".into(),
                body: "Matn".into(),
            },
            Section {
                index: 2,
                title: "Xulosa".into(),
                body: "Yakun".into(),
            },
        ];
        let refs = vec!["Karimov A. Biologiya. 2020".to_string()];
        let bytes = render_long_form(&sections, &refs, DocumentKind::Referat, "Hujayra", Language::Uzbek).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains("REFERAT"));
        assert!(xml.contains("REJA"));
        assert!(xml.contains("2. Xulosa"));
        assert!(xml.contains("FOYDALANILGAN ADABIYOTLAR"));
        assert!(xml.contains("1. Karimov A. Biologiya. 2020"));
    }

    #[tokio::test]
    async fn test_assemble_long_form_counts_sections() {
        let dir = tempfile::tempdir().unwrap();
        let sections = vec![Section {
            index: 1,
            title: "Introduction".into(),
            body: "Body".into(),
        }];
        let doc = assembler(dir.path(), dir.path())
            .assemble_long_form(&sections, &[], DocumentKind::IndependentWork, "Cells", Language::English)
            .await
            .unwrap();
        assert_eq!(doc.slide_count, 1);
        assert_eq!(doc.path.extension().and_then(|e| e.to_str()), Some("docx"));
        assert!(doc
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("independent_work_")));
    }
}
