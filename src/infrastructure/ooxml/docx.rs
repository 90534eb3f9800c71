//! DOCX 写出

use super::{xml_escape, Package, XML_HEADER};
use crate::error::AssemblyError;
use crate::models::Align;

const FONT: &str = "Times New Roman";

/// 一段文字的格式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxParagraph {
    pub text: String,
    pub size_pt: u32,
    pub bold: bool,
    pub align: Align,
    /// 首行缩进（twip，1 英寸 = 1440），负数表示悬挂缩进
    pub first_line_indent: i32,
}

impl DocxParagraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size_pt: 12,
            bold: false,
            align: Align::Left,
            first_line_indent: 0,
        }
    }

    pub fn size(mut self, size_pt: u32) -> Self {
        self.size_pt = size_pt;
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

    pub fn indent(mut self, twips: i32) -> Self {
        self.first_line_indent = twips;
        self
    }

    fn to_xml(&self) -> String {
        let jc = match self.align {
            Align::Left => "left",
            Align::Center => "center",
            Align::Justify => "both",
        };
        let ind = match self.first_line_indent {
            0 => String::new(),
            n if n > 0 => format!(r#"<w:ind w:firstLine="{}"/>"#, n),
            n => format!(r#"<w:ind w:left="{}" w:hanging="{}"/>"#, -n, -n),
        };
        let bold = if self.bold { "<w:b/>" } else { "" };
        format!(
            r#"<w:p><w:pPr><w:jc w:val="{jc}"/>{ind}</w:pPr><w:r><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>{bold}<w:sz w:val="{sz}"/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#,
            jc = jc,
            ind = ind,
            font = FONT,
            bold = bold,
            sz = self.size_pt * 2,
            text = xml_escape(&self.text)
        )
    }
}

/// 顺序追加段落的 DOCX 构建器
#[derive(Debug, Default)]
pub struct DocxBuilder {
    body: String,
    paragraphs: usize,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(&mut self, paragraph: DocxParagraph) -> &mut Self {
        self.body.push_str(&paragraph.to_xml());
        self.paragraphs += 1;
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.body.push_str("<w:p/>");
        self
    }

    pub fn page_break(&mut self) -> &mut Self {
        self.body
            .push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        self
    }

    /// 已写入的文字段落数（不含空行和分页）
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs
    }

    pub fn finish(&self) -> Result<Vec<u8>, AssemblyError> {
        if self.paragraphs == 0 {
            return Err(AssemblyError::Empty);
        }

        let document = format!(
            r#"{}<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="850" w:bottom="1134" w:left="1701" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
            XML_HEADER, self.body
        );
        let content_types = format!(
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
            XML_HEADER
        );
        let rels = format!(
            r#"{}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#,
            XML_HEADER
        );

        let mut package = Package::new();
        package.add("[Content_Types].xml", content_types.as_bytes())?;
        package.add("_rels/.rels", rels.as_bytes())?;
        package.add("word/document.xml", document.as_bytes())?;
        package.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn test_paragraph_xml() {
        let xml = DocxParagraph::new("REJA").size(14).bold().align(Align::Center).to_xml();
        assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains(r#"<w:sz w:val="28"/>"#));

        let hanging = DocxParagraph::new("1. Manba").indent(-720).to_xml();
        assert!(hanging.contains(r#"w:hanging="720""#));
    }

    #[test]
    fn test_finish_writes_document() {
        let mut builder = DocxBuilder::new();
        builder
            .paragraph(DocxParagraph::new("Kirish & maqsad"))
            .page_break()
            .blank();
        let bytes = builder.finish().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("Kirish &amp; maqsad"));
        assert!(document.contains(r#"<w:br w:type="page"/>"#));
    }

    #[test]
    fn test_finish_rejects_empty() {
        assert!(matches!(DocxBuilder::new().finish(), Err(AssemblyError::Empty)));
    }
}
