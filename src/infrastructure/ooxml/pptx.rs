//! PPTX 写出
//!
//! 每页使用同一个空白版式，所有内容都是显式定位的文本框和图片

use std::fmt::Write as _;
use std::sync::Arc;

use super::{xml_escape, Package, XML_HEADER};
use crate::error::AssemblyError;
use crate::models::{ImageFormat, Media, Paragraph, Picture, Rect, RenderedSlide, Shape, TextBox};

/// 16:9 页面宽度（EMU）
pub const SLIDE_WIDTH: i64 = 12_192_000;
/// 16:9 页面高度（EMU）
pub const SLIDE_HEIGHT: i64 = 6_858_000;

const FONT: &str = "Times New Roman";

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const GROUP_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

/// 包内的一个媒体文件
struct MediaEntry {
    name: String,
    media: Media,
}

/// 相同字节（同一个 `Arc`）只打包一次
#[derive(Default)]
struct MediaTable {
    entries: Vec<MediaEntry>,
}

impl MediaTable {
    fn intern(&mut self, media: &Media) -> String {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| Arc::ptr_eq(&e.media.bytes, &media.bytes))
        {
            return existing.name.clone();
        }
        let name = format!(
            "image{}.{}",
            self.entries.len() + 1,
            media.format.extension()
        );
        self.entries.push(MediaEntry {
            name: name.clone(),
            media: media.clone(),
        });
        name
    }
}

/// 把渲染好的页面写成 PPTX 字节
pub fn build_pptx(slides: &[RenderedSlide]) -> Result<Vec<u8>, AssemblyError> {
    if slides.is_empty() {
        return Err(AssemblyError::Empty);
    }

    let mut media = MediaTable::default();
    let mut slide_parts = Vec::with_capacity(slides.len());
    for slide in slides {
        slide_parts.push(slide_xml(slide, &mut media));
    }

    let mut package = Package::new();
    package.add("[Content_Types].xml", content_types(slides.len()).as_bytes())?;
    package.add("_rels/.rels", root_rels().as_bytes())?;
    package.add("ppt/presentation.xml", presentation_xml(slides.len()).as_bytes())?;
    package.add(
        "ppt/_rels/presentation.xml.rels",
        presentation_rels(slides.len()).as_bytes(),
    )?;
    package.add("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER.as_bytes())?;
    package.add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        rels(&[
            ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("rId2", "theme", "../theme/theme1.xml"),
        ])
        .as_bytes(),
    )?;
    package.add("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT.as_bytes())?;
    package.add(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]).as_bytes(),
    )?;
    package.add("ppt/theme/theme1.xml", THEME.as_bytes())?;

    for (i, (xml, slide_rels)) in slide_parts.iter().enumerate() {
        let n = i + 1;
        package.add(&format!("ppt/slides/slide{}.xml", n), xml.as_bytes())?;
        package.add(
            &format!("ppt/slides/_rels/slide{}.xml.rels", n),
            slide_rels.as_bytes(),
        )?;
    }

    for entry in &media.entries {
        package.add(&format!("ppt/media/{}", entry.name), &entry.media.bytes)?;
    }

    package.finish()
}

fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        XML_HEADER
    );
    for format in [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Gif,
        ImageFormat::WebP,
    ] {
        let _ = write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.content_type()
        );
    }
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for n in 1..=slide_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        );
    }
    xml.push_str("</Types>");
    xml
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(r#"{}<Relationships xmlns="{}">"#, XML_HEADER, REL_NS);
    for (id, kind, target) in entries {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL_TYPE, kind, target
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn root_rels() -> String {
    rels(&[("rId1", "officeDocument", "ppt/presentation.xml")])
}

fn presentation_xml(slide_count: usize) -> String {
    let mut ids = String::new();
    for n in 0..slide_count {
        let _ = write!(ids, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + n, n + 3);
    }
    format!(
        r#"{}<p:presentation {} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        XML_HEADER, NS, ids, SLIDE_WIDTH, SLIDE_HEIGHT
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let targets: Vec<(String, String)> = (1..=slide_count)
        .map(|n| (format!("rId{}", n + 2), format!("slides/slide{}.xml", n)))
        .collect();
    let mut entries: Vec<(&str, &str, &str)> = vec![
        ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        ("rId2", "theme", "theme/theme1.xml"),
    ];
    entries.extend(
        targets
            .iter()
            .map(|(id, target)| (id.as_str(), "slide", target.as_str())),
    );
    rels(&entries)
}

/// 返回 (页面 XML, 页面关系 XML)
fn slide_xml(slide: &RenderedSlide, media: &mut MediaTable) -> (String, String) {
    let mut shapes = String::new();
    let mut media_rels: Vec<(String, String)> = Vec::new();

    for (i, shape) in slide.shapes.iter().enumerate() {
        let shape_id = i + 2;
        match shape {
            Shape::Text(text_box) => shapes.push_str(&text_shape(shape_id, text_box)),
            Shape::Picture(picture) => {
                let name = media.intern(&picture.media);
                let rel_id = format!("rId{}", media_rels.len() + 2);
                shapes.push_str(&picture_shape(shape_id, &rel_id, picture));
                media_rels.push((rel_id, format!("../media/{}", name)));
            }
        }
    }

    let xml = format!(
        r#"{}<p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        XML_HEADER, NS, GROUP_HEADER, shapes
    );

    let mut entries: Vec<(&str, &str, &str)> =
        vec![("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")];
    entries.extend(
        media_rels
            .iter()
            .map(|(id, target)| (id.as_str(), "image", target.as_str())),
    );
    (xml, rels(&entries))
}

fn xfrm(rect: &Rect) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )
}

fn text_shape(id: usize, text_box: &TextBox) -> String {
    let mut body = String::new();
    for paragraph in &text_box.paragraphs {
        body.push_str(&paragraph_xml(paragraph, &text_box.color.hex()));
    }
    if text_box.paragraphs.is_empty() {
        body.push_str(r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#);
    }
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:normAutofit/></a:bodyPr><a:lstStyle/>{body}</p:txBody></p:sp>"#,
        id = id,
        xfrm = xfrm(&text_box.rect),
        body = body
    )
}

fn paragraph_xml(paragraph: &Paragraph, color: &str) -> String {
    let text = paragraph.display_text();
    if text.trim().is_empty() {
        return format!(
            r#"<a:p><a:pPr algn="{}"/><a:endParaRPr lang="en-US" sz="{}"/></a:p>"#,
            paragraph.align.as_ooxml(),
            paragraph.size_pt * 100
        );
    }
    format!(
        r#"<a:p><a:pPr algn="{algn}"/><a:r><a:rPr lang="en-US" sz="{sz}" b="{b}" dirty="0"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill><a:latin typeface="{font}"/><a:cs typeface="{font}"/></a:rPr><a:t>{text}</a:t></a:r></a:p>"#,
        algn = paragraph.align.as_ooxml(),
        sz = paragraph.size_pt * 100,
        b = if paragraph.bold { 1 } else { 0 },
        color = color,
        font = FONT,
        text = xml_escape(&text)
    )
}

fn picture_shape(id: usize, rel_id: &str, picture: &Picture) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        id = id,
        rel = rel_id,
        xfrm = xfrm(&picture.rect)
    )
}

const SLIDE_MASTER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#,
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"</p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
    r#"</p:sldMaster>"#
);

const SLIDE_LAYOUT: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">"#,
    r#"<p:cSld name="Blank"><p:spTree>"#,
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
);

const THEME: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements>"#,
    r#"<a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Office">"#,
    r#"<a:majorFont><a:latin typeface="Times New Roman"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Times New Roman"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme>"#,
    r#"</a:themeElements><a:objectDefaults/><a:extraSpLst/></a:theme>"#
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Align, LayoutType, PictureRole, Rgb, TextRole};
    use std::io::{Cursor, Read};

    fn png() -> Media {
        Media::from_bytes(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3]).unwrap()
    }

    fn slide(index: usize, background: &Media) -> RenderedSlide {
        RenderedSlide {
            index,
            layout: LayoutType::BulletList,
            shapes: vec![
                Shape::Picture(Picture {
                    role: PictureRole::Background,
                    rect: Rect::new(0, 0, SLIDE_WIDTH, SLIDE_HEIGHT),
                    media: background.clone(),
                }),
                Shape::Text(TextBox {
                    role: TextRole::Title,
                    rect: Rect::inches(0.5, 0.3, 12.0, 1.0),
                    color: Rgb(0, 51, 102),
                    paragraphs: vec![Paragraph::new("Iqtisod & <bozor>", 32)
                        .bold()
                        .align(Align::Center)],
                }),
            ],
        }
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_build_pptx_parts() {
        let background = png();
        let bytes = build_pptx(&[slide(1, &background), slide(2, &background)]).unwrap();

        let presentation = read_entry(&bytes, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 2);

        let slide1 = read_entry(&bytes, "ppt/slides/slide1.xml");
        assert!(slide1.contains("Iqtisod &amp; &lt;bozor&gt;"));
        assert!(slide1.contains(r#"val="003366""#));

        let rels = read_entry(&bytes, "ppt/slides/_rels/slide2.xml.rels");
        assert!(rels.contains("../media/image1.png"));

        // 共享背景只打包一次
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let media_count = archive.file_names().filter(|n| n.starts_with("ppt/media/")).count();
        assert_eq!(media_count, 1);
    }

    #[test]
    fn test_build_pptx_rejects_empty() {
        assert!(matches!(build_pptx(&[]), Err(AssemblyError::Empty)));
    }
}
