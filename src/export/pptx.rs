//! PresentationML 套件：標題頁加上每個 `### ` 分節一頁

use super::{write_package, xml_escape};
use crate::utils::error::Result;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const TITLE_SLIDE: &str = "Insurance Claim Summary";

const EMPTY_TREE: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

const THEME: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub title: String,
    pub body: String,
}

/// 以 `### ` 切分文字；每段第一行為標題
pub fn split_slides(text: &str) -> Vec<Slide> {
    let mut slides = vec![Slide {
        title: TITLE_SLIDE.to_string(),
        body: String::new(),
    }];

    for chunk in text.split("### ") {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        let mut lines = chunk.lines();
        let title = lines.next().map(str::trim).unwrap_or("Details").to_string();
        let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        slides.push(Slide { title, body });
    }

    slides
}

fn relationships(entries: &[(String, &str, String)]) -> String {
    let mut xml = format!("{}\n<Relationships xmlns=\"{}\">", XML_HEADER, REL_NS);
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL_TYPE, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn text_box(id: u32, name: &str, y: u64, cy: u64, size: u32, bold: bool, text: &str) -> String {
    let run_props = format!(
        r#"<a:rPr lang="en-US" sz="{}"{} dirty="0"/>"#,
        size,
        if bold { r#" b="1""# } else { "" }
    );
    let paragraphs: String = text
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#.to_string()
            } else {
                format!(
                    "<a:p><a:r>{}<a:t>{}</a:t></a:r></a:p>",
                    run_props,
                    xml_escape(line)
                )
            }
        })
        .collect();
    let paragraphs = if paragraphs.is_empty() {
        r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#.to_string()
    } else {
        paragraphs
    };

    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="{y}"/><a:ext cx="8229600" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

fn slide_xml(slide: &Slide, is_title: bool) -> String {
    let shapes = if is_title {
        text_box(2, "Title", 2286000, 1470000, 4000, true, &slide.title)
    } else {
        let mut shapes = text_box(2, "Title", 274638, 1143000, 2800, true, &slide.title);
        shapes.push_str(&text_box(3, "Content", 1600200, 4525963, 1400, false, &slide.body));
        shapes
    };

    format!(
        r#"{XML_HEADER}
<p:sld {NS}><p:cSld><p:spTree>{EMPTY_TREE}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

fn content_types(slide_count: usize) -> String {
    let slides: String = (1..=slide_count)
        .map(|i| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                i
            )
        })
        .collect();

    format!(
        r#"{XML_HEADER}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>{slides}</Types>"#
    )
}

fn presentation_xml(slide_count: usize) -> String {
    let ids: String = (0..slide_count)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, 3 + i))
        .collect();

    format!(
        r#"{XML_HEADER}
<p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    )
}

fn slide_master_xml() -> String {
    format!(
        r#"{XML_HEADER}
<p:sldMaster {NS}><p:cSld><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn slide_layout_xml() -> String {
    format!(
        r#"{XML_HEADER}
<p:sldLayout {NS} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

pub fn render_pptx(text: &str) -> Result<Vec<u8>> {
    let slides = split_slides(text);
    let count = slides.len();

    let mut presentation_rels = vec![
        (
            "rId1".to_string(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        ),
        ("rId2".to_string(), "theme", "theme/theme1.xml".to_string()),
    ];
    presentation_rels.extend(
        (1..=count).map(|i| (format!("rId{}", i + 2), "slide", format!("slides/slide{}.xml", i))),
    );

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types(count)),
        (
            "_rels/.rels".to_string(),
            relationships(&[(
                "rId1".to_string(),
                "officeDocument",
                "ppt/presentation.xml".to_string(),
            )]),
        ),
        ("ppt/presentation.xml".to_string(), presentation_xml(count)),
        (
            "ppt/_rels/presentation.xml.rels".to_string(),
            relationships(&presentation_rels),
        ),
        (
            "ppt/slideMasters/slideMaster1.xml".to_string(),
            slide_master_xml(),
        ),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            relationships(&[
                (
                    "rId1".to_string(),
                    "slideLayout",
                    "../slideLayouts/slideLayout1.xml".to_string(),
                ),
                ("rId2".to_string(), "theme", "../theme/theme1.xml".to_string()),
            ]),
        ),
        (
            "ppt/slideLayouts/slideLayout1.xml".to_string(),
            slide_layout_xml(),
        ),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            relationships(&[(
                "rId1".to_string(),
                "slideMaster",
                "../slideMasters/slideMaster1.xml".to_string(),
            )]),
        ),
        (
            "ppt/theme/theme1.xml".to_string(),
            format!("{}\n{}", XML_HEADER, THEME),
        ),
    ];

    let layout_rel = relationships(&[(
        "rId1".to_string(),
        "slideLayout",
        "../slideLayouts/slideLayout1.xml".to_string(),
    )]);
    for (i, slide) in slides.iter().enumerate() {
        parts.push((
            format!("ppt/slides/slide{}.xml", i + 1),
            slide_xml(slide, i == 0),
        ));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
            layout_rel.clone(),
        ));
    }

    write_package(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    #[test]
    fn test_split_slides() {
        let text = "Q1: Yes\n\n\n### Policy Details\n- Policy No.: P1\n\n### Claim Details\n- Claim Number: C9\n";
        let slides = split_slides(text);

        assert_eq!(slides.len(), 4);
        assert_eq!(slides[0].title, TITLE_SLIDE);
        assert_eq!(slides[1].title, "Q1: Yes");
        assert_eq!(slides[1].body, "");
        assert_eq!(slides[2].title, "Policy Details");
        assert_eq!(slides[2].body, "- Policy No.: P1");
        assert_eq!(slides[3].title, "Claim Details");
    }

    #[test]
    fn test_package_parts() {
        let data = render_pptx("### Policy Details\n- Policy No.: P&1\n").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();

        for name in [
            "[Content_Types].xml",
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
            "ppt/theme/theme1.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing {}", name);
        }
        assert!(archive.by_name("ppt/slides/slide3.xml").is_err());

        let mut slide = String::new();
        archive
            .by_name("ppt/slides/slide2.xml")
            .unwrap()
            .read_to_string(&mut slide)
            .unwrap();
        assert!(slide.contains("<a:t>Policy Details</a:t>"));
        assert!(slide.contains("<a:t>- Policy No.: P&amp;1</a:t>"));
    }
}
