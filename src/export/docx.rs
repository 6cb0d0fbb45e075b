use super::{write_package, xml_escape};
use crate::utils::error::Result;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

/// A4、1 吋邊界
const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#;

fn document_xml(text: &str) -> String {
    let mut body = String::from("<w:p><w:r>");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            body.push_str("<w:br/>");
        }
        body.push_str(r#"<w:t xml:space="preserve">"#);
        body.push_str(&xml_escape(line.trim_end_matches('\r')));
        body.push_str("</w:t>");
    }
    body.push_str("</w:r></w:p>");

    // 內容後接：分頁、空段落、分頁
    body.push_str(PAGE_BREAK);
    body.push_str("<w:p/>");
    body.push_str(PAGE_BREAK);

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}{}</w:body></w:document>"#,
        body, SECTION_PROPERTIES
    )
}

pub fn render_docx(text: &str) -> Result<Vec<u8>> {
    write_package(&[
        ("[Content_Types].xml".to_string(), CONTENT_TYPES.to_string()),
        ("_rels/.rels".to_string(), ROOT_RELS.to_string()),
        ("word/document.xml".to_string(), document_xml(text)),
    ])
}
