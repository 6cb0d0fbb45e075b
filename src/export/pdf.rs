//! 最小化的 PDF 1.4 產生器 (A4、Helvetica、單一字型)

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
/// 10 mm
const MARGIN: f32 = 28.35;
const FONT_SIZE: f32 = 10.0;
/// 5 mm
const LEADING: f32 = 14.17;
const WRAP_COLUMNS: usize = 100;
/// 第一頁只放前幾行，第二頁留白
const FIRST_PAGE_LINES: usize = 10;

fn lines_per_page() -> usize {
    ((PAGE_HEIGHT - 2.0 * MARGIN) / LEADING).floor() as usize
}

/// 以單字換行，過長的單字直接切斷
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                wrapped.push(std::mem::take(&mut current));
                current_len = 0;
            }
            wrapped.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }

        let extra = if current_len == 0 { word.len() } else { word.len() + 1 };
        if current_len + extra > width {
            wrapped.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 || wrapped.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

fn paginate(lines: &[&str]) -> Vec<Vec<String>> {
    let wrapped: Vec<String> = lines
        .iter()
        .flat_map(|line| wrap_line(line, WRAP_COLUMNS))
        .collect();
    wrapped
        .chunks(lines_per_page())
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// 版面：前 10 行、空白頁、其餘內容
pub fn layout_pages(text: &str) -> Vec<Vec<String>> {
    let lines: Vec<&str> = text.lines().collect();
    let split = lines.len().min(FIRST_PAGE_LINES);
    let (first, rest) = lines.split_at(split);

    let mut pages = paginate(first);
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages.push(Vec::new());
    pages.extend(paginate(rest));
    pages
}

/// WinAnsi 字串，Latin-1 以外的字元以 `?` 代替
fn encode_text(line: &str, out: &mut Vec<u8>) {
    out.push(b'(');
    for c in line.chars() {
        let code = c as u32;
        let byte = match c {
            '\t' => b' ',
            _ if code < 0x20 => continue,
            _ if code < 0x100 => code as u8,
            _ => b'?',
        };
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b')');
}

fn page_content(lines: &[String]) -> Vec<u8> {
    let mut content = Vec::new();
    content.extend_from_slice(
        format!(
            "BT\n/F1 {} Tf\n{} TL\n{} {} Td\n",
            FONT_SIZE,
            LEADING,
            MARGIN,
            PAGE_HEIGHT - MARGIN - FONT_SIZE
        )
        .as_bytes(),
    );
    for line in lines {
        encode_text(line, &mut content);
        content.extend_from_slice(b" Tj T*\n");
    }
    content.extend_from_slice(b"ET\n");
    content
}

struct PdfWriter {
    buffer: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
        Self {
            buffer,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, body: &[u8]) {
        let id = self.offsets.len() + 1;
        self.offsets.push(self.buffer.len());
        self.buffer
            .extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        self.buffer.extend_from_slice(body);
        self.buffer.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, data: &[u8]) {
        let mut body = format!("<< /Length {} >>\nstream\n", data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.object(&body);
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buffer.len();
        let count = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", count);
        for offset in &self.offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            count, xref_offset
        ));
        self.buffer.extend_from_slice(xref.as_bytes());
        self.buffer
    }
}

pub fn render_pdf(text: &str) -> Vec<u8> {
    let pages = layout_pages(text);
    let mut writer = PdfWriter::new();

    // 物件編號：1 目錄、2 頁面樹、3 字型、之後每頁兩個 (頁面、內容)
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + i * 2))
        .collect();

    writer.object(b"<< /Type /Catalog /Pages 2 0 R >>");
    writer.object(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .as_bytes(),
    );
    writer.object(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );

    for (i, lines) in pages.iter().enumerate() {
        let content_id = 5 + i * 2;
        writer.object(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH, PAGE_HEIGHT, content_id
            )
            .as_bytes(),
        );
        writer.stream(&page_content(lines));
    }

    writer.finish()
}
