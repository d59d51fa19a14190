use crate::error::QuartermatchError;
use crate::extraction::{BBox, PageLayout, PdfExtractor, TextFragment};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Write;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox-layout` which reports every block, line and word
/// of a page with its bounding box.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
    ) -> Result<PageLayout, QuartermatchError> {
        let mut tmpfile = tempfile::NamedTempFile::new()
            .map_err(|e| QuartermatchError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| QuartermatchError::Extraction(e.to_string()))?;

        let page = page_number.to_string();
        let output = Command::new("pdftotext")
            .arg("-bbox-layout")
            .args(["-f", &page, "-l", &page])
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    QuartermatchError::PdftotextNotFound
                } else {
                    QuartermatchError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(QuartermatchError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let layout = parse_bbox_layout(&xml, page_number)?;

        tracing::debug!(
            page = page_number,
            blocks = layout.blocks.len(),
            words = layout.words.len(),
            "pdftotext page extracted"
        );

        Ok(layout)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Parse `pdftotext -bbox-layout` output for a single page.
///
/// Every `<word>` becomes a word fragment. Every `<block>` becomes a block
/// fragment whose text is its words joined by single spaces.
fn parse_bbox_layout(xml: &str, page_number: usize) -> Result<PageLayout, QuartermatchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut layout = PageLayout {
        page_number,
        ..Default::default()
    };
    let mut seen_page = false;
    let mut block: Option<(BBox, Vec<String>)> = None;
    let mut word: Option<(BBox, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(&reader, e))?;

        match event {
            Event::Start(ref e) => match e.name().as_ref() {
                b"page" => {
                    if seen_page {
                        break; // only the requested page is wanted
                    }
                    seen_page = true;
                }
                b"block" => block = Some((parse_bbox(e)?, Vec::new())),
                b"word" => word = Some((parse_bbox(e)?, String::new())),
                _ => {}
            },
            Event::Text(ref t) => {
                if let Some((_, text)) = word.as_mut() {
                    let unescaped = t.unescape().map_err(|e| xml_error(&reader, e))?;
                    text.push_str(&unescaped);
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"word" => {
                    if let Some((bbox, text)) = word.take() {
                        let text = text.trim().to_string();
                        if !text.is_empty() {
                            if let Some((_, words)) = block.as_mut() {
                                words.push(text.clone());
                            }
                            layout.words.push(TextFragment::word(bbox, text));
                        }
                    }
                }
                b"block" => {
                    if let Some((bbox, words)) = block.take() {
                        if !words.is_empty() {
                            layout.blocks.push(TextFragment::block(bbox, words.join(" ")));
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_page {
        return Err(QuartermatchError::Extraction(format!(
            "page {} not found in PDF",
            page_number
        )));
    }

    Ok(layout)
}

fn parse_bbox(tag: &BytesStart) -> Result<BBox, QuartermatchError> {
    Ok(BBox {
        x0: parse_attr_f32(tag, "xMin")?,
        y0: parse_attr_f32(tag, "yMin")?,
        x1: parse_attr_f32(tag, "xMax")?,
        y1: parse_attr_f32(tag, "yMax")?,
    })
}

fn parse_attr_f32(tag: &BytesStart, name: &str) -> Result<f32, QuartermatchError> {
    let missing = || {
        QuartermatchError::Extraction(format!(
            "<{}> is missing a numeric '{}' attribute",
            String::from_utf8_lossy(tag.name().as_ref()),
            name
        ))
    };
    let attr = tag
        .try_get_attribute(name)
        .map_err(|e| QuartermatchError::Extraction(e.to_string()))?
        .ok_or_else(missing)?;
    let value = attr
        .unescape_value()
        .map_err(|e| QuartermatchError::Extraction(e.to_string()))?;
    value.trim().parse().map_err(|_| missing())
}

fn xml_error<E: std::fmt::Display>(reader: &Reader<&[u8]>, e: E) -> QuartermatchError {
    QuartermatchError::Extraction(format!(
        "invalid pdftotext output at byte {}: {}",
        reader.buffer_position(),
        e
    ))
}
