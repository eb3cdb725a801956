//! A4 PDF output using printpdf's built-in Helvetica faces

use printpdf::*;
use std::io::BufWriter;

use super::{wrap_text, DocumentRenderer};
use crate::error::{Error, Result};
use crate::synthesis::SynthesizedDocument;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 20.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    title_size: f32,
    heading_size: f32,
    body_size: f32,
    line_height: f32,
    wrap_chars: usize,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self {
            title_size: 18.0,
            heading_size: 13.0,
            body_size: 11.0,
            line_height: 5.5,
            wrap_chars: 90,
        }
    }

    pub fn with_wrap_chars(mut self, wrap_chars: usize) -> Self {
        self.wrap_chars = wrap_chars.max(10);
        self
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes lines top to bottom and starts a new page when the margin is reached
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
    pages: usize,
}

impl<'a> PageCursor<'a> {
    fn write(&mut self, text: &str, size: f32, font: &IndirectFontRef, advance: f32) {
        if self.y < Mm(BOTTOM) {
            self.pages += 1;
            let (page, layer) = self.doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Page {}", self.pages),
            );
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = Mm(TOP);
        }
        if !text.is_empty() {
            self.layer.use_text(text, size, Mm(MARGIN_LEFT), self.y, font);
        }
        self.y -= Mm(advance);
    }

    fn gap(&mut self, mm: f32) {
        self.y -= Mm(mm);
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, document: &SynthesizedDocument) -> Result<Vec<u8>> {
        let (doc, page1, layer1) = PdfDocument::new(
            document.title.as_str(),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Page 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::Render(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| Error::Render(e.to_string()))?;

        let pages = {
            let mut cursor = PageCursor {
                doc: &doc,
                layer: doc.get_page(page1).get_layer(layer1),
                y: Mm(TOP),
                pages: 1,
            };

            for line in wrap_text(&document.title, self.wrap_chars / 2) {
                cursor.write(&line, self.title_size, &font_bold, 9.0);
            }
            cursor.gap(6.0);

            for section in &document.sections {
                if !section.heading.is_empty() {
                    cursor.write(&section.heading, self.heading_size, &font_bold, 7.0);
                }
                for line in wrap_text(&section.body, self.wrap_chars) {
                    cursor.write(&line, self.body_size, &font, self.line_height);
                }
                cursor.gap(4.0);
            }
            cursor.pages
        };

        let mut bytes = Vec::new();
        doc.save(&mut BufWriter::new(&mut bytes))
            .map_err(|e| Error::Render(format!("Failed to save PDF: {}", e)))?;

        tracing::debug!(title = %document.title, pages, bytes = bytes.len(), "Rendered PDF");
        Ok(bytes)
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Conversation, Message};
    use crate::synthesis::{DocumentSynthesizer, SynthesisMode};

    #[test]
    fn test_renders_pdf_bytes() {
        let conversation = Conversation::from(vec![
            Message::user("breach of contract, Ahmad Khan owes PKR 500000"),
            Message::assistant("A legal notice should demand payment within fifteen days."),
        ]);
        let doc = DocumentSynthesizer::default()
            .synthesize(&conversation, SynthesisMode::Template, None)
            .unwrap();

        let bytes = PdfRenderer::new().render(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_transcript_spans_pages() {
        let long = "The tenant shall pay rent on the first day of every month. ".repeat(200);
        let conversation = Conversation::from(vec![Message::user(long.clone()), Message::assistant(long)]);
        let doc = DocumentSynthesizer::default()
            .synthesize(&conversation, SynthesisMode::Full, None)
            .unwrap();

        let bytes = PdfRenderer::new().render(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }
}
