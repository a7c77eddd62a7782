//! PDF backend
//!
//! Draws a [`PagedDocument`] with `printpdf` using the built-in Helvetica
//! faces. Element coordinates are already in PDF user space, so drawing is a
//! straight translation of each element.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Pt, Rect,
    Rgb, TextMatrix,
};

use crate::error::RenderError;
use crate::pagination::{Element, PagedDocument};
use crate::styles::{Color, FontWeight, TextStyle};

/// Degrees the watermark is rotated counter-clockwise
const WATERMARK_ANGLE: f32 = 45.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, RenderError> {
        Ok(Self {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(RenderError::pdf)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(RenderError::pdf)?,
            italic: doc
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(RenderError::pdf)?,
        })
    }

    fn for_weight(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
            FontWeight::Italic => &self.italic,
        }
    }
}

fn pdf_color(color: Color) -> printpdf::Color {
    let (r, g, b) = color.unit();
    printpdf::Color::Rgb(Rgb::new(r, g, b, None))
}

/// Renders every page of `document` and returns the PDF bytes
pub fn render_pdf(document: &PagedDocument) -> Result<Vec<u8>, RenderError> {
    if document.pages.is_empty() {
        return Err(RenderError::Layout("document has no pages".to_string()));
    }

    let spec = document.spec;
    let (doc, first_page, first_layer) =
        PdfDocument::new(document.title.as_str(), Mm(spec.width), Mm(spec.height), "Layer 1");
    let fonts = Fonts::load(&doc)?;

    for (index, page) in document.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(spec.width), Mm(spec.height), format!("Layer {}", index + 1));
            doc.get_page(page_index).get_layer(layer_index)
        };

        if let Some(watermark) = &document.watermark {
            draw_watermark(&layer, &fonts, watermark, spec.width, spec.height);
        }
        for element in &page.elements {
            draw(&layer, &fonts, element);
        }
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(RenderError::pdf)?;
    writer.into_inner().map_err(|e| RenderError::Io(e.into_error()))
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, element: &Element) {
    match element {
        Element::Text { x, y, text, style } => draw_text(layer, fonts, *x, *y, text, style),
        Element::Fill {
            x,
            y,
            width,
            height,
            color,
        } => {
            layer.set_fill_color(pdf_color(*color));
            let rect = Rect::new(Mm(*x), Mm(*y), Mm(x + width), Mm(y + height)).with_mode(PaintMode::Fill);
            layer.add_rect(rect);
        }
        Element::Line { from, to, rule } => {
            layer.set_outline_color(pdf_color(rule.color));
            layer.set_outline_thickness(rule.thickness_pt);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(from.0), Mm(from.1)), false),
                    (Point::new(Mm(to.0), Mm(to.1)), false),
                ],
                is_closed: false,
            });
        }
    }
}

fn draw_text(layer: &PdfLayerReference, fonts: &Fonts, x: f32, y: f32, text: &str, style: &TextStyle) {
    layer.set_fill_color(pdf_color(style.color));
    layer.use_text(text, style.size_pt, Mm(x), Mm(y), fonts.for_weight(style.weight));
}

fn draw_watermark(layer: &PdfLayerReference, fonts: &Fonts, text: &str, width: f32, height: f32) {
    let style = crate::styles::text::WATERMARK;
    // Shift back along the rotated baseline so the text centre sits on the page centre
    let half = style.text_width(text) / 2.0;
    let angle = WATERMARK_ANGLE.to_radians();
    let x = width / 2.0 - half * angle.cos();
    let y = height / 2.0 - half * angle.sin();

    layer.set_fill_color(pdf_color(style.color));
    layer.begin_text_section();
    layer.set_font(fonts.for_weight(style.weight), style.size_pt);
    layer.set_text_matrix(TextMatrix::TranslateRotate(Pt::from(Mm(x)), Pt::from(Mm(y)), WATERMARK_ANGLE));
    layer.write_text(text, fonts.for_weight(style.weight));
    layer.end_text_section();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Document, Paragraph, Section, SectionKind};
    use crate::pagination::{paginate, PageSpec};
    use crate::styles::text;

    fn paged(watermark: bool) -> PagedDocument {
        let mut document = Document::new("Test");
        document.push(Section::new(SectionKind::Header).paragraph(Paragraph::new("INVOICE", text::TITLE)));
        if watermark {
            document.watermark = Some("OVERDUE".to_string());
        }
        paginate(&document, &PageSpec::LETTER)
    }

    #[test]
    fn test_renders_pdf_header() {
        let bytes = render_pdf(&paged(false)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_renders_watermarked_pdf() {
        let bytes = render_pdf(&paged(true)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_page_set_rejected() {
        let mut document = paged(false);
        document.pages.clear();
        assert!(matches!(render_pdf(&document), Err(RenderError::Layout(_))));
    }
}
