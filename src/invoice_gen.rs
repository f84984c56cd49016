use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::invoice_doc::{CUSTOMER_UNAVAILABLE, DocumentRow, InvoiceDocument, PRODUCT_NOT_FOUND};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Turns an [`InvoiceDocument`] into file bytes
pub trait DocumentRenderer {
    fn extension(&self) -> &'static str;
    fn render(&self, doc: &InvoiceDocument) -> Result<Vec<u8>, RenderError>;
}

pub fn format_money(amount: Decimal) -> String {
    format!("Rs {:.2}", amount)
}

/// Writes rendered invoices to a directory
pub struct InvoiceGenerator {
    output_dir: PathBuf,
}

impl InvoiceGenerator {
    pub fn new(output_dir: &Path) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render `doc` and write it; returns the file path
    pub fn export(&self, doc: &InvoiceDocument, renderer: &dyn DocumentRenderer) -> Result<PathBuf> {
        let bytes = renderer.render(doc)?;

        let path = self.output_dir.join(format!(
            "invoice_{}.{}",
            chrono::Local::now().format("%Y%m%d%H%M%S%3f"),
            renderer.extension()
        ));

        fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), rows = doc.rows.len(), "invoice exported");

        Ok(path)
    }
}

/// Markdown rendition, handy for previews and plain-text archives
pub struct MarkdownRenderer;

impl DocumentRenderer for MarkdownRenderer {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, doc: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
        let mut content = String::new();

        content.push_str(&format!("# {}\n\n", doc.title));
        if let Some(reference) = doc.reference {
            content.push_str(&format!("**Invoice #** {reference}\n\n"));
        }
        if let Some(date) = doc.issued_on {
            content.push_str(&format!("Issued on {}\n\n", date.format("%d/%m/%Y")));
        }

        content.push_str("## Customer Information\n\n");
        match &doc.customer {
            Some(customer) => {
                content.push_str(&format!("- Name: {}\n", customer.name));
                content.push_str(&format!("- Email: {}\n", customer.email));
                content.push_str(&format!("- Address: {}\n", customer.address));
                content.push_str(&format!("- Mobile Number: {}\n\n", customer.mobile));
            }
            None => content.push_str(&format!("{CUSTOMER_UNAVAILABLE}\n\n")),
        }

        content.push_str("| Product | Quantity | Price | Total |\n");
        content.push_str("|:--|--:|--:|--:|\n");
        for row in &doc.rows {
            match row {
                DocumentRow::Resolved {
                    name,
                    quantity,
                    unit_price,
                    line_total,
                } => content.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    name,
                    quantity,
                    format_money(*unit_price),
                    format_money(*line_total)
                )),
                DocumentRow::Unresolved { quantity, .. } => {
                    content.push_str(&format!("| {PRODUCT_NOT_FOUND} | {quantity} | | |\n"))
                }
            }
        }

        content.push_str(&format!("\n**Total: {}**\n", format_money(doc.grand_total)));

        Ok(content.into_bytes())
    }
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 20.0;
const ROW_HEIGHT: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 25.0;
const COLUMN_WIDTHS: [f32; 4] = [60.0, 30.0, 40.0, 40.0];
const HEADERS: [&str; 4] = ["Product", "Quantity", "Price", "Total"];

/// A4 PDF with an optional logo in the header
pub struct PdfRenderer {
    logo: Option<Vec<u8>>,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self { logo: None }
    }

    /// Read the logo file. A missing or unreadable file only costs the logo.
    pub fn with_logo_file(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => Self { logo: Some(bytes) },
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "invoice logo unavailable");
                Self::new()
            }
        }
    }

    pub fn with_logo_bytes(bytes: Vec<u8>) -> Self {
        Self { logo: Some(bytes) }
    }

    /// Draw the logo if it decodes; report whether it was drawn
    fn draw_logo(&self, layer: &PdfLayerReference) -> bool {
        let Some(bytes) = &self.logo else {
            return false;
        };

        match printpdf::image_crate::load_from_memory(bytes) {
            Ok(decoded) => {
                let image = Image::from_dynamic_image(&decoded);
                image.add_to_layer(
                    layer.clone(),
                    ImageTransform {
                        translate_x: Some(Mm(LEFT)),
                        translate_y: Some(Mm(PAGE_HEIGHT - 50.0)),
                        dpi: Some(300.0),
                        ..Default::default()
                    },
                );
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "invoice logo could not be decoded");
                false
            }
        }
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Current page and vertical position while laying out
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl Cursor<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Page {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.y = PAGE_HEIGHT - 20.0;
    }

    fn ensure_room(&mut self, needed: f32) -> bool {
        if self.y - needed < BOTTOM_MARGIN {
            self.new_page();
            return true;
        }
        false
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn rule(layer: &PdfLayerReference, y: f32, width: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(LEFT), Mm(y)), false),
            (Point::new(Mm(LEFT + width), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn table_header(cursor: &mut Cursor<'_>, fonts: &Fonts) {
    let width: f32 = COLUMN_WIDTHS.iter().sum();
    cursor.layer.set_fill_color(rgb(34, 68, 102));
    let mut x = LEFT;
    for (header, column) in HEADERS.iter().zip(COLUMN_WIDTHS) {
        cursor
            .layer
            .use_text(*header, 12.0, Mm(x + 5.0), Mm(cursor.y - 7.0), &fonts.bold);
        x += column;
    }
    cursor.layer.set_fill_color(rgb(0, 0, 0));
    rule(&cursor.layer, cursor.y, width);
    rule(&cursor.layer, cursor.y - ROW_HEIGHT, width);
    cursor.y -= ROW_HEIGHT;
}

impl DocumentRenderer for PdfRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, doc: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
        let (pdf, page1, layer1) =
            PdfDocument::new(doc.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let fonts = Fonts {
            regular: pdf
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| RenderError::Pdf(e.to_string()))?,
            bold: pdf
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| RenderError::Pdf(e.to_string()))?,
        };

        let mut cursor = Cursor {
            doc: &pdf,
            layer: pdf.get_page(page1).get_layer(layer1),
            y: PAGE_HEIGHT - 20.0,
            pages: 1,
        };

        // Header: logo when available, the title always
        let title_y = if self.draw_logo(&cursor.layer) {
            PAGE_HEIGHT - 60.0
        } else {
            PAGE_HEIGHT - 20.0
        };
        cursor.layer.set_fill_color(rgb(34, 68, 102));
        cursor.layer.use_text(
            doc.title.as_str(),
            22.0,
            Mm(PAGE_WIDTH / 2.0 - 15.0),
            Mm(title_y),
            &fonts.bold,
        );
        cursor.layer.set_fill_color(rgb(34, 34, 34));
        cursor.y = title_y - 10.0;

        if let Some(reference) = doc.reference {
            cursor.layer.use_text(
                format!("Invoice # {reference}"),
                11.0,
                Mm(LEFT),
                Mm(cursor.y),
                &fonts.regular,
            );
        }
        if let Some(date) = doc.issued_on {
            cursor.layer.use_text(
                format!("Date: {}", date.format("%d/%m/%Y")),
                11.0,
                Mm(140.0),
                Mm(cursor.y),
                &fonts.regular,
            );
        }
        cursor.y -= 10.0;

        // Customer information
        match &doc.customer {
            Some(customer) => {
                cursor.layer.use_text(
                    "Customer Information",
                    14.0,
                    Mm(LEFT),
                    Mm(cursor.y),
                    &fonts.bold,
                );
                for line in [
                    format!("Name: {}", customer.name),
                    format!("Email: {}", customer.email),
                    format!("Address: {}", customer.address),
                    format!("Mobile Number: {}", customer.mobile),
                ] {
                    cursor.y -= 8.0;
                    cursor
                        .layer
                        .use_text(line, 12.0, Mm(LEFT), Mm(cursor.y), &fonts.regular);
                }
            }
            None => {
                cursor.layer.use_text(
                    CUSTOMER_UNAVAILABLE,
                    12.0,
                    Mm(LEFT),
                    Mm(cursor.y),
                    &fonts.regular,
                );
            }
        }
        cursor.y -= 15.0;

        // Line items, header repeated on every page
        table_header(&mut cursor, &fonts);
        let table_width: f32 = COLUMN_WIDTHS.iter().sum();
        for row in &doc.rows {
            if cursor.ensure_room(ROW_HEIGHT) {
                table_header(&mut cursor, &fonts);
            }
            let text_y = cursor.y - 7.0;
            match row {
                DocumentRow::Resolved {
                    name,
                    quantity,
                    unit_price,
                    line_total,
                } => {
                    let cells = [
                        name.clone(),
                        quantity.to_string(),
                        format_money(*unit_price),
                        format_money(*line_total),
                    ];
                    let mut x = LEFT;
                    for (cell, column) in cells.into_iter().zip(COLUMN_WIDTHS) {
                        cursor
                            .layer
                            .use_text(cell, 11.0, Mm(x + 5.0), Mm(text_y), &fonts.regular);
                        x += column;
                    }
                }
                DocumentRow::Unresolved { quantity, .. } => {
                    cursor.layer.use_text(
                        PRODUCT_NOT_FOUND,
                        11.0,
                        Mm(LEFT + 5.0),
                        Mm(text_y),
                        &fonts.regular,
                    );
                    cursor.layer.use_text(
                        quantity.to_string(),
                        11.0,
                        Mm(LEFT + COLUMN_WIDTHS[0] + 5.0),
                        Mm(text_y),
                        &fonts.regular,
                    );
                }
            }
            cursor.y -= ROW_HEIGHT;
            rule(&cursor.layer, cursor.y, table_width);
        }

        // Grand total
        cursor.ensure_room(2.0 * ROW_HEIGHT);
        cursor.y -= ROW_HEIGHT;
        cursor.layer.use_text(
            format!("Total: {}", format_money(doc.grand_total)),
            14.0,
            Mm(LEFT + table_width - 50.0),
            Mm(cursor.y),
            &fonts.bold,
        );

        tracing::debug!(pages = cursor.pages, "invoice PDF laid out");

        pdf.save_to_bytes()
            .map_err(|e| RenderError::Pdf(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice_doc::CustomerBlock;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample(rows: usize) -> InvoiceDocument {
        let mut doc_rows = Vec::new();
        for i in 0..rows {
            doc_rows.push(DocumentRow::Resolved {
                name: format!("Item {i}"),
                quantity: 2,
                unit_price: dec("1.25"),
                line_total: dec("2.50"),
            });
        }
        doc_rows.push(DocumentRow::Unresolved {
            product_id: Some(77),
            quantity: 1,
        });

        InvoiceDocument {
            title: "Invoice".into(),
            reference: Some(12),
            issued_on: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
            customer: Some(CustomerBlock {
                name: "Asha".into(),
                email: "asha@example.com".into(),
                address: "Pune".into(),
                mobile: "98200".into(),
            }),
            rows: doc_rows,
            grand_total: dec("2.50") * Decimal::from(rows as u64),
        }
    }

    #[test]
    fn markdown_marks_missing_products() {
        let bytes = MarkdownRenderer.render(&sample(1)).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("# Invoice"));
        assert!(text.contains("| Item 0 | 2 | Rs 1.25 | Rs 2.50 |"));
        assert!(text.contains(PRODUCT_NOT_FOUND));
        assert!(text.contains("**Total: Rs 2.50**"));
    }

    #[test]
    fn markdown_without_customer() {
        let mut doc = sample(0);
        doc.customer = None;
        let text = String::from_utf8(MarkdownRenderer.render(&doc).unwrap()).unwrap();
        assert!(text.contains(CUSTOMER_UNAVAILABLE));
    }

    #[test]
    fn pdf_renders_without_logo() {
        let bytes = PdfRenderer::new().render(&sample(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn pdf_survives_broken_logo() {
        let renderer = PdfRenderer::with_logo_bytes(b"definitely not an image".to_vec());
        let bytes = renderer.render(&sample(2)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn pdf_survives_missing_logo_file() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::with_logo_file(&dir.path().join("nope.jpg"));
        assert!(renderer.render(&sample(1)).is_ok());
    }

    #[test]
    fn long_invoices_paginate() {
        let short = PdfRenderer::new().render(&sample(1)).unwrap();
        let long = PdfRenderer::new().render(&sample(60)).unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }

    #[test]
    fn export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let generator = InvoiceGenerator::new(&dir.path().join("out")).unwrap();

        let path = generator.export(&sample(1), &MarkdownRenderer).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("invoice_"));
        assert!(name.ends_with(".md"));
        assert!(path.starts_with(generator.output_dir()));
        assert!(fs::read_to_string(path).unwrap().contains("Rs 2.50"));
    }
}
