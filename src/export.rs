//! Export Module
//! Serializes a rendered chart to downloadable PNG or PDF bytes.
//!
//! The PDF is a single page sized to the figure's physical dimensions with the
//! raster embedded as an image. Dates and document ids are pinned, so the same
//! figure always produces the same bytes.

use crate::charts::{ChartRenderer, Figure, RenderError, RenderSettings};
use image::{ImageFormat, RgbImage};
use printpdf::lopdf;
use printpdf::{
    ColorBits, ColorSpace, CustomPdfConformance, Image, ImageTransform, ImageXObject, Mm,
    PdfConformance, PdfDocument, Pt, Px,
};
use std::fmt;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use thiserror::Error;
use printpdf::OffsetDateTime;

/// Written as the PDF document id in place of a random one.
const PDF_DOCUMENT_ID: &str = "dataview-chart";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Pixel buffer of {found} bytes does not fit {width}x{height}")]
    BufferSize {
        found: usize,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Pdf];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Png => "chart.png",
            Self::Pdf => "chart.pdf",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("PNG"),
            Self::Pdf => f.write_str("PDF"),
        }
    }
}

/// A file ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn save_to(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Turns figures into PNG or PDF downloads.
pub struct Exporter;

impl Exporter {
    pub fn export(
        figure: &Figure,
        format: ExportFormat,
        settings: &RenderSettings,
    ) -> Result<Download, ExportError> {
        let rgb = ChartRenderer::render_rgb(figure, settings)?;
        let bytes = match format {
            ExportFormat::Png => Self::encode_png(&rgb, settings)?,
            ExportFormat::Pdf => Self::encode_pdf(&rgb, settings, &figure.title)?,
        };
        Ok(Download {
            file_name: format.file_name().to_string(),
            mime: format.mime(),
            bytes,
        })
    }

    fn check_buffer(rgb: &[u8], settings: &RenderSettings) -> Result<(), ExportError> {
        if rgb.len() != settings.buffer_len() {
            return Err(ExportError::BufferSize {
                found: rgb.len(),
                width: settings.width,
                height: settings.height,
            });
        }
        Ok(())
    }

    pub fn encode_png(rgb: &[u8], settings: &RenderSettings) -> Result<Vec<u8>, ExportError> {
        Self::check_buffer(rgb, settings)?;
        let image = RgbImage::from_raw(settings.width, settings.height, rgb.to_vec()).ok_or(
            ExportError::BufferSize {
                found: rgb.len(),
                width: settings.width,
                height: settings.height,
            },
        )?;
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Build a one-page PDF showing the raster full-bleed, the page sized to
    /// the figure at its DPI.
    pub fn encode_pdf(
        rgb: &[u8],
        settings: &RenderSettings,
        title: &str,
    ) -> Result<Vec<u8>, ExportError> {
        Self::check_buffer(rgb, settings)?;

        let (page_w, page_h) = settings.page_points();
        let (doc, page, layer) =
            PdfDocument::new(title, Mm::from(Pt(page_w)), Mm::from(Pt(page_h)), "Chart");
        let doc = doc
            .with_conformance(PdfConformance::Custom(CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..Default::default()
            }))
            .with_creation_date(OffsetDateTime::unix_epoch())
            .with_mod_date(OffsetDateTime::unix_epoch())
            .with_document_id(PDF_DOCUMENT_ID.to_string());

        let image = Image::from(ImageXObject {
            width: Px(settings.width as usize),
            height: Px(settings.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: rgb.to_vec(),
            image_filter: None,
            clipping_bbox: None,
        });
        image.add_to_layer(
            doc.get_page(page).get_layer(layer),
            ImageTransform {
                dpi: Some(f64::from(settings.dpi.max(1))),
                ..Default::default()
            },
        );

        let mut saved = Vec::new();
        {
            let mut writer = BufWriter::new(&mut saved);
            doc.save(&mut writer)
                .map_err(|e| ExportError::Pdf(e.to_string()))?;
            writer.flush()?;
        }
        Self::pin_trailer_id(&saved)
    }

    /// The writer stamps a random instance id into the trailer; replace it
    /// with the fixed document id.
    fn pin_trailer_id(pdf: &[u8]) -> Result<Vec<u8>, ExportError> {
        let mut doc =
            lopdf::Document::load_mem(pdf).map_err(|e| ExportError::Pdf(e.to_string()))?;
        let id = lopdf::Object::string_literal(PDF_DOCUMENT_ID);
        doc.trailer
            .set("ID", lopdf::Object::Array(vec![id.clone(), id]));
        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RenderSettings {
        RenderSettings {
            width: 4,
            height: 2,
            dpi: 100,
        }
    }

    fn stripes() -> Vec<u8> {
        (0..settings().buffer_len()).map(|i| (i * 37 % 256) as u8).collect()
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn format_metadata() {
        assert_eq!(ExportFormat::Png.file_name(), "chart.png");
        assert_eq!(ExportFormat::Png.mime(), "image/png");
        assert_eq!(ExportFormat::Pdf.file_name(), "chart.pdf");
        assert_eq!(ExportFormat::Pdf.mime(), "application/pdf");
    }

    #[test]
    fn png_decodes_back_to_the_same_pixels() {
        let png = Exporter::encode_png(&stripes(), &settings()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(decoded.into_raw(), stripes());
    }

    #[test]
    fn wrong_buffer_size_is_rejected() {
        let err = Exporter::encode_png(&[0; 5], &settings()).unwrap_err();
        assert!(matches!(err, ExportError::BufferSize { found: 5, .. }));
        assert!(Exporter::encode_pdf(&[0; 5], &settings(), "t").is_err());
    }

    fn page_size(pdf: &[u8]) -> (f64, f64) {
        let doc = lopdf::Document::load_mem(pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        let media_box = doc
            .get_object(page_id)
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        let number = |o: &lopdf::Object| match o {
            lopdf::Object::Integer(i) => *i as f64,
            lopdf::Object::Real(r) => *r as f64,
            other => panic!("unexpected MediaBox entry {other:?}"),
        };
        (number(&media_box[2]), number(&media_box[3]))
    }

    #[test]
    fn pdf_is_one_page_sized_to_the_figure() {
        let pdf = Exporter::encode_pdf(&stripes(), &settings(), "Bar (a)").unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert!(find(&pdf, b"%%EOF").is_some());
        let (w, h) = page_size(&pdf);
        assert!((w - 2.88).abs() < 0.01, "{w}");
        assert!((h - 1.44).abs() < 0.01, "{h}");
    }

    #[test]
    fn pdf_bytes_are_deterministic() {
        let pdf = Exporter::encode_pdf(&stripes(), &settings(), "Bar (a)").unwrap();
        let again = Exporter::encode_pdf(&stripes(), &settings(), "Bar (a)").unwrap();
        assert_eq!(pdf, again);

        let doc = lopdf::Document::load_mem(&pdf).unwrap();
        let ids = doc.trailer.get(b"ID").unwrap().as_array().unwrap();
        for id in ids {
            assert_eq!(id.as_str().unwrap(), PDF_DOCUMENT_ID.as_bytes());
        }
    }

    #[test]
    fn pdf_accepts_non_ascii_titles() {
        let title = "Bar Chart of Größe vs Umsatz";
        let pdf = Exporter::encode_pdf(&stripes(), &settings(), title).unwrap();
        let again = Exporter::encode_pdf(&stripes(), &settings(), title).unwrap();
        assert_eq!(pdf, again);
        assert_eq!(page_size(&pdf).0.round(), 3.0);
    }
}
