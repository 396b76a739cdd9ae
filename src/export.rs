//! Export orchestration.
//!
//! Drives the whole pipeline for one travel record: parse the description
//! into blocks, render blocks into themed regions, fill fixed-size pages,
//! append the gallery and map/locations pages when the record carries that
//! data, rasterize every page through the injected rasterizer, and assemble
//! the final document.
//!
//! Each export run is self-contained; no state is shared between runs, so
//! independent exports may proceed concurrently.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::blocks::{ContentBlock, GalleryImage, HeadingLevel};
use crate::error::Result;
use crate::page::{PageGenerator, HEADER_HEIGHT, PAGE_HEIGHT};
use crate::parser;
use crate::pdf::{assemble, PdfExportResult};
use crate::raster::{PageMarkup, Rasterizer};
use crate::render::{self, placeholders, PageRegion};
use crate::theme::PdfTheme;

/// A stop on the travel route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoutePoint {
    /// Display name of the stop
    pub name: String,
    /// Street address, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// The raw travel record supplied by the travel data source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TravelRecord {
    /// Travel title, shown in the running header of every page
    pub title: String,
    /// Rich-text description as untrusted HTML
    pub description_html: String,
    /// Photo gallery
    pub gallery: Vec<GalleryImage>,
    /// Route stops for the map/locations page
    pub points: Vec<RoutePoint>,
}

/// Per-export options.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Raster snapshot of the map, when the map UI captured one. Without it
    /// the map page falls back to a vector placeholder.
    pub map_snapshot: Option<String>,
}

/// Heading of the appended gallery page.
const GALLERY_HEADING: &str = "Фотографии путешествия";

/// Blocks taller than a page are shrunk at most this far before being
/// placed on a page of their own.
const MIN_SCALE: f32 = 0.4;

/// Vector fallback for the map page when no snapshot was captured.
const MAP_FALLBACK_SVG: &str = concat!(
    "<svg viewBox=\"0 0 698 420\" xmlns=\"http://www.w3.org/2000/svg\" style=\"width: 100%;\">",
    "<rect width=\"698\" height=\"420\" rx=\"8\" fill=\"#EDF2F7\" stroke=\"#CBD5E0\"/>",
    "<path d=\"M120 320 C 240 180, 420 260, 580 110\" fill=\"none\" stroke=\"#A0AEC0\" ",
    "stroke-width=\"3\" stroke-dasharray=\"10 8\"/>",
    "<circle cx=\"120\" cy=\"320\" r=\"10\" fill=\"#718096\"/>",
    "<circle cx=\"580\" cy=\"110\" r=\"10\" fill=\"#718096\"/>",
    "</svg>"
);

/// Exports travel records as PDF books through an injected rasterizer.
pub struct BookExporter<R: Rasterizer> {
    theme: PdfTheme,
    rasterizer: R,
}

impl<R: Rasterizer> BookExporter<R> {
    /// Create an exporter over a resolved theme and a rasterizer.
    pub fn new(theme: PdfTheme, rasterizer: R) -> Self {
        Self { theme, rasterizer }
    }

    /// The injected rasterizer.
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Export a record with default options.
    pub fn export(&self, record: &TravelRecord, base_filename: &str) -> Result<PdfExportResult> {
        self.export_with(record, &ExportOptions::default(), base_filename)
    }

    /// Export a record into a single PDF artifact.
    ///
    /// Parsing and rendering degrade per block and never fail the export;
    /// only rasterization and assembly errors surface.
    pub fn export_with(
        &self,
        record: &TravelRecord,
        options: &ExportOptions,
        base_filename: &str,
    ) -> Result<PdfExportResult> {
        let blocks = parser::parse(&record.description_html);
        debug!("parsed {} content blocks", blocks.len());

        let generator = PageGenerator::new(&self.theme);
        let mut markups: Vec<String> = fill_pages(&blocks, &self.theme)
            .iter()
            .enumerate()
            .map(|(index, regions)| {
                generator.content_page(&record.title, regions, index as u32 + 1)
            })
            .collect();

        if !record.gallery.is_empty() {
            let page_number = markups.len() as u32 + 1;
            markups.push(generator.content_page(
                &record.title,
                &gallery_page_regions(&record.gallery, &self.theme),
                page_number,
            ));
        }

        if !record.points.is_empty() || options.map_snapshot.is_some() {
            let page_number = markups.len() as u32 + 1;
            markups.push(generator.map_page(
                &record.title,
                options.map_snapshot.as_deref(),
                MAP_FALLBACK_SVG,
                &location_list_markup(&record.points, &self.theme),
                page_number,
            ));
        }

        if markups.is_empty() {
            // A record with no usable content still exports as one page with
            // the running header, never as a zero-page failure
            markups.push(generator.content_page(&record.title, &[], 1));
        }
        debug!("composed {} pages", markups.len());

        let mut rendered = Vec::with_capacity(markups.len());
        for (index, markup) in markups.into_iter().enumerate() {
            let page = PageMarkup {
                page_id: format!("page-{}", index + 1),
                page_number: index as u32 + 1,
                markup,
            };
            rendered.push(self.rasterizer.rasterize(&page)?);
        }

        assemble(&rendered, base_filename)
    }
}

/// Greedy page filling: blocks flow into a page until the estimated content
/// height is exhausted. A single block taller than a page is shrunk via the
/// renderer's `scale` knob and placed on a page of its own.
fn fill_pages(blocks: &[ContentBlock], theme: &PdfTheme) -> Vec<Vec<PageRegion>> {
    let available =
        PAGE_HEIGHT - 2.0 * theme.spacing.page_padding - HEADER_HEIGHT - theme.spacing.block_gap;

    let mut pages: Vec<Vec<PageRegion>> = Vec::new();
    let mut current: Vec<PageRegion> = Vec::new();
    let mut used = 0.0f32;

    for block in blocks {
        let mut region = render::render(block, theme, 1.0);

        if region.estimated_height > available {
            let scale = (available / region.estimated_height).clamp(MIN_SCALE, 1.0);
            debug!("shrinking oversized {} block to scale {:.2}", block.kind(), scale);
            region = render::render(block, theme, scale);
            if !current.is_empty() {
                pages.push(std::mem::take(&mut current));
                used = 0.0;
            }
            pages.push(vec![region]);
            continue;
        }

        if used + region.estimated_height > available && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
            used = 0.0;
        }
        used += region.estimated_height;
        current.push(region);
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

/// The appended gallery page: heading plus a photo grid. Wide galleries use
/// two columns; a lone photo gets the full width.
fn gallery_page_regions(gallery: &[GalleryImage], theme: &PdfTheme) -> Vec<PageRegion> {
    let heading = render::render(
        &ContentBlock::Heading {
            level: HeadingLevel::H2,
            text: GALLERY_HEADING.to_string(),
        },
        theme,
        1.0,
    );
    let columns = if gallery.len() > 1 { 2 } else { 1 };
    let grid = render::render(
        &ContentBlock::ImageGallery {
            images: gallery.to_vec(),
            columns,
        },
        theme,
        1.0,
    );
    vec![heading, grid]
}

/// Route point list markup for the map page.
fn location_list_markup(points: &[RoutePoint], theme: &PdfTheme) -> String {
    if points.is_empty() {
        return String::new();
    }

    let heading = render::render(
        &ContentBlock::Heading {
            level: HeadingLevel::H3,
            text: placeholders::ROUTE_POINTS.to_string(),
        },
        theme,
        1.0,
    );
    let items: Vec<String> = points
        .iter()
        .map(|point| match point.address.as_deref() {
            Some(address) if !address.is_empty() => format!("{} — {}", point.name, address),
            _ => point.name.clone(),
        })
        .collect();
    let list = render::render(
        &ContentBlock::List {
            items,
            ordered: true,
        },
        theme,
        1.0,
    );

    format!("{}{}", heading.markup, list.markup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::raster::RenderedPage;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use std::cell::RefCell;

    /// Deterministic stand-in for the external rasterizer: records the
    /// markup it receives and returns a fixed PNG bitmap per page.
    struct FakeRasterizer {
        seen: RefCell<Vec<PageMarkup>>,
    }

    impl FakeRasterizer {
        fn new() -> Self {
            Self {
                seen: RefCell::new(Vec::new()),
            }
        }

        fn png_uri() -> String {
            let img = image::RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3]));
            let mut buf = std::io::Cursor::new(Vec::new());
            image::DynamicImage::ImageRgb8(img)
                .write_to(&mut buf, image::ImageOutputFormat::Png)
                .unwrap();
            format!("data:image/png;base64,{}", BASE64.encode(buf.into_inner()))
        }
    }

    impl Rasterizer for FakeRasterizer {
        fn rasterize(&self, page: &PageMarkup) -> Result<RenderedPage> {
            self.seen.borrow_mut().push(page.clone());
            Ok(RenderedPage {
                page_id: page.page_id.clone(),
                page_number: page.page_number,
                width: 794,
                height: 1123,
                image_data: Self::png_uri(),
            })
        }
    }

    fn record() -> TravelRecord {
        TravelRecord {
            title: "Крым на машине".to_string(),
            description_html: "<h2>Маршрут</h2><p>Семь дней вдоль побережья.</p>\
                               <ul><li>Ялта</li><li>Судак</li></ul>"
                .to_string(),
            gallery: vec![
                GalleryImage {
                    src: "photo1.jpg".to_string(),
                    ..Default::default()
                },
                GalleryImage {
                    src: "photo2.jpg".to_string(),
                    caption: Some("Ласточкино гнездо".to_string()),
                    ..Default::default()
                },
            ],
            points: vec![
                RoutePoint {
                    name: "Ялта".to_string(),
                    address: Some("наб. Ленина".to_string()),
                },
                RoutePoint {
                    name: "Судак".to_string(),
                    address: None,
                },
            ],
        }
    }

    #[test]
    fn test_export_produces_content_gallery_and_map_pages() {
        let exporter = BookExporter::new(PdfTheme::default(), FakeRasterizer::new());
        let result = exporter.export(&record(), "crimea").unwrap();

        assert_eq!(result.filename, "crimea.pdf");
        assert!(result.pages_count >= 3);
        assert_eq!(result.size, result.blob.len());

        let seen = exporter.rasterizer.seen.borrow();
        let all_markup: String = seen.iter().map(|p| p.markup.clone()).collect();
        assert!(all_markup.contains("Крым на машине"));
        assert!(all_markup.contains(GALLERY_HEADING));
        assert!(all_markup.contains(placeholders::ROUTE_POINTS));
        assert!(all_markup.contains("наб. Ленина"));
        // No snapshot was captured, so the vector fallback must be present
        assert!(all_markup.contains("<svg"));
    }

    #[test]
    fn test_export_page_numbers_are_contiguous() {
        let exporter = BookExporter::new(PdfTheme::default(), FakeRasterizer::new());
        let result = exporter.export(&record(), "crimea").unwrap();
        for (index, page) in result.rendered_pages.iter().enumerate() {
            assert_eq!(page.page_number, index as u32 + 1);
        }
    }

    #[test]
    fn test_export_empty_record_yields_one_page() {
        let exporter = BookExporter::new(PdfTheme::default(), FakeRasterizer::new());
        let result = exporter.export(&TravelRecord::default(), "empty").unwrap();
        assert_eq!(result.pages_count, 1);
    }

    #[test]
    fn test_export_with_map_snapshot_skips_fallback() {
        let exporter = BookExporter::new(PdfTheme::default(), FakeRasterizer::new());
        let options = ExportOptions {
            map_snapshot: Some("data:image/png;base64,SNAP".to_string()),
        };
        exporter
            .export_with(&record(), &options, "crimea")
            .unwrap();

        let seen = exporter.rasterizer.seen.borrow();
        let map_markup = &seen.last().unwrap().markup;
        assert!(map_markup.contains("data:image/png;base64,SNAP"));
        assert!(!map_markup.contains("<svg"));
    }

    #[test]
    fn test_long_description_spills_onto_multiple_pages() {
        let mut html = String::new();
        for i in 0..60 {
            html.push_str(&format!("<h3>День {}</h3>", i));
            html.push_str(&format!("<p>Описание дня номер {} с деталями маршрута.</p>", i));
        }
        let record = TravelRecord {
            title: "Длинное путешествие".to_string(),
            description_html: html,
            ..Default::default()
        };

        let exporter = BookExporter::new(PdfTheme::default(), FakeRasterizer::new());
        let result = exporter.export(&record, "long").unwrap();
        assert!(result.pages_count > 1);
    }

    #[test]
    fn test_rasterizer_failure_surfaces() {
        struct FailingRasterizer;
        impl Rasterizer for FailingRasterizer {
            fn rasterize(&self, page: &PageMarkup) -> Result<RenderedPage> {
                Err(Error::Rasterize {
                    page_id: page.page_id.clone(),
                    reason: "out of memory".to_string(),
                })
            }
        }

        let exporter = BookExporter::new(PdfTheme::default(), FailingRasterizer);
        let err = exporter.export(&record(), "x").unwrap_err();
        assert!(matches!(err, Error::Rasterize { .. }));
    }

    #[test]
    fn test_travel_record_deserializes_sparse_json() {
        let record: TravelRecord =
            serde_json::from_str(r#"{"title": "Поход", "descriptionHtml": "<p>x</p>"}"#).unwrap();
        assert_eq!(record.title, "Поход");
        assert!(record.gallery.is_empty());
        assert!(record.points.is_empty());
    }
}
