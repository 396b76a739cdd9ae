#![warn(missing_docs)]

//! # travelbook
//!
//! The travel-book export pipeline: turns a travel record (rich-text
//! description, photo gallery, route points) into a downloadable PDF.
//!
//! ## Pipeline
//!
//! ```text
//! raw HTML → parser → blocks → render (+ theme) → page markup
//!          → [external rasterizer] → rendered pages → assembler → PDF
//! ```
//!
//! - [`parser::parse`] turns untrusted editor HTML into typed
//!   [`blocks::ContentBlock`] values; it is total and never fails.
//! - [`render::render`] maps each block to themed page-region markup;
//!   empty collections degrade to localized placeholders.
//! - [`page::PageGenerator`] composes fixed-size pages with a running
//!   header, including the map/locations page.
//! - The [`raster::Rasterizer`] trait is the seam to the external bitmap
//!   renderer.
//! - [`pdf::assemble`] sorts rasterized pages, embeds the PNG/JPEG bitmaps
//!   full-bleed, and serializes the document.
//!
//! ## Quick Start
//!
//! ```ignore
//! use travelbook::{BookExporter, PdfTheme, TravelRecord};
//!
//! let theme = PdfTheme::resolve(&settings.theme_document());
//! let exporter = BookExporter::new(theme, rasterizer);
//! let result = exporter.export(&record, "crimea-trip")?;
//! assert!(result.filename.ends_with(".pdf"));
//! ```
//!
//! Only assembly-stage failures surface as errors; parsing and rendering
//! absorb malformed input and degrade to best-effort output.

// Error handling
pub mod error;

// Content model and parsing
pub mod blocks;
pub mod parser;

// Theming and page rendering
pub mod page;
pub mod render;
pub mod theme;

// Rasterizer boundary
pub mod raster;

// Document assembly
pub mod pdf;

// Pipeline orchestration
pub mod export;

pub use blocks::{ChecklistItem, ContentBlock, GalleryImage, HeadingLevel, InfoVariant};
pub use error::{Error, Result};
pub use export::{BookExporter, ExportOptions, RoutePoint, TravelRecord};
pub use page::PageGenerator;
pub use parser::parse;
pub use pdf::{assemble, PdfExportResult};
pub use raster::{PageMarkup, RenderedPage, Rasterizer};
pub use render::{render, render_map, MapContent, PageRegion};
pub use theme::{CalloutPalette, PdfTheme};
