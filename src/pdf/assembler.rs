//! PDF document assembly from rasterized pages.
//!
//! Builds a complete PDF with proper structure (header, body, xref table,
//! trailer) where every page is one full-bleed raster image. Page embedding
//! is strictly sequential: builder mutation order determines page order, so
//! pages are sorted before any object is allocated.

use bytes::Bytes;
use log::debug;

use super::image::{ImageData, ImageError};
use super::object::{dict, Dict, Object};
use super::serializer::ObjectSerializer;
use crate::error::{Error, Result};
use crate::raster::RenderedPage;
use std::io::Write;

/// The result of one export run.
///
/// Created once per call and immutable afterwards; the
/// (`blob`, `filename`, `size`) triple is the whole boundary contract a
/// download or print-preview action depends on.
#[derive(Debug, Clone)]
pub struct PdfExportResult {
    /// Download filename, always ending in `.pdf`
    pub filename: String,
    /// Number of embedded pages
    pub pages_count: usize,
    /// The input pages in final (sorted) order
    pub rendered_pages: Vec<RenderedPage>,
    /// The serialized document
    pub blob: Bytes,
    /// Exact byte length of `blob`
    pub size: usize,
}

/// Assemble rasterized pages into a single PDF document.
///
/// Pages are sorted by `page_number` ascending (input order carries no
/// meaning), each bitmap is embedded full-bleed on a page sized to its pixel
/// dimensions, and the document is serialized in one pass.
///
/// # Errors
///
/// - [`Error::NoPages`] when `pages` is empty; a zero-page document is not a
///   meaningful artifact.
/// - [`Error::InvalidDataUri`] / [`Error::UnsupportedImageFormat`] /
///   [`Error::ImageDecode`] when any page's payload cannot be embedded. A
///   single bad page fails the whole export; no partial document is
///   returned.
pub fn assemble(pages: &[RenderedPage], base_filename: &str) -> Result<PdfExportResult> {
    if pages.is_empty() {
        return Err(Error::NoPages);
    }

    let mut sorted = pages.to_vec();
    sorted.sort_by_key(|page| page.page_number);
    debug!("assembling {} pages into '{}'", sorted.len(), base_filename);

    let mut writer = DocumentWriter::new();
    for page in &sorted {
        let image = ImageData::from_data_uri(&page.image_data).map_err(|err| match err {
            ImageError::MalformedDataUri(reason) => Error::InvalidDataUri {
                page_id: page.page_id.clone(),
                reason,
            },
            ImageError::UnsupportedMime(mime) => Error::UnsupportedImageFormat {
                page_id: page.page_id.clone(),
                mime,
            },
            ImageError::Compression(reason) => Error::Compression(reason),
            ImageError::Decode(reason) => Error::ImageDecode {
                page_id: page.page_id.clone(),
                reason,
            },
        })?;
        writer.add_image_page(page.width as f64, page.height as f64, image);
    }

    let blob = Bytes::from(writer.finish()?);
    let size = blob.len();
    debug!("assembled document: {} bytes", size);

    Ok(PdfExportResult {
        filename: with_pdf_extension(base_filename),
        pages_count: sorted.len(),
        rendered_pages: sorted,
        blob,
        size,
    })
}

/// Append `.pdf` unless the name already carries it (case-insensitively), so
/// a caller passing `report.pdf` never gets `report.pdf.pdf`.
fn with_pdf_extension(base: &str) -> String {
    if base.to_ascii_lowercase().ends_with(".pdf") {
        base.to_string()
    } else {
        format!("{}.pdf", base)
    }
}

/// Internal page data.
struct PageData {
    width: f64,
    height: f64,
    image: ImageData,
}

/// Single-use PDF document writer. Each export constructs its own instance,
/// so concurrent exports never share state.
struct DocumentWriter {
    pages: Vec<PageData>,
    next_obj_id: u32,
}

impl DocumentWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            next_obj_id: 1,
        }
    }

    /// Allocate a new object ID.
    fn alloc_obj_id(&mut self) -> u32 {
        let id = self.next_obj_id;
        self.next_obj_id += 1;
        id
    }

    /// Add a page whose content is one full-bleed image.
    fn add_image_page(&mut self, width: f64, height: f64, image: ImageData) {
        self.pages.push(PageData {
            width,
            height,
            image,
        });
    }

    /// Build the complete PDF document.
    fn finish(mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut xref_offsets: Vec<(u32, usize)> = Vec::new();

        // PDF header and binary marker
        writeln!(output, "%PDF-1.7")?;
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let catalog_id = self.alloc_obj_id();
        let pages_id = self.alloc_obj_id();

        // Pre-allocate object IDs so page order is fixed before any object
        // is serialized
        struct PageIds {
            page: u32,
            content: u32,
            xobject: u32,
            soft_mask: Option<u32>,
        }
        let has_mask: Vec<bool> = self
            .pages
            .iter()
            .map(|page| page.image.soft_mask.is_some())
            .collect();
        let mut page_ids: Vec<PageIds> = Vec::with_capacity(self.pages.len());
        for masked in has_mask {
            let page = self.alloc_obj_id();
            let content = self.alloc_obj_id();
            let xobject = self.alloc_obj_id();
            let soft_mask = if masked { Some(self.alloc_obj_id()) } else { None };
            page_ids.push(PageIds {
                page,
                content,
                xobject,
                soft_mask,
            });
        }

        let mut page_refs: Vec<Object> = Vec::new();
        let mut objects: Vec<(u32, Object)> = Vec::new();

        for (index, (page, ids)) in self.pages.iter().zip(&page_ids).enumerate() {
            let resource_id = format!("Im{}", index + 1);

            // Content stream: paint the image across the whole media box
            let content = format!(
                "q\n{} 0 0 {} 0 0 cm\n/{} Do\nQ",
                page.width, page.height, resource_id
            );
            let content_obj = Object::Stream {
                dict: Dict::new(),
                data: Bytes::from(content.into_bytes()),
            };

            // Image XObject (+ soft mask when the bitmap has alpha)
            let mut xobject_dict = page.image.xobject_dict();
            if let Some(mask_id) = ids.soft_mask {
                xobject_dict.insert("SMask".to_string(), Object::reference(mask_id));
            }
            let xobject_obj = Object::Stream {
                dict: xobject_dict,
                data: Bytes::from(page.image.data.clone()),
            };

            let resources = Object::Dictionary(dict([(
                "XObject",
                Object::Dictionary(dict([(resource_id, Object::reference(ids.xobject))])),
            )]));

            let page_obj = Object::Dictionary(dict([
                ("Type", Object::name("Page")),
                ("Parent", Object::reference(pages_id)),
                ("MediaBox", Object::rect(0.0, 0.0, page.width, page.height)),
                ("Contents", Object::reference(ids.content)),
                ("Resources", resources),
            ]));

            page_refs.push(Object::reference(ids.page));
            objects.push((ids.page, page_obj));
            objects.push((ids.content, content_obj));
            objects.push((ids.xobject, xobject_obj));

            if let (Some(mask_id), Some(mask_dict), Some(mask_data)) = (
                ids.soft_mask,
                page.image.soft_mask_dict(),
                page.image.soft_mask.clone(),
            ) {
                objects.push((
                    mask_id,
                    Object::Stream {
                        dict: mask_dict,
                        data: Bytes::from(mask_data),
                    },
                ));
            }
        }

        let pages_obj = Object::Dictionary(dict([
            ("Type", Object::name("Pages")),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(self.pages.len() as i64)),
        ]));

        let catalog_obj = Object::Dictionary(dict([
            ("Type", Object::name("Catalog")),
            ("Pages", Object::reference(pages_id)),
        ]));

        // Info carries no dates, keeping serialization deterministic
        let info_id = self.alloc_obj_id();
        let info_obj = Object::Dictionary(dict([("Creator", Object::text("travelbook"))]));

        // Write all objects
        xref_offsets.push((catalog_id, output.len()));
        output.extend_from_slice(&ObjectSerializer::serialize_indirect(catalog_id, &catalog_obj));

        xref_offsets.push((pages_id, output.len()));
        output.extend_from_slice(&ObjectSerializer::serialize_indirect(pages_id, &pages_obj));

        for (obj_id, obj) in &objects {
            xref_offsets.push((*obj_id, output.len()));
            output.extend_from_slice(&ObjectSerializer::serialize_indirect(*obj_id, obj));
        }

        xref_offsets.push((info_id, output.len()));
        output.extend_from_slice(&ObjectSerializer::serialize_indirect(info_id, &info_obj));

        // Cross-reference table
        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", self.next_obj_id)?;
        writeln!(output, "0000000000 65535 f ")?;

        xref_offsets.sort_by_key(|(id, _)| *id);
        for (_, offset) in &xref_offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        let trailer = Object::Dictionary(dict([
            ("Size", Object::Integer(self.next_obj_id as i64)),
            ("Root", Object::reference(catalog_id)),
            ("Info", Object::reference(info_id)),
        ]));

        writeln!(output, "trailer")?;
        output.extend_from_slice(&ObjectSerializer::serialize(&trailer));
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        write!(output, "%%EOF")?;

        Ok(output)
    }
}
