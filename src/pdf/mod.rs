//! PDF document assembly.
//!
//! The write-side half of the pipeline: a minimal PDF object model, a
//! spec-compliant object serializer, raster image embedding, and the
//! assembler that turns a set of rasterized pages into one downloadable
//! document.

pub mod assembler;
pub mod image;
pub mod object;
pub mod serializer;

pub use assembler::{assemble, PdfExportResult};
pub use image::{ColorSpace, ImageData, ImageError, ImageFormat};
pub use object::{dict, Dict, Object, ObjectRef};
pub use serializer::ObjectSerializer;
