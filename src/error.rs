//! Error types for the export pipeline.
//!
//! Only the assembly stage surfaces errors to callers. Parsing and rendering
//! failures are absorbed locally and resolved to best-effort output, so they
//! have no representation here.

/// Result type alias for export pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while assembling the export artifact.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Assembly was invoked with an empty page list
    #[error("no pages to assemble: at least one rendered page is required")]
    NoPages,

    /// A page's image payload is not a well-formed data URI
    #[error("invalid data URI on page {page_id}: {reason}")]
    InvalidDataUri {
        /// Identifier of the offending page
        page_id: String,
        /// Reason the URI was rejected
        reason: String,
    },

    /// A page's image payload carries a MIME type outside the png/jpeg contract
    #[error("unsupported image format '{mime}' on page {page_id}: only image/png and image/jpeg can be embedded")]
    UnsupportedImageFormat {
        /// Identifier of the offending page
        page_id: String,
        /// The MIME type found in the data URI
        mime: String,
    },

    /// A page's image data could not be decoded as its declared format
    #[error("failed to decode image on page {page_id}: {reason}")]
    ImageDecode {
        /// Identifier of the offending page
        page_id: String,
        /// Decoder failure detail
        reason: String,
    },

    /// The external rasterizer failed to produce a bitmap for a page
    #[error("rasterization failed for page {page_id}: {reason}")]
    Rasterize {
        /// Identifier of the page that failed to rasterize
        page_id: String,
        /// Failure detail reported by the rasterizer
        reason: String,
    },

    /// Image data compression failed while building a PDF stream
    #[error("compression error: {0}")]
    Compression(String),

    /// IO error while serializing the document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
