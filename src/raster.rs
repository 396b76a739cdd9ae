//! Rasterizer boundary.
//!
//! The component that turns page markup into a bitmap lives outside this
//! crate (in production it is a headless page renderer). It is modeled as an
//! injected capability so the exporter and assembler can be driven by a fake
//! returning deterministic fixtures.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One composed page awaiting rasterization.
#[derive(Debug, Clone)]
pub struct PageMarkup {
    /// Stable page identifier, carried through to the rendered page
    pub page_id: String,
    /// 1-based page number
    pub page_number: u32,
    /// Full page markup from the page generator
    pub markup: String,
}

/// A rasterized page: bitmap plus its page number and pixel dimensions.
///
/// Pages may arrive in arbitrary order and with non-contiguous page numbers;
/// the assembler sorts before embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    /// Identifier of the source page
    pub page_id: String,
    /// 1-based page number used for final ordering
    pub page_number: u32,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Bitmap encoded as a `data:image/{png|jpeg};base64,…` URI
    pub image_data: String,
}

/// External page rasterizer.
pub trait Rasterizer {
    /// Produce a bitmap for one composed page.
    fn rasterize(&self, page: &PageMarkup) -> Result<RenderedPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_page_wire_names() {
        let page = RenderedPage {
            page_id: "p1".to_string(),
            page_number: 1,
            width: 794,
            height: 1123,
            image_data: "data:image/png;base64,AAAA".to_string(),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageId"], "p1");
        assert_eq!(json["pageNumber"], 1);
        assert_eq!(json["imageData"], "data:image/png;base64,AAAA");
    }
}
