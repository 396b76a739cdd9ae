//! Page composition.
//!
//! Wraps rendered block regions into fixed-size page markup the external
//! rasterizer consumes: page geometry, background, and a running header
//! carrying the travel name and page number on every page. The travel name
//! is user content and is always HTML-escaped before interpolation.

use crate::render::{escape_html, PageRegion};
use crate::theme::PdfTheme;

/// Page width in CSS pixels (A4 at 96 dpi).
pub const PAGE_WIDTH: f32 = 794.0;
/// Page height in CSS pixels (A4 at 96 dpi).
pub const PAGE_HEIGHT: f32 = 1123.0;
/// Content width available to block regions under default page padding.
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 96.0;
/// Vertical space reserved for the running header.
pub const HEADER_HEIGHT: f32 = 46.0;

/// Composes full pages from rendered regions and page metadata.
pub struct PageGenerator<'a> {
    theme: &'a PdfTheme,
}

impl<'a> PageGenerator<'a> {
    /// Create a generator over a resolved theme.
    pub fn new(theme: &'a PdfTheme) -> Self {
        Self { theme }
    }

    /// Compose a content page from rendered block regions.
    pub fn content_page(
        &self,
        travel_name: &str,
        regions: &[PageRegion],
        page_number: u32,
    ) -> String {
        let body: String = regions
            .iter()
            .map(|region| region.markup.as_str())
            .collect();
        self.page_shell(travel_name, &body, page_number)
    }

    /// Compose the map/locations page.
    ///
    /// When a raster `snapshot_image` is supplied it is embedded directly;
    /// otherwise the supplied vector fallback markup is used so the page is
    /// never blank. The location list markup is appended below either way.
    pub fn map_page(
        &self,
        travel_name: &str,
        snapshot_image: Option<&str>,
        vector_fallback: &str,
        location_list: &str,
        page_number: u32,
    ) -> String {
        let mut body = String::new();
        match snapshot_image {
            Some(url) if !url.is_empty() => {
                body.push_str(&format!(
                    "<img src=\"{}\" alt=\"\" style=\"width: 100%; border-radius: {}px; display: block;\">\n",
                    escape_html(url),
                    self.theme.blocks.border_radius,
                ));
            }
            _ => body.push_str(vector_fallback),
        }
        body.push_str(location_list);
        self.page_shell(travel_name, &body, page_number)
    }

    /// The shared page shell: fixed geometry, themed background, running
    /// header with the escaped travel name and the page number.
    fn page_shell(&self, travel_name: &str, body: &str, page_number: u32) -> String {
        let colors = &self.theme.colors;
        let typography = &self.theme.typography;
        let padding = self.theme.spacing.page_padding;

        let mut markup = format!(
            "<div style=\"width: {PAGE_WIDTH}px; height: {PAGE_HEIGHT}px; background: {}; padding: {}px; box-sizing: border-box; overflow: hidden;\">\n",
            colors.background, padding,
        );
        markup.push_str(&format!(
            "  <div style=\"display: flex; justify-content: space-between; align-items: baseline; height: {HEADER_HEIGHT}px; border-bottom: 1px solid {}; font-family: {}; font-size: {}px; color: {};\">\n    <span>{}</span>\n    <span>{}</span>\n  </div>\n",
            colors.border,
            typography.heading_font_family,
            typography.caption_size,
            colors.muted,
            escape_html(travel_name),
            page_number,
        ));
        markup.push_str(&format!(
            "  <div style=\"padding-top: {}px;\">\n{}  </div>\n",
            self.theme.spacing.block_gap, body,
        ));
        markup.push_str("</div>\n");
        markup
    }
}
