//! Theme-driven block rendering.
//!
//! Maps each content block variant to a page region: self-contained markup
//! with inline styling derived from the resolved theme, plus an estimated
//! pixel height the page composer uses to fill fixed-size pages. All user
//! text is HTML-escaped on interpolation. Empty collections render localized
//! placeholder copy instead of empty structures, so a page never shows a
//! bare grid or a zero-row table.

use crate::blocks::{ChecklistItem, ContentBlock, GalleryImage, HeadingLevel, InfoVariant};
use crate::page::CONTENT_WIDTH;
use crate::theme::PdfTheme;

/// Localized placeholder copy, centralized so a localization layer can
/// replace it wholesale.
pub mod placeholders {
    /// Shown for a checklist with no items
    pub const CHECKLIST_EMPTY: &str = "Добавьте пункты чек-листа";
    /// Shown for a table with no data rows
    pub const TABLE_EMPTY: &str = "Таблица пока пуста";
    /// Shown for a gallery with no images
    pub const GALLERY_EMPTY: &str = "Галерея путешествия";
    /// Shown for a map page without a snapshot or route data
    pub const MAP_EMPTY: &str = "Карта маршрута";
    /// Heading of the route point list on the map page
    pub const ROUTE_POINTS: &str = "Точки маршрута";
}

/// A rendered page region: markup plus the vertical space it is expected to
/// occupy at the given scale.
#[derive(Debug, Clone)]
pub struct PageRegion {
    /// Self-contained markup with inline styles
    pub markup: String,
    /// Estimated height in CSS pixels, used for page filling
    pub estimated_height: f32,
}

/// Map region content, assembled by the page generator (never produced by
/// the content parser).
#[derive(Debug, Clone, Default)]
pub struct MapContent {
    /// Raster or remote URL of the map image, when one exists
    pub image_url: Option<String>,
    /// Free-form route description
    pub description: Option<String>,
    /// Route point labels in visiting order
    pub route_points: Vec<String>,
}

/// Escape HTML special characters.
///
/// Replaces &, <, >, ", and ' with their HTML entity equivalents.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Render one block to a page region.
///
/// `scale` uniformly multiplies every computed pixel metric; the page
/// composer uses it to shrink an oversized block onto a single page.
pub fn render(block: &ContentBlock, theme: &PdfTheme, scale: f32) -> PageRegion {
    match block {
        ContentBlock::Paragraph { text } => render_paragraph(text, theme, scale),
        ContentBlock::Heading { level, text } => render_heading(*level, text, theme, scale),
        ContentBlock::List { items, ordered } => render_list(items, *ordered, theme, scale),
        ContentBlock::Quote { text, author } => render_quote(text, author.as_deref(), theme, scale),
        ContentBlock::Image { src, alt, caption } => {
            render_image(src, alt.as_deref(), caption.as_deref(), theme, scale)
        }
        ContentBlock::ImageGallery { images, columns } => {
            render_gallery(images, *columns, theme, scale)
        }
        ContentBlock::Table { headers, rows } => render_table(headers, rows, theme, scale),
        ContentBlock::Checklist { items } => render_checklist(items, theme, scale),
        ContentBlock::Info {
            variant,
            title,
            text,
        } => render_info(*variant, title.as_deref(), text, theme, scale),
    }
}

/// Render the map region: snapshot image plus description and route points,
/// or the map placeholder when no image exists.
pub fn render_map(map: &MapContent, theme: &PdfTheme, scale: f32) -> PageRegion {
    let Some(url) = map.image_url.as_deref().filter(|url| !url.is_empty()) else {
        return placeholder_region(placeholders::MAP_EMPTY, theme, scale);
    };

    let t = &theme.typography;
    let mut markup = String::new();
    let mut height = 0.0;

    markup.push_str(&format!(
        "<img src=\"{}\" alt=\"\" style=\"width: 100%; border-radius: {}px; display: block;\">\n",
        escape_html(url),
        theme.blocks.border_radius * scale,
    ));
    height += CONTENT_WIDTH * 0.6 * scale;

    if let Some(description) = map.description.as_deref().filter(|d| !d.is_empty()) {
        let region = render_paragraph(description, theme, scale);
        markup.push_str(&region.markup);
        height += region.estimated_height;
    }

    if !map.route_points.is_empty() {
        markup.push_str(&format!(
            "<p style=\"margin: {}px 0 {}px 0; font-family: {}; font-size: {}px; font-weight: bold; color: {};\">{}</p>\n",
            theme.spacing.block_gap * scale,
            theme.spacing.item_gap * scale,
            t.heading_font_family,
            t.body_size * scale,
            theme.colors.accent,
            placeholders::ROUTE_POINTS,
        ));
        let region = render_list(&map.route_points, true, theme, scale);
        markup.push_str(&region.markup);
        height += line_height(theme, scale) + region.estimated_height;
    }

    PageRegion {
        markup,
        estimated_height: height + theme.spacing.block_gap * scale,
    }
}

fn render_paragraph(text: &str, theme: &PdfTheme, scale: f32) -> PageRegion {
    let t = &theme.typography;
    let markup = format!(
        "<p style=\"margin: 0 0 {}px 0; font-family: {}; font-size: {}px; line-height: {}; color: {};\">{}</p>\n",
        theme.spacing.block_gap * scale,
        t.font_family,
        t.body_size * scale,
        t.line_height,
        theme.colors.text,
        escape_html(text),
    );
    PageRegion {
        markup,
        estimated_height: text_height(text, t.body_size, theme, scale)
            + theme.spacing.block_gap * scale,
    }
}

fn render_heading(level: HeadingLevel, text: &str, theme: &PdfTheme, scale: f32) -> PageRegion {
    let t = &theme.typography;
    let (tag, size) = match level {
        HeadingLevel::H2 => ("h2", t.h2_size),
        HeadingLevel::H3 => ("h3", t.h3_size),
    };
    let markup = format!(
        "<{tag} style=\"margin: {}px 0 {}px 0; font-family: {}; font-size: {}px; color: {};\">{}</{tag}>\n",
        theme.spacing.block_gap * scale,
        theme.spacing.item_gap * scale,
        t.heading_font_family,
        size * scale,
        theme.colors.accent,
        escape_html(text),
    );
    PageRegion {
        markup,
        estimated_height: (size * t.line_height + theme.spacing.block_gap + theme.spacing.item_gap)
            * scale,
    }
}

fn render_list(items: &[String], ordered: bool, theme: &PdfTheme, scale: f32) -> PageRegion {
    let t = &theme.typography;
    let tag = if ordered { "ol" } else { "ul" };
    let mut markup = format!(
        "<{tag} style=\"margin: 0 0 {}px 0; padding-left: {}px; font-family: {}; font-size: {}px; line-height: {}; color: {};\">\n",
        theme.spacing.block_gap * scale,
        24.0 * scale,
        t.font_family,
        t.body_size * scale,
        t.line_height,
        theme.colors.text,
    );
    for item in items {
        markup.push_str(&format!(
            "  <li style=\"margin-bottom: {}px;\">{}</li>\n",
            theme.spacing.item_gap * 0.5 * scale,
            escape_html(item),
        ));
    }
    markup.push_str(&format!("</{tag}>\n"));

    let items_height: f32 = items
        .iter()
        .map(|item| text_height(item, t.body_size, theme, scale) + theme.spacing.item_gap * 0.5 * scale)
        .sum();
    PageRegion {
        markup,
        estimated_height: items_height + theme.spacing.block_gap * scale,
    }
}

fn render_quote(text: &str, author: Option<&str>, theme: &PdfTheme, scale: f32) -> PageRegion {
    let t = &theme.typography;
    let mut markup = format!(
        "<blockquote style=\"margin: 0 0 {}px 0; padding: {}px {}px; border-left: {}px solid {}; font-family: {}; font-size: {}px; line-height: {}; font-style: italic; color: {};\">{}",
        theme.spacing.block_gap * scale,
        theme.spacing.item_gap * scale,
        theme.spacing.item_gap * 2.0 * scale,
        3.0 * scale,
        theme.colors.accent,
        t.font_family,
        t.body_size * scale,
        t.line_height,
        theme.colors.text,
        escape_html(text),
    );
    if let Some(author) = author {
        markup.push_str(&format!(
            "<br><cite style=\"font-size: {}px; color: {};\">— {}</cite>",
            t.caption_size * scale,
            theme.colors.muted,
            escape_html(author),
        ));
    }
    markup.push_str("</blockquote>\n");

    let author_height = if author.is_some() {
        t.caption_size * t.line_height * scale
    } else {
        0.0
    };
    PageRegion {
        markup,
        estimated_height: text_height(text, t.body_size, theme, scale)
            + author_height
            + (theme.spacing.item_gap * 2.0 + theme.spacing.block_gap) * scale,
    }
}

fn render_image(
    src: &str,
    alt: Option<&str>,
    caption: Option<&str>,
    theme: &PdfTheme,
    scale: f32,
) -> PageRegion {
    let t = &theme.typography;
    let mut markup = format!(
        "<figure style=\"margin: 0 0 {}px 0;\">\n  <img src=\"{}\" alt=\"{}\" style=\"width: 100%; border-radius: {}px; box-shadow: {}; display: block;\">\n",
        theme.spacing.block_gap * scale,
        escape_html(src),
        escape_html(alt.unwrap_or("")),
        theme.blocks.border_radius * scale,
        theme.blocks.shadow,
    );
    let mut height = IMAGE_BASE_HEIGHT * scale;
    if let Some(caption) = caption {
        markup.push_str(&format!(
            "  <figcaption style=\"margin-top: {}px; font-family: {}; font-size: {}px; color: {}; text-align: center;\">{}</figcaption>\n",
            theme.spacing.item_gap * 0.5 * scale,
            t.font_family,
            t.caption_size * scale,
            theme.colors.muted,
            escape_html(caption),
        ));
        height += t.caption_size * t.line_height * scale;
    }
    markup.push_str("</figure>\n");
    PageRegion {
        markup,
        estimated_height: height + theme.spacing.block_gap * scale,
    }
}

fn render_gallery(
    images: &[GalleryImage],
    columns: usize,
    theme: &PdfTheme,
    scale: f32,
) -> PageRegion {
    if images.is_empty() {
        return placeholder_region(placeholders::GALLERY_EMPTY, theme, scale);
    }

    let t = &theme.typography;
    let columns = columns.max(1);
    let mut markup = format!(
        "<div style=\"display: grid; grid-template-columns: repeat({}, 1fr); gap: {}px; margin: 0 0 {}px 0;\">\n",
        columns,
        theme.spacing.item_gap * scale,
        theme.spacing.block_gap * scale,
    );
    for image in images {
        markup.push_str("  <div>\n");
        markup.push_str(&format!(
            "    <img src=\"{}\" alt=\"{}\" style=\"width: 100%; border-radius: {}px; display: block;\">\n",
            escape_html(&image.src),
            escape_html(image.alt.as_deref().unwrap_or("")),
            theme.blocks.border_radius * scale,
        ));
        if let Some(caption) = image.caption.as_deref() {
            markup.push_str(&format!(
                "    <div style=\"margin-top: {}px; font-family: {}; font-size: {}px; color: {}; text-align: center;\">{}</div>\n",
                theme.spacing.item_gap * 0.25 * scale,
                t.font_family,
                t.caption_size * scale,
                theme.colors.muted,
                escape_html(caption),
            ));
        }
        markup.push_str("  </div>\n");
    }
    markup.push_str("</div>\n");

    let grid_rows = images.len().div_ceil(columns);
    let cell_width = CONTENT_WIDTH / columns as f32;
    let has_captions = images.iter().any(|image| image.caption.is_some());
    let caption_height = if has_captions {
        t.caption_size * t.line_height
    } else {
        0.0
    };
    PageRegion {
        markup,
        estimated_height: (grid_rows as f32 * (cell_width * 0.75 + caption_height)
            + theme.spacing.block_gap)
            * scale,
    }
}

fn render_table(
    headers: &[String],
    rows: &[Vec<String>],
    theme: &PdfTheme,
    scale: f32,
) -> PageRegion {
    if rows.is_empty() {
        return placeholder_region(placeholders::TABLE_EMPTY, theme, scale);
    }

    let t = &theme.typography;
    let border = format!(
        "{}px solid {}",
        theme.blocks.border_width * scale,
        theme.colors.border
    );
    let cell_padding = theme.spacing.item_gap * 0.75 * scale;
    let mut markup = format!(
        "<table style=\"width: 100%; border-collapse: collapse; margin: 0 0 {}px 0; font-family: {}; font-size: {}px; color: {};\">\n",
        theme.spacing.block_gap * scale,
        t.font_family,
        t.body_size * scale,
        theme.colors.text,
    );

    if !headers.is_empty() {
        markup.push_str("  <tr>\n");
        for header in headers {
            markup.push_str(&format!(
                "    <th style=\"border: {}; padding: {}px; text-align: left; font-family: {}; color: {};\">{}</th>\n",
                border,
                cell_padding,
                t.heading_font_family,
                theme.colors.accent,
                escape_html(header),
            ));
        }
        markup.push_str("  </tr>\n");
    }

    for row in rows {
        markup.push_str("  <tr>\n");
        for cell in row {
            markup.push_str(&format!(
                "    <td style=\"border: {}; padding: {}px;\">{}</td>\n",
                border,
                cell_padding,
                escape_html(cell),
            ));
        }
        markup.push_str("  </tr>\n");
    }
    markup.push_str("</table>\n");

    let row_height = t.body_size * t.line_height * scale + cell_padding * 2.0;
    let header_rows = if headers.is_empty() { 0 } else { 1 };
    PageRegion {
        markup,
        estimated_height: (rows.len() + header_rows) as f32 * row_height
            + theme.spacing.block_gap * scale,
    }
}

fn render_checklist(items: &[ChecklistItem], theme: &PdfTheme, scale: f32) -> PageRegion {
    if items.is_empty() {
        return placeholder_region(placeholders::CHECKLIST_EMPTY, theme, scale);
    }

    let t = &theme.typography;
    let mut markup = format!(
        "<div style=\"margin: 0 0 {}px 0; font-family: {}; font-size: {}px; line-height: {}; color: {};\">\n",
        theme.spacing.block_gap * scale,
        t.font_family,
        t.body_size * scale,
        t.line_height,
        theme.colors.text,
    );
    for item in items {
        let mark = if item.checked { "☑" } else { "☐" };
        markup.push_str(&format!(
            "  <div style=\"margin-bottom: {}px;\"><span style=\"color: {};\">{}</span> {}</div>\n",
            theme.spacing.item_gap * 0.5 * scale,
            theme.colors.accent,
            mark,
            escape_html(&item.text),
        ));
    }
    markup.push_str("</div>\n");

    let items_height: f32 = items
        .iter()
        .map(|item| {
            text_height(&item.text, t.body_size, theme, scale)
                + theme.spacing.item_gap * 0.5 * scale
        })
        .sum();
    PageRegion {
        markup,
        estimated_height: items_height + theme.spacing.block_gap * scale,
    }
}

fn render_info(
    variant: InfoVariant,
    title: Option<&str>,
    text: &str,
    theme: &PdfTheme,
    scale: f32,
) -> PageRegion {
    let t = &theme.typography;
    let palette = theme.palette(variant);
    let padding = theme.spacing.item_gap * 1.5 * scale;
    let mut markup = format!(
        "<div style=\"margin: 0 0 {}px 0; padding: {}px; background: {}; border: {}px solid {}; border-radius: {}px; font-family: {}; font-size: {}px; line-height: {}; color: {};\">\n",
        theme.spacing.block_gap * scale,
        padding,
        palette.background,
        theme.blocks.border_width * scale,
        palette.border,
        theme.blocks.border_radius * scale,
        t.font_family,
        t.body_size * scale,
        t.line_height,
        palette.text,
    );
    let mut height = padding * 2.0;
    if let Some(title) = title.filter(|title| !title.is_empty()) {
        markup.push_str(&format!(
            "  <div style=\"font-family: {}; font-weight: bold; margin-bottom: {}px;\">{}</div>\n",
            t.heading_font_family,
            theme.spacing.item_gap * 0.5 * scale,
            escape_html(title),
        ));
        height += line_height(theme, scale);
    }
    markup.push_str(&format!("  <div>{}</div>\n", escape_html(text)));
    markup.push_str("</div>\n");
    height += text_height(text, t.body_size, theme, scale).max(line_height(theme, scale));

    PageRegion {
        markup,
        estimated_height: height + theme.spacing.block_gap * scale,
    }
}

/// A muted dashed box standing in for an empty collection.
fn placeholder_region(copy: &str, theme: &PdfTheme, scale: f32) -> PageRegion {
    let t = &theme.typography;
    let padding = theme.spacing.block_gap * scale;
    let markup = format!(
        "<div style=\"margin: 0 0 {}px 0; padding: {}px; border: {}px dashed {}; border-radius: {}px; font-family: {}; font-size: {}px; color: {}; text-align: center;\">{}</div>\n",
        theme.spacing.block_gap * scale,
        padding,
        theme.blocks.border_width * scale,
        theme.colors.border,
        theme.blocks.border_radius * scale,
        t.font_family,
        t.caption_size * scale,
        theme.colors.muted,
        escape_html(copy),
    );
    PageRegion {
        markup,
        estimated_height: padding * 2.0
            + t.caption_size * t.line_height * scale
            + theme.spacing.block_gap * scale,
    }
}

/// Nominal image height used for page-filling estimates before the bitmap
/// is available.
const IMAGE_BASE_HEIGHT: f32 = 320.0;

fn line_height(theme: &PdfTheme, scale: f32) -> f32 {
    theme.typography.body_size * theme.typography.line_height * scale
}

/// Estimate wrapped text height from an average glyph width. Precision is
/// not required; the composer only needs a stable fill heuristic.
fn text_height(text: &str, font_size: f32, theme: &PdfTheme, scale: f32) -> f32 {
    let glyph_width = font_size * scale * 0.55;
    let per_line = (CONTENT_WIDTH * scale / glyph_width).max(1.0) as usize;
    let lines = text.chars().count().div_ceil(per_line).max(1);
    lines as f32 * font_size * theme.typography.line_height * scale
}
