//! Export theme configuration.
//!
//! A theme is passive data: colors, typography, spacing, and block
//! decoration constants the renderer reads. The settings registry supplies
//! themes as loosely-populated JSON documents; [`PdfTheme::resolve`] merges
//! such a document over the built-in defaults exactly once per export, so
//! renderers never re-check optionality at lookup sites.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blocks::InfoVariant;

/// Colors for one callout flavor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalloutPalette {
    /// Fill color
    pub background: String,
    /// Border color
    pub border: String,
    /// Body text color
    pub text: String,
}

impl Default for CalloutPalette {
    fn default() -> Self {
        Self {
            background: "#E8F5E9".to_string(),
            border: "#A5D6A7".to_string(),
            text: "#1B5E20".to_string(),
        }
    }
}

/// Theme color set, including the three named callout palettes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeColors {
    /// Page background
    pub background: String,
    /// Primary text color
    pub text: String,
    /// Secondary text (captions, placeholders, running header)
    pub muted: String,
    /// Accent color (headings, list markers)
    pub accent: String,
    /// Hairline borders (tables, images)
    pub border: String,
    /// Palette for `tip` callouts
    pub tip_block: CalloutPalette,
    /// Palette for `important` callouts
    pub important_block: CalloutPalette,
    /// Palette for `warning` callouts
    pub warning_block: CalloutPalette,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            text: "#2B2B2B".to_string(),
            muted: "#8A8A8A".to_string(),
            accent: "#1565C0".to_string(),
            border: "#E0E0E0".to_string(),
            tip_block: CalloutPalette::default(),
            important_block: CalloutPalette {
                background: "#FFF8E1".to_string(),
                border: "#FFD54F".to_string(),
                text: "#6D4C00".to_string(),
            },
            warning_block: CalloutPalette {
                background: "#FFEBEE".to_string(),
                border: "#EF9A9A".to_string(),
                text: "#B71C1C".to_string(),
            },
        }
    }
}

/// Typographic scale in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    /// Body font stack
    pub font_family: String,
    /// Heading font stack
    pub heading_font_family: String,
    /// Section heading size
    pub h2_size: f32,
    /// Subsection heading size
    pub h3_size: f32,
    /// Body text size
    pub body_size: f32,
    /// Caption and placeholder size
    pub caption_size: f32,
    /// Unitless line height
    pub line_height: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Georgia, 'Times New Roman', serif".to_string(),
            heading_font_family: "'PT Sans', 'Segoe UI', sans-serif".to_string(),
            h2_size: 24.0,
            h3_size: 19.0,
            body_size: 14.0,
            caption_size: 12.0,
            line_height: 1.5,
        }
    }
}

/// Spacing constants in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Spacing {
    /// Padding between page edge and content
    pub page_padding: f32,
    /// Vertical gap between blocks
    pub block_gap: f32,
    /// Gap between items inside one block (list rows, grid cells)
    pub item_gap: f32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            page_padding: 48.0,
            block_gap: 18.0,
            item_gap: 8.0,
        }
    }
}

/// Block decoration constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockDecor {
    /// Corner radius for callouts and images
    pub border_radius: f32,
    /// Border width for callouts and tables
    pub border_width: f32,
    /// CSS shadow token for figures
    pub shadow: String,
}

impl Default for BlockDecor {
    fn default() -> Self {
        Self {
            border_radius: 8.0,
            border_width: 1.0,
            shadow: "0 1px 3px rgba(0, 0, 0, 0.12)".to_string(),
        }
    }
}

/// A fully resolved export theme. Immutable for the duration of an export
/// run; the renderer never mutates it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfTheme {
    /// Color set
    pub colors: ThemeColors,
    /// Typographic scale
    pub typography: Typography,
    /// Spacing constants
    pub spacing: Spacing,
    /// Block decoration
    pub blocks: BlockDecor,
}

impl PdfTheme {
    /// Resolve a loosely-populated theme document over the built-in
    /// defaults. Absent sections and fields fall back field by field; a
    /// document that does not deserialize at all resolves to the full
    /// default theme.
    pub fn resolve(document: &Value) -> PdfTheme {
        match serde_json::from_value::<PdfTheme>(document.clone()) {
            Ok(theme) => theme,
            Err(err) => {
                debug!("theme document rejected, using defaults: {}", err);
                PdfTheme::default()
            }
        }
    }

    /// The callout palette for a variant.
    pub fn palette(&self, variant: InfoVariant) -> &CalloutPalette {
        match variant {
            InfoVariant::Tip => &self.colors.tip_block,
            InfoVariant::Important => &self.colors.important_block,
            InfoVariant::Warning => &self.colors.warning_block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_theme_has_three_palettes() {
        let theme = PdfTheme::default();
        assert_ne!(
            theme.palette(InfoVariant::Tip).background,
            theme.palette(InfoVariant::Warning).background
        );
        assert_ne!(
            theme.palette(InfoVariant::Important).background,
            theme.palette(InfoVariant::Warning).background
        );
    }

    #[test]
    fn test_resolve_partial_document() {
        let theme = PdfTheme::resolve(&json!({
            "colors": { "accent": "#FF5722" },
            "typography": { "bodySize": 16.0 }
        }));
        assert_eq!(theme.colors.accent, "#FF5722");
        assert_eq!(theme.typography.body_size, 16.0);
        // Untouched sections keep defaults
        assert_eq!(theme.colors.text, PdfTheme::default().colors.text);
        assert_eq!(theme.spacing, Spacing::default());
    }

    #[test]
    fn test_resolve_missing_palette_degrades_to_default() {
        let theme = PdfTheme::resolve(&json!({
            "colors": { "warningBlock": { "background": "#000000" } }
        }));
        assert_eq!(theme.palette(InfoVariant::Warning).background, "#000000");
        // Unspecified palette fields still resolve to usable colors
        assert!(!theme.palette(InfoVariant::Warning).border.is_empty());
        assert_eq!(
            theme.palette(InfoVariant::Tip),
            &PdfTheme::default().colors.tip_block
        );
    }

    #[test]
    fn test_resolve_garbage_document_is_default() {
        assert_eq!(PdfTheme::resolve(&json!("not a theme")), PdfTheme::default());
        assert_eq!(PdfTheme::resolve(&json!(42)), PdfTheme::default());
    }
}
