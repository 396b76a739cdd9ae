//! Typed content blocks.
//!
//! The block model is the unified intermediate representation between the
//! content parser and the page renderer: the parser emits blocks in document
//! order, the renderer maps each variant to a page region. Blocks can also be
//! constructed from the loosely-typed payloads stored on a travel record; all
//! shape checking happens here, once, so renderers receive already-validated
//! data.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    /// Regex for checklist markers in a bare-string payload: `[ ]` / `[x]`
    static ref RE_CHECK_MARKER: Regex = Regex::new(r"^\s*\[( |x|X)\]\s*(.*)$").unwrap();
}

/// Heading depth. The document model only admits second- and third-level
/// headings; the travel title itself is page chrome, not content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    /// Section heading (`h2`)
    H2,
    /// Subsection heading (`h3`)
    H3,
}

impl TryFrom<u8> for HeadingLevel {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            other => Err(format!("unsupported heading level: {}", other)),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> u8 {
        match level {
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

/// Callout flavor, selecting one of the three named theme palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoVariant {
    /// Advisory note
    Tip,
    /// Emphasized note
    Important,
    /// Cautionary note
    Warning,
}

/// One image of a gallery (or a standalone figure).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Image source (URL or data URI)
    pub src: String,
    /// Alternate text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Caption shown under the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// One row of a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Row text
    pub text: String,
    /// Whether the row is ticked
    #[serde(default)]
    pub checked: bool,
}

/// One structural unit of parsed content.
///
/// The order of blocks mirrors source document order and is significant:
/// rendering is sequential and never reorders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    /// Running text
    Paragraph {
        /// Paragraph text, whitespace-normalized
        text: String,
    },
    /// Section or subsection heading
    Heading {
        /// Heading depth (2 or 3)
        level: HeadingLevel,
        /// Heading text
        text: String,
    },
    /// Ordered or unordered list
    List {
        /// Item texts in source order (empty strings preserved)
        items: Vec<String>,
        /// True for `ol`, false for `ul`
        ordered: bool,
    },
    /// Block quote with optional attribution
    Quote {
        /// Quote body, excluding the citation
        text: String,
        /// Attribution, when the source carried a `cite`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
    },
    /// Single figure
    Image {
        /// Image source
        src: String,
        /// Alternate text
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        /// Figure caption
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Multi-image figure rendered as a grid
    ImageGallery {
        /// Gallery entries in document order
        images: Vec<GalleryImage>,
        /// Grid column count
        columns: usize,
    },
    /// Tabular data
    Table {
        /// Header-cell texts from the first row
        headers: Vec<String>,
        /// Data rows (may be empty; the renderer shows a placeholder)
        rows: Vec<Vec<String>>,
    },
    /// Tickable list
    Checklist {
        /// Checklist rows (may be empty; the renderer shows a placeholder)
        items: Vec<ChecklistItem>,
    },
    /// Callout box drawn with one of the named theme palettes
    #[serde(rename = "infoBlock")]
    Info {
        /// Palette selector
        variant: InfoVariant,
        /// Bold lead-in title
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Body text
        text: String,
    },
}

impl ContentBlock {
    /// Wire name of this block's variant (matches the serde tag).
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Paragraph { .. } => "paragraph",
            ContentBlock::Heading { .. } => "heading",
            ContentBlock::List { .. } => "list",
            ContentBlock::Quote { .. } => "quote",
            ContentBlock::Image { .. } => "image",
            ContentBlock::ImageGallery { .. } => "imageGallery",
            ContentBlock::Table { .. } => "table",
            ContentBlock::Checklist { .. } => "checklist",
            ContentBlock::Info { .. } => "infoBlock",
        }
    }

    /// Check if this is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, ContentBlock::Paragraph { .. })
    }

    /// Build a block from a loosely-typed payload.
    ///
    /// The travel record stores block content without schema guarantees: a
    /// checklist may arrive as a bare string, a text field as a number, or
    /// any field as an unrelated object. Normalization happens here so that
    /// a malformed payload degrades to empty content instead of panicking or
    /// rendering a stringified object. Returns `None` for an unknown kind.
    pub fn from_payload(kind: &str, payload: &Value) -> Option<ContentBlock> {
        match kind {
            "paragraph" => Some(ContentBlock::Paragraph {
                text: text_of(payload, "text"),
            }),
            "heading" => {
                let level = payload
                    .get("level")
                    .and_then(Value::as_u64)
                    .and_then(|n| HeadingLevel::try_from(n as u8).ok())
                    .unwrap_or(HeadingLevel::H2);
                Some(ContentBlock::Heading {
                    level,
                    text: text_of(payload, "text"),
                })
            }
            "list" => Some(ContentBlock::List {
                items: string_items(payload.get("items").unwrap_or(&Value::Null)),
                ordered: payload
                    .get("ordered")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            }),
            "quote" => Some(ContentBlock::Quote {
                text: text_of(payload, "text"),
                author: opt_text_of(payload, "author"),
            }),
            "image" => Some(ContentBlock::Image {
                src: text_of(payload, "src"),
                alt: opt_text_of(payload, "alt"),
                caption: opt_text_of(payload, "caption"),
            }),
            "imageGallery" => {
                let images = gallery_items(payload.get("images").unwrap_or(&Value::Null));
                let columns = payload
                    .get("columns")
                    .and_then(Value::as_u64)
                    .map(|n| n as usize)
                    .filter(|&n| n > 0)
                    .unwrap_or_else(|| images.len().max(1));
                Some(ContentBlock::ImageGallery { images, columns })
            }
            "table" => Some(ContentBlock::Table {
                headers: string_items(payload.get("headers").unwrap_or(&Value::Null)),
                rows: row_items(payload.get("rows").unwrap_or(&Value::Null)),
            }),
            "checklist" => Some(ContentBlock::Checklist {
                items: checklist_items(payload),
            }),
            "infoBlock" => {
                let variant = match payload.get("variant").and_then(Value::as_str) {
                    Some("important") => InfoVariant::Important,
                    Some("warning") => InfoVariant::Warning,
                    _ => InfoVariant::Tip,
                };
                Some(ContentBlock::Info {
                    variant,
                    title: opt_text_of(payload, "title"),
                    text: first_text_of(payload, &["text", "content"]),
                })
            }
            // Shorthand kinds used by older records for callouts
            "tip" | "important" | "warning" => {
                let variant = match kind {
                    "important" => InfoVariant::Important,
                    "warning" => InfoVariant::Warning,
                    _ => InfoVariant::Tip,
                };
                Some(ContentBlock::Info {
                    variant,
                    title: opt_text_of(payload, "title"),
                    text: first_text_of(payload, &["text", "content"]),
                })
            }
            _ => None,
        }
    }
}

/// Coerce a JSON value to text. Strings pass through, scalars take their
/// display form, and anything else (object, array, null) becomes empty —
/// never a stringified object.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Read a textual field from an object payload. A payload that is itself a
/// scalar stands in for its own `text` field.
fn text_of(payload: &Value, field: &str) -> String {
    match payload {
        Value::Object(map) => map.get(field).map(coerce_text).unwrap_or_default(),
        other => coerce_text(other),
    }
}

/// Read the first present field of `fields` as text.
fn first_text_of(payload: &Value, fields: &[&str]) -> String {
    if let Value::Object(map) = payload {
        for field in fields {
            if let Some(value) = map.get(*field) {
                return coerce_text(value);
            }
        }
        return String::new();
    }
    coerce_text(payload)
}

/// Read an optional textual field; empty coercions collapse to `None`.
fn opt_text_of(payload: &Value, field: &str) -> Option<String> {
    let text = match payload {
        Value::Object(map) => map.get(field).map(coerce_text)?,
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

/// Coerce an array payload to a list of strings.
fn string_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(coerce_text).collect(),
        _ => Vec::new(),
    }
}

/// Coerce a nested array payload to table rows.
fn row_items(value: &Value) -> Vec<Vec<String>> {
    match value {
        Value::Array(rows) => rows.iter().map(string_items).collect(),
        _ => Vec::new(),
    }
}

/// Coerce a gallery payload to image entries. Entries that are bare strings
/// are treated as sources without alt/caption.
fn gallery_items(value: &Value) -> Vec<GalleryImage> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(src) => Some(GalleryImage {
                src: src.clone(),
                ..Default::default()
            }),
            Value::Object(_) => {
                let src = text_of(item, "src");
                if src.is_empty() {
                    None
                } else {
                    Some(GalleryImage {
                        src,
                        alt: opt_text_of(item, "alt"),
                        caption: opt_text_of(item, "caption"),
                    })
                }
            }
            _ => None,
        })
        .collect()
}

/// Coerce a checklist payload to rows.
///
/// Accepts an `items` array of `{text, checked}` objects (or bare strings),
/// or a bare string scanned line by line for `[ ]`/`[x]` markers. A string
/// with no recognizable markers yields zero items; the renderer substitutes
/// its placeholder.
fn checklist_items(payload: &Value) -> Vec<ChecklistItem> {
    let items_value = match payload {
        Value::Object(map) => map.get("items").cloned().unwrap_or(Value::Null),
        other => other.clone(),
    };

    match items_value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(ChecklistItem {
                    text: text.clone(),
                    checked: false,
                }),
                Value::Object(map) => Some(ChecklistItem {
                    text: map.get("text").map(coerce_text).unwrap_or_default(),
                    checked: map.get("checked").and_then(Value::as_bool).unwrap_or(false),
                }),
                _ => None,
            })
            .collect(),
        Value::String(text) => text
            .lines()
            .filter_map(|line| {
                RE_CHECK_MARKER.captures(line).map(|caps| ChecklistItem {
                    text: caps[2].trim().to_string(),
                    checked: !caps[1].trim().is_empty(),
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}
