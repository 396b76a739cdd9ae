//! Rich-text content parser.
//!
//! Turns free-form HTML from the travel description editor into the ordered,
//! typed block sequence the renderer consumes. The parser is total: any
//! string, including non-HTML garbage, resolves to a (possibly empty) block
//! list. Malformed structures degrade; they never raise.
//!
//! Normalization happens before structural detection:
//! 1. Non-breaking and zero-width spaces become plain spaces.
//! 2. A `<br>`-separated run inside one paragraph collapses to a single
//!    space-joined string.
//! 3. Adjacent paragraph-like fragments merge into one paragraph block;
//!    merging never crosses a structural tag (heading, list, quote, figure,
//!    table, callout).
//! 4. Non-semantic presentation wrappers left behind by legacy editors are
//!    unwrapped in place without introducing a block boundary.

pub mod dom;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::blocks::{ContentBlock, GalleryImage, HeadingLevel, InfoVariant};
use dom::{Element, Node};

lazy_static! {
    /// Bold lead-in phrases that mark a paragraph as a callout
    static ref RE_LEAD_IN: Regex = Regex::new(
        r"(?i)^(важно|внимание|осторожно|совет|примечание|tip|important|warning|note)\s*[:!]?\s*$"
    )
    .unwrap();
}

/// Legacy editor wrappers that carry no structure of their own. Their
/// children are promoted to the wrapper's position.
fn is_wrapper(tag: &str) -> bool {
    matches!(
        tag,
        "div" | "section" | "article" | "main" | "font" | "center" | "span" | "body" | "html"
    )
}

/// Containers eligible for callout detection.
fn is_callout_container(tag: &str) -> bool {
    matches!(tag, "p" | "div" | "section" | "article" | "aside")
}

/// Parse an HTML fragment into an ordered block sequence.
///
/// Never panics and never errors; fully unusable input yields an empty vec.
pub fn parse(html: &str) -> Vec<ContentBlock> {
    let nodes = dom::parse_fragment(html);
    let mut scanner = Scanner::default();
    scanner.scan(&nodes);
    scanner.finish()
}

#[derive(Default)]
struct Scanner {
    blocks: Vec<ContentBlock>,
    /// Paragraph-like fragments awaiting a merge boundary
    pending: Vec<String>,
}

impl Scanner {
    fn finish(mut self) -> Vec<ContentBlock> {
        self.flush_pending();
        self.blocks
    }

    fn scan(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Text(text) => self.push_fragment(text),
                Node::Element(el) => self.scan_element(el),
            }
        }
    }

    fn scan_element(&mut self, el: &Element) {
        if is_callout_container(&el.tag) {
            if let Some(block) = detect_callout(el) {
                self.push_block(block);
                return;
            }
        }

        if is_wrapper(&el.tag) {
            // Children take the wrapper's position; no block boundary
            self.scan(&el.children);
            return;
        }

        match el.tag.as_str() {
            "h2" | "h3" => {
                let level = if el.tag == "h2" {
                    HeadingLevel::H2
                } else {
                    HeadingLevel::H3
                };
                self.push_block(ContentBlock::Heading {
                    level,
                    text: normalize_ws(&inline_text(el)),
                });
            }
            "ul" | "ol" => {
                self.push_block(ContentBlock::List {
                    items: list_items(el),
                    ordered: el.tag == "ol",
                });
            }
            "blockquote" => {
                let author = el
                    .find_first("cite")
                    .map(|cite| normalize_ws(&inline_text(cite)))
                    .filter(|text| !text.is_empty());
                self.push_block(ContentBlock::Quote {
                    text: normalize_ws(&inline_text_excluding(el, "cite")),
                    author,
                });
            }
            "figure" => self.scan_figure(el),
            "table" => self.push_block(parse_table(el)),
            "img" => {
                if let Some(block) = image_block(el, None) {
                    self.push_block(block);
                }
            }
            "script" | "style" | "head" | "title" | "svg" => {}
            _ => self.scan_paragraphish(el),
        }
    }

    /// A figure with one image is a figure block, with several a gallery.
    /// A figure with no images contributes its text as paragraph content.
    fn scan_figure(&mut self, el: &Element) {
        let imgs = el.find_all("img");
        let caption = el
            .find_first("figcaption")
            .map(|cap| normalize_ws(&inline_text(cap)))
            .filter(|text| !text.is_empty());

        match imgs.len() {
            0 => self.push_fragment(&inline_text(el)),
            1 => {
                if let Some(block) = image_block(imgs[0], caption) {
                    self.push_block(block);
                }
            }
            _ => {
                let images: Vec<GalleryImage> = imgs
                    .iter()
                    .filter_map(|img| gallery_entry(img))
                    .collect();
                let columns = images.len().max(1);
                self.push_block(ContentBlock::ImageGallery { images, columns });
            }
        }
    }

    /// Paragraphs and unrecognized containers: image-only content becomes an
    /// image block, visible text becomes a merge-pending fragment.
    fn scan_paragraphish(&mut self, el: &Element) {
        let text = normalize_ws(&inline_text(el));
        if text.is_empty() {
            let imgs = el.find_all("img");
            match imgs.len() {
                0 => debug!("dropping empty {} element", el.tag),
                1 => {
                    if let Some(block) = image_block(imgs[0], None) {
                        self.push_block(block);
                    }
                }
                _ => {
                    let images: Vec<GalleryImage> =
                        imgs.iter().filter_map(|img| gallery_entry(img)).collect();
                    let columns = images.len().max(1);
                    self.push_block(ContentBlock::ImageGallery { images, columns });
                }
            }
            return;
        }
        self.pending.push(text);
    }

    fn push_fragment(&mut self, text: &str) {
        let text = normalize_ws(text);
        if !text.is_empty() {
            self.pending.push(text);
        }
    }

    /// Emit a structural block, closing any paragraph merge in progress.
    fn push_block(&mut self, block: ContentBlock) {
        self.flush_pending();
        self.blocks.push(block);
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = normalize_ws(&self.pending.join(" "));
        self.pending.clear();
        if !text.is_empty() {
            self.blocks.push(ContentBlock::Paragraph { text });
        }
    }
}

/// Detect a callout container: a recognized class name, or a leading bold
/// lead-in phrase ("Важно:", "Совет:", ...). The lead-in becomes the title
/// and is stripped from the body.
fn detect_callout(el: &Element) -> Option<ContentBlock> {
    let class_variant = el.classes().iter().find_map(|class| variant_for_class(class));

    let lead_in = leading_bold(el).and_then(|bold| {
        let title = normalize_ws(&inline_text(bold));
        RE_LEAD_IN
            .captures(&title)
            .map(|caps| (variant_for_marker(&caps[1]), title.clone()))
    });

    match (class_variant, lead_in) {
        (_, Some((variant, title))) => {
            let body = normalize_ws(&body_without_lead_in(el));
            Some(ContentBlock::Info {
                variant: class_variant.unwrap_or(variant),
                title: Some(title),
                text: body,
            })
        }
        (Some(variant), None) => Some(ContentBlock::Info {
            variant,
            title: None,
            text: normalize_ws(&inline_text(el)),
        }),
        (None, None) => None,
    }
}

fn variant_for_class(class: &str) -> Option<InfoVariant> {
    let class = class.to_ascii_lowercase();
    if class.contains("warning") {
        Some(InfoVariant::Warning)
    } else if class.contains("important") {
        Some(InfoVariant::Important)
    } else if class.contains("tip") || class.contains("note") || class.contains("callout") || class.contains("info") {
        Some(InfoVariant::Tip)
    } else {
        None
    }
}

fn variant_for_marker(marker: &str) -> InfoVariant {
    let marker = marker.to_lowercase();
    match marker.as_str() {
        "важно" | "important" => InfoVariant::Important,
        "внимание" | "осторожно" | "warning" => InfoVariant::Warning,
        _ => InfoVariant::Tip,
    }
}

/// First element child, provided only whitespace precedes it and it is bold.
fn leading_bold(el: &Element) -> Option<&Element> {
    for node in &el.children {
        match node {
            Node::Text(text) if normalize_ws(text).is_empty() => continue,
            Node::Element(child) if child.tag == "b" || child.tag == "strong" => {
                return Some(child)
            }
            _ => return None,
        }
    }
    None
}

/// Element text with the leading bold element dropped and leading
/// punctuation left over from the lead-in trimmed.
fn body_without_lead_in(el: &Element) -> String {
    let mut out = String::new();
    let mut skipped_bold = false;
    for node in &el.children {
        match node {
            Node::Element(child)
                if !skipped_bold && (child.tag == "b" || child.tag == "strong") =>
            {
                skipped_bold = true;
            }
            Node::Element(child) => push_inline(child, &mut out),
            Node::Text(text) => out.push_str(text),
        }
    }
    out.trim_start_matches([':', '!', '-', '—', ' ']).to_string()
}

/// List items in order, empty strings preserved. Direct `li` children are
/// preferred; malformed lists fall back to any descendant `li`.
fn list_items(el: &Element) -> Vec<String> {
    let direct: Vec<&Element> = el.child_elements().filter(|c| c.tag == "li").collect();
    let lis = if direct.is_empty() { el.find_all("li") } else { direct };
    lis.iter()
        .map(|li| normalize_ws(&inline_text(li)))
        .collect()
}

fn image_block(img: &Element, caption: Option<String>) -> Option<ContentBlock> {
    let src = img.attr("src")?.trim().to_string();
    if src.is_empty() {
        return None;
    }
    Some(ContentBlock::Image {
        src,
        alt: img
            .attr("alt")
            .map(normalize_ws)
            .filter(|alt| !alt.is_empty()),
        caption,
    })
}

fn gallery_entry(img: &Element) -> Option<GalleryImage> {
    let src = img.attr("src")?.trim().to_string();
    if src.is_empty() {
        return None;
    }
    Some(GalleryImage {
        src,
        alt: img
            .attr("alt")
            .map(normalize_ws)
            .filter(|alt| !alt.is_empty()),
        caption: None,
    })
}

/// Parse a table element. The first row supplies headers when it carries
/// `th` cells; otherwise every row is data. A table with zero data rows is
/// still a table block.
fn parse_table(el: &Element) -> ContentBlock {
    let trs = el.find_all("tr");
    let mut headers = Vec::new();
    let mut rows = Vec::new();

    for (index, tr) in trs.iter().enumerate() {
        let cells: Vec<&Element> = tr
            .child_elements()
            .filter(|c| c.tag == "td" || c.tag == "th")
            .collect();
        let texts: Vec<String> = cells
            .iter()
            .map(|cell| normalize_ws(&inline_text(cell)))
            .collect();

        if index == 0 && cells.iter().any(|c| c.tag == "th") {
            headers = texts;
        } else {
            rows.push(texts);
        }
    }

    ContentBlock::Table { headers, rows }
}

/// Inline text of an element: text nodes concatenated, `<br>` contributing a
/// space so break-separated runs collapse into one space-joined string.
fn inline_text(el: &Element) -> String {
    let mut out = String::new();
    for node in &el.children {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => push_inline(child, &mut out),
        }
    }
    out
}

fn push_inline(el: &Element, out: &mut String) {
    if el.tag == "br" {
        out.push(' ');
        return;
    }
    if matches!(el.tag.as_str(), "script" | "style" | "head" | "title" | "svg") {
        return;
    }
    for node in &el.children {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => push_inline(child, out),
        }
    }
}

/// Inline text skipping any descendant element with the given tag.
fn inline_text_excluding(el: &Element, excluded: &str) -> String {
    let mut out = String::new();
    for node in &el.children {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) if child.tag == excluded => {}
            Node::Element(child) => {
                if child.tag == "br" {
                    out.push(' ');
                } else {
                    out.push_str(&inline_text_excluding(child, excluded));
                }
            }
        }
    }
    out
}

/// Whitespace normalization: non-breaking and zero-width spaces become plain
/// spaces, runs collapse to one space, ends are trimmed.
fn normalize_ws(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.chars() {
        let ch = match ch {
            '\u{00A0}' | '\u{200B}' => ' ',
            other => other,
        };
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}
