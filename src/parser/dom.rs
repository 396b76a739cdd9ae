//! Tolerant HTML fragment DOM.
//!
//! Travel descriptions come from a rich-text editor and arrive as untrusted,
//! frequently malformed HTML. This is a forgiving fragment parser: it never
//! fails, recovers from mismatched and stray tags, and produces a plain tree
//! the block detector walks. It is not a general-purpose HTML5 parser and
//! does not try to be one.

use std::collections::HashMap;

/// A parsed element node.
#[derive(Debug, Clone)]
pub struct Element {
    /// Lowercased tag name
    pub tag: String,
    /// Attributes (names lowercased)
    pub attrs: HashMap<String, String>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

/// A node of the fragment tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// Element with children
    Element(Element),
    /// Text run (entities decoded, whitespace preserved)
    Text(String),
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// Attribute value by (case-insensitive) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Whitespace-separated class list.
    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Concatenated text of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Direct element children, in order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Descendant elements with the given tag, in document order.
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let tag = tag.to_ascii_lowercase();
        let mut found = Vec::new();
        find_by_tag(&self.children, &tag, &mut found);
        found
    }

    /// First descendant element with the given tag.
    pub fn find_first<'a>(&'a self, tag: &str) -> Option<&'a Element> {
        let all = self.find_all(tag);
        all.first().copied()
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

fn find_by_tag<'a>(nodes: &'a [Node], tag: &str, found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.tag == tag {
                found.push(el);
            }
            find_by_tag(&el.children, tag, found);
        }
    }
}

/// Check if a tag is a void element (never has children).
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "br" | "hr" | "img" | "input" | "meta" | "link" | "area" | "base" | "col" | "embed"
            | "source" | "wbr"
    )
}

/// Check if a tag is a block-level element.
pub fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "div"
            | "p"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "table"
            | "thead"
            | "tbody"
            | "tr"
            | "td"
            | "th"
            | "blockquote"
            | "figure"
            | "figcaption"
            | "pre"
            | "hr"
            | "header"
            | "footer"
            | "nav"
            | "main"
            | "section"
            | "article"
            | "aside"
    )
}

/// An open element is implicitly closed by certain start tags, the way
/// browsers close `<p>` when a block element begins. Without this, unclosed
/// editor paragraphs would swallow the rest of the document as children.
fn closes_implicitly(open_tag: &str, next_tag: &str) -> bool {
    match open_tag {
        "p" => is_block_element(next_tag),
        "li" => next_tag == "li",
        "td" | "th" => matches!(next_tag, "td" | "th" | "tr"),
        "tr" => next_tag == "tr",
        _ => false,
    }
}

/// Parse an HTML fragment into a list of top-level nodes. Total: any input
/// produces a (possibly empty) tree.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let mut parser = FragmentParser::new(html);
    parser.parse_nodes(None)
}

struct FragmentParser {
    input: Vec<char>,
    pos: usize,
}

impl FragmentParser {
    fn new(html: &str) -> Self {
        Self {
            input: html.chars().collect(),
            pos: 0,
        }
    }

    /// Parse sibling nodes until end of input or until an end tag / implicit
    /// close belonging to `parent` is seen.
    fn parse_nodes(&mut self, parent: Option<&str>) -> Vec<Node> {
        let mut nodes = Vec::new();

        while !self.eof() {
            if self.starts_with("<!--") {
                self.skip_until_str("-->");
                self.advance_by(3);
                continue;
            }
            if self.starts_with("<!") || self.starts_with("<?") {
                self.skip_until('>');
                self.advance();
                continue;
            }
            if self.starts_with("</") {
                self.advance_by(2);
                let end_tag = self.read_tag_name();
                self.skip_until('>');
                self.advance();
                if parent == Some(end_tag.as_str()) {
                    return nodes;
                }
                // Stray or mismatched end tag: drop it and move on
                continue;
            }
            if self.current() == '<' && self.peek_is_tag_start() {
                // Implicit close: let the parent re-handle this start tag
                if let Some(open) = parent {
                    let next_tag = self.peek_tag_name();
                    if closes_implicitly(open, &next_tag) {
                        return nodes;
                    }
                }
                self.advance();
                if let Some(node) = self.parse_element() {
                    nodes.push(node);
                }
                continue;
            }

            let text = self.read_text();
            if !text.is_empty() {
                nodes.push(Node::Text(decode_entities(&text)));
            }
        }

        nodes
    }

    fn parse_element(&mut self) -> Option<Node> {
        let tag = self.read_tag_name();
        if tag.is_empty() {
            return None;
        }
        let mut element = Element::new(&tag);
        self.read_attributes(&mut element);

        let self_closed = self.starts_with("/>");
        if self_closed {
            self.advance_by(2);
        } else if self.current() == '>' {
            self.advance();
        }

        if self_closed || is_void_element(&element.tag) {
            return Some(Node::Element(element));
        }

        // Script and style bodies are raw text: consume to the close tag
        // without interpreting '<'
        if element.tag == "script" || element.tag == "style" {
            self.skip_raw_until_close(&element.tag);
            return Some(Node::Element(element));
        }

        element.children = self.parse_nodes(Some(&element.tag));
        Some(Node::Element(element))
    }

    fn read_tag_name(&mut self) -> String {
        let mut name = String::new();
        while !self.eof() {
            let c = self.current();
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                name.push(c.to_ascii_lowercase());
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn read_attributes(&mut self, element: &mut Element) {
        loop {
            self.skip_whitespace();
            if self.eof() || self.current() == '>' || self.starts_with("/>") {
                break;
            }

            let name = self.read_attr_name();
            if name.is_empty() {
                // Unparseable junk inside the tag: skip one char and retry
                self.advance();
                continue;
            }

            self.skip_whitespace();
            let value = if self.current() == '=' {
                self.advance();
                self.skip_whitespace();
                self.read_attr_value()
            } else {
                name.clone()
            };

            element
                .attrs
                .insert(name.to_ascii_lowercase(), decode_entities(&value));
        }
    }

    fn read_attr_name(&mut self) -> String {
        let mut name = String::new();
        while !self.eof() {
            let c = self.current();
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn read_attr_value(&mut self) -> String {
        let quote = self.current();
        let mut value = String::new();
        if quote == '"' || quote == '\'' {
            self.advance();
            while !self.eof() && self.current() != quote {
                value.push(self.current());
                self.advance();
            }
            if !self.eof() {
                self.advance();
            }
        } else {
            while !self.eof() {
                let c = self.current();
                if c.is_whitespace() || c == '>' {
                    break;
                }
                value.push(c);
                self.advance();
            }
        }
        value
    }

    fn read_text(&mut self) -> String {
        let mut text = String::new();
        while !self.eof() {
            if self.current() == '<' && (self.peek_is_tag_start() || self.starts_with("</") || self.starts_with("<!")) {
                break;
            }
            text.push(self.current());
            self.advance();
        }
        text
    }

    fn skip_raw_until_close(&mut self, tag: &str) {
        let close = format!("</{}", tag);
        while !self.eof() && !self.starts_with_ignore_case(&close) {
            self.advance();
        }
        if !self.eof() {
            self.skip_until('>');
            self.advance();
        }
    }

    fn peek_is_tag_start(&self) -> bool {
        self.input
            .get(self.pos + 1)
            .is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn peek_tag_name(&self) -> String {
        let mut name = String::new();
        let mut i = self.pos + 1;
        while let Some(&c) = self.input.get(i) {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                name.push(c.to_ascii_lowercase());
                i += 1;
            } else {
                break;
            }
        }
        name
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current(&self) -> char {
        self.input.get(self.pos).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn advance_by(&mut self, n: usize) {
        self.pos += n;
    }

    fn skip_whitespace(&mut self) {
        while !self.eof() && self.current().is_whitespace() {
            self.advance();
        }
    }

    fn skip_until(&mut self, c: char) {
        while !self.eof() && self.current() != c {
            self.advance();
        }
    }

    fn skip_until_str(&mut self, s: &str) {
        while !self.eof() && !self.starts_with(s) {
            self.advance();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.input.get(self.pos + i) == Some(&c))
    }

    fn starts_with_ignore_case(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| {
            self.input
                .get(self.pos + i)
                .is_some_and(|&have| have.eq_ignore_ascii_case(&c))
        })
    }
}

/// Decode the named entities rich-text editors commonly emit, plus numeric
/// character references.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '&' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        // An entity is at most ~10 chars between '&' and ';'
        let end = chars[i + 1..]
            .iter()
            .take(10)
            .position(|&c| c == ';')
            .map(|offset| i + 1 + offset);

        let Some(end) = end else {
            out.push('&');
            i += 1;
            continue;
        };

        let entity: String = chars[i + 1..end].iter().collect();
        match decode_entity(&entity) {
            Some(decoded) => {
                out.push_str(&decoded);
                i = end + 1;
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
    }

    out
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code).map(String::from);
    }

    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "mdash" => "—",
        "ndash" => "–",
        "laquo" => "«",
        "raquo" => "»",
        "hellip" => "…",
        "bull" => "•",
        "copy" => "©",
        _ => return None,
    };
    Some(decoded.to_string())
}
