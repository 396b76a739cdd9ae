//! PDF object types.
//!
//! The creation-side subset of the object model: only what the assembler
//! emits. Dictionaries are `BTreeMap`s, so entries serialize in key order
//! and the same document content always produces the same bytes.

use std::collections::BTreeMap;

use bytes::Bytes;

/// Dictionary storage, ordered by key.
pub type Dict = BTreeMap<String, Object>;

/// Build a dictionary from (key, value) pairs.
pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Object)>) -> Dict {
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value))
        .collect()
}

/// A PDF object.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String content, written literal or hex depending on the bytes
    String(Vec<u8>),
    /// Name (written with a leading `/`)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary
    Dictionary(Dict),
    /// Stream: dictionary plus raw data
    Stream {
        /// Stream dictionary
        dict: Dict,
        /// Stream payload
        data: Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

impl Object {
    /// A `/Name` object.
    pub fn name(name: impl Into<String>) -> Object {
        Object::Name(name.into())
    }

    /// A literal string object.
    pub fn text(text: &str) -> Object {
        Object::String(text.as_bytes().to_vec())
    }

    /// A reference to object `id`. The writer allocates fresh object
    /// numbers per document, so the generation is always 0.
    pub fn reference(id: u32) -> Object {
        Object::Reference(ObjectRef::new(id, 0))
    }

    /// A `[llx lly urx ury]` rectangle from origin and extent.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Object {
        Object::Array(vec![
            Object::Real(x),
            Object::Real(y),
            Object::Real(x + width),
            Object::Real(y + height),
        ])
    }
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}
