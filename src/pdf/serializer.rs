//! PDF object serialization.
//!
//! Writes objects in ISO 32000-1 §7.3 syntax: literal strings for printable
//! content, hex strings for binary, `#xx`-escaped names, and streams framed
//! with an up-to-date `/Length`. Dictionary entries come out in key order
//! (the dictionaries are `BTreeMap`s), so a given object always serializes
//! to the same bytes.

use super::object::{Dict, Object};

/// Serializes PDF objects to their byte representation.
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Serialize one object.
    pub fn serialize(object: &Object) -> Vec<u8> {
        let mut out = Vec::new();
        write_object(&mut out, object);
        out
    }

    /// Serialize an indirect object definition:
    /// `{id} 0 obj\n{object}\nendobj\n`.
    pub fn serialize_indirect(id: u32, object: &Object) -> Vec<u8> {
        let mut out = format!("{} 0 obj\n", id).into_bytes();
        write_object(&mut out, object);
        out.extend_from_slice(b"\nendobj\n");
        out
    }
}

fn write_object(out: &mut Vec<u8>, object: &Object) {
    match object {
        Object::Null => out.extend_from_slice(b"null"),
        Object::Boolean(true) => out.extend_from_slice(b"true"),
        Object::Boolean(false) => out.extend_from_slice(b"false"),
        Object::Integer(value) => out.extend_from_slice(value.to_string().as_bytes()),
        Object::Real(value) => out.extend_from_slice(format_real(*value).as_bytes()),
        Object::String(bytes) => write_string(out, bytes),
        Object::Name(name) => write_name(out, name),
        Object::Array(items) => {
            out.push(b'[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(b' ');
                }
                write_object(out, item);
            }
            out.push(b']');
        }
        Object::Dictionary(dict) => write_dict(out, dict),
        Object::Stream { dict, data } => write_stream(out, dict, data),
        Object::Reference(reference) => {
            out.extend_from_slice(reference.to_string().as_bytes())
        }
    }
}

/// Reals carry at most five decimals; a zero fraction is written as an
/// integer.
fn format_real(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }
    let mut text = format!("{:.5}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

/// Strings of printable ASCII use literal `(...)` syntax with the three
/// delimiter escapes; anything else is written as a hex string.
fn write_string(out: &mut Vec<u8>, bytes: &[u8]) {
    let printable = bytes
        .iter()
        .all(|&b| matches!(b, 0x20..=0x7E | b'\n' | b'\r' | b'\t'));

    if printable {
        out.push(b'(');
        for &byte in bytes {
            match byte {
                b'(' | b')' | b'\\' => {
                    out.push(b'\\');
                    out.push(byte);
                }
                b'\n' => out.extend_from_slice(b"\\n"),
                b'\r' => out.extend_from_slice(b"\\r"),
                b'\t' => out.extend_from_slice(b"\\t"),
                _ => out.push(byte),
            }
        }
        out.push(b')');
    } else {
        out.push(b'<');
        for byte in bytes {
            out.extend_from_slice(format!("{:02X}", byte).as_bytes());
        }
        out.push(b'>');
    }
}

/// Name characters that need no `#xx` escape: graphic ASCII minus the
/// delimiters of §7.3.5 and `#` itself.
fn is_regular_name_char(byte: u8) -> bool {
    byte.is_ascii_graphic()
        && !matches!(
            byte,
            b'#' | b'/' | b'%' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}'
        )
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    out.push(b'/');
    for byte in name.bytes() {
        if is_regular_name_char(byte) {
            out.push(byte);
        } else {
            out.extend_from_slice(format!("#{:02X}", byte).as_bytes());
        }
    }
}

fn write_dict(out: &mut Vec<u8>, dict: &Dict) {
    out.extend_from_slice(b"<<");
    for (index, (key, value)) in dict.iter().enumerate() {
        if index > 0 {
            out.push(b' ');
        }
        write_name(out, key);
        out.push(b' ');
        write_object(out, value);
    }
    out.extend_from_slice(b">>");
}

fn write_stream(out: &mut Vec<u8>, dict: &Dict, data: &[u8]) {
    if dict.contains_key("Length") {
        write_dict(out, dict);
    } else {
        let mut framed = dict.clone();
        framed.insert("Length".to_string(), Object::Integer(data.len() as i64));
        write_dict(out, &framed);
    }
    out.extend_from_slice(b"\nstream\n");
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::object::dict;

    fn text(object: &Object) -> String {
        String::from_utf8_lossy(&ObjectSerializer::serialize(object)).into_owned()
    }

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(text(&Object::Null), "null");
        assert_eq!(text(&Object::Boolean(true)), "true");
        assert_eq!(text(&Object::Integer(-42)), "-42");
        assert_eq!(text(&Object::Real(1.0)), "1");
        assert_eq!(text(&Object::Real(0.5)), "0.5");
        assert_eq!(text(&Object::Real(0.123456)), "0.12346");
    }

    #[test]
    fn test_serialize_string_escaping() {
        assert_eq!(text(&Object::text("Hello")), "(Hello)");
        assert_eq!(text(&Object::text("a (b)")), "(a \\(b\\))");
        assert_eq!(text(&Object::text("back\\slash")), "(back\\\\slash)");
    }

    #[test]
    fn test_serialize_binary_string_as_hex() {
        assert_eq!(text(&Object::String(vec![0x00, 0xFF, 0x80])), "<00FF80>");
    }

    #[test]
    fn test_serialize_name_escapes_irregular_chars() {
        assert_eq!(
            text(&Object::name("Name With Space")),
            "/Name#20With#20Space"
        );
        assert_eq!(text(&Object::name("A#B")), "/A#23B");
    }

    #[test]
    fn test_serialize_array_and_reference() {
        let arr = Object::Array(vec![Object::Integer(1), Object::reference(3)]);
        assert_eq!(text(&arr), "[1 3 0 R]");
    }

    #[test]
    fn test_dictionary_entries_in_key_order() {
        let d = Object::Dictionary(dict([
            ("Zeta", Object::Integer(1)),
            ("Alpha", Object::Integer(2)),
            ("Type", Object::name("Page")),
        ]));
        assert_eq!(text(&d), "<</Alpha 2 /Type /Page /Zeta 1>>");
    }

    #[test]
    fn test_serialize_indirect_framing() {
        let bytes = ObjectSerializer::serialize_indirect(1, &Object::Integer(42));
        assert_eq!(String::from_utf8_lossy(&bytes), "1 0 obj\n42\nendobj\n");
    }

    #[test]
    fn test_stream_gains_length_entry() {
        let stream = Object::Stream {
            dict: Dict::new(),
            data: bytes::Bytes::from_static(b"stream data"),
        };
        let result = text(&stream);
        assert!(result.starts_with("<</Length 11>>"));
        assert!(result.contains("stream\nstream data\nendstream"));
    }

    #[test]
    fn test_stream_keeps_existing_length() {
        let stream = Object::Stream {
            dict: dict([("Length", Object::Integer(99))]),
            data: bytes::Bytes::from_static(b"xy"),
        };
        assert!(text(&stream).starts_with("<</Length 99>>"));
    }

    #[test]
    fn test_rect_serialization() {
        assert_eq!(
            text(&Object::rect(0.0, 0.0, 794.0, 1123.0)),
            "[0 0 794 1123]"
        );
    }
}
