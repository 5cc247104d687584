//! JSON decoding that keeps large numeric identifiers intact.
//!
//! Media and playlist ids issued by the service routinely exceed 2^53, so a
//! consumer that parses them as binary floating point silently corrupts them.
//! Before parsing, every bare integer literal of [`MIN_PROTECTED_DIGITS`] or
//! more digits outside a string literal (an object value or an array element)
//! is wrapped in quotes. Ids therefore always reach callers
//! as opaque strings and are sent back the same way.

use serde::Serialize;
use serde_json::Value;

/// Integers with at least this many digits are turned into strings.
pub const MIN_PROTECTED_DIGITS: usize = 10;

/// Quote every bare integer literal long enough to lose precision.
///
/// String literals are skipped, so digits inside `"..."` are never touched.
/// Numbers with a fraction or exponent are left alone.
pub fn protect_large_integers(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if b == b'"' {
            in_string = true;
            i += 1;
            continue;
        }

        if b == b'-' || b.is_ascii_digit() {
            let start = i;
            let digits_start = if b == b'-' { i + 1 } else { i };
            let mut end = digits_start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }

            let is_integer = !matches!(bytes.get(end), Some(b'.' | b'e' | b'E'));
            if is_integer && end - digits_start >= MIN_PROTECTED_DIGITS {
                out.push_str(&raw[last..start]);
                out.push('"');
                out.push_str(&raw[start..end]);
                out.push('"');
                last = end;
            }

            // Skip the rest of a float so its exponent digits are not re-scanned.
            i = end.max(i + 1);
            while i < bytes.len() && matches!(bytes[i], b'.' | b'e' | b'E' | b'+' | b'-' | b'0'..=b'9') {
                i += 1;
            }
            continue;
        }

        i += 1;
    }

    out.push_str(&raw[last..]);
    out
}

/// Parse a response body after protecting large integers.
pub fn decode(raw: &str) -> serde_json::Result<Value> {
    serde_json::from_str(&protect_large_integers(raw))
}

/// Serialize a value for the wire.
///
/// Protected identifiers are already strings and go out unchanged.
pub fn encode<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_large_ids_become_strings() {
        let raw = r#"{"id": 123456789012345, "ids": [1234567890123,9876543210987], "n": 42}"#;
        let value = decode(raw).unwrap();
        assert_eq!(value["id"], json!("123456789012345"));
        assert_eq!(value["ids"], json!(["1234567890123", "9876543210987"]));
        assert_eq!(value["n"], json!(42));
    }

    #[test]
    fn test_round_trip_keeps_identifier() {
        let raw = r#"{"items":[{"id":123456789012345}]}"#;
        let value = decode(raw).unwrap();
        let encoded = encode(&value).unwrap();
        let again = decode(&encoded).unwrap();
        assert_eq!(again["items"][0]["id"], json!("123456789012345"));
        assert_eq!(again, value);
    }

    #[test]
    fn test_strings_and_floats_untouched() {
        let raw = r#"{"name":"clip 12345678901","len":1234567890.5,"e":12345678901e2}"#;
        assert_eq!(protect_large_integers(raw), raw);
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let raw = r#"{"s":"a \"12345678901\" b","id":12345678901}"#;
        let value = decode(raw).unwrap();
        assert_eq!(value["s"], json!("a \"12345678901\" b"));
        assert_eq!(value["id"], json!("12345678901"));
    }

    #[test]
    fn test_negative_and_short_numbers() {
        assert_eq!(protect_large_integers("[-12345678901,123]"), r#"["-12345678901",123]"#);
        assert_eq!(protect_large_integers("123456789"), "123456789");
    }
}
