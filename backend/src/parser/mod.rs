//! Line-oriented CSV reading with encoding and delimiter auto-detection.
//!
//! This is not a general CSV reader: input is split into lines
//! first and each line is tokenized on its own, so quoted newlines are not
//! supported. Higher layers reject rows whose column count is off.

pub mod header;

pub use header::{
    find_header_row, normalize_header, HeaderIndex, HeaderRow, LogicalField, RawRecord,
    HEADER_SCAN_LINES,
};

/// Byte-order mark as it appears after UTF-8 decoding.
pub const BOM: char = '\u{feff}';

/// Decoded input text with the encoding it was read as.
#[derive(Debug, Clone)]
pub struct DecodedInput {
    pub text: String,
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Labels unknown to encoding_rs fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    }
}

/// Decode raw upload bytes, auto-detecting the encoding.
///
/// Valid UTF-8 always wins over chardet's guess.
pub fn decode_bytes_auto(bytes: &[u8]) -> DecodedInput {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedInput {
            text: text.to_string(),
            encoding: "utf-8".to_string(),
        };
    }

    let encoding = detect_encoding(bytes);
    let text = decode_content(bytes, &encoding);
    DecodedInput { text, encoding }
}

/// Pick `;` or `,` for a sample line.
///
/// Semicolon only wins when it strictly outnumbers commas; a tie, or a line
/// with neither, means comma.
pub fn detect_delimiter(line: &str) -> char {
    let commas = line.matches(',').count();
    let semicolons = line.matches(';').count();

    if semicolons > commas {
        ';'
    } else {
        ','
    }
}

/// Split one line into trimmed fields.
///
/// A `"` toggles quoting; inside quotes a doubled `""` yields one literal
/// quote. The delimiter only splits outside quotes. An unterminated quote
/// runs to the end of the line.
pub fn tokenize_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Remove a leading byte-order mark.
pub fn strip_bom(value: &str) -> &str {
    value.strip_prefix(BOM).unwrap_or(value)
}

/// True when a tokenized row carries no data at all.
pub fn is_empty_row(fields: &[String]) -> bool {
    fields.iter().all(|f| f.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(tokenize_line("a,b,c", ','), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tokenize_semicolon() {
        assert_eq!(tokenize_line("a;b,c;d", ';'), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_tokenize_quoted_delimiter() {
        assert_eq!(tokenize_line("\"a,b\",c", ','), vec!["a,b", "c"]);
    }

    #[test]
    fn test_tokenize_escaped_quotes() {
        let fields = tokenize_line("\"he said \"\"hi\"\"\",x", ',');
        assert_eq!(fields, vec!["he said \"hi\"", "x"]);
    }

    #[test]
    fn test_tokenize_trims_fields() {
        assert_eq!(tokenize_line("  a  ,  b  ", ','), vec!["a", "b"]);
    }

    #[test]
    fn test_tokenize_trailing_delimiter_yields_empty_field() {
        assert_eq!(tokenize_line("a,b,", ','), vec!["a", "b", ""]);
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        // Everything after the open quote stays in one field.
        assert_eq!(tokenize_line("a,\"b,c", ','), vec!["a", "b,c"]);
    }

    #[test]
    fn test_tokenize_empty_line() {
        assert_eq!(tokenize_line("", ','), vec![""]);
    }

    #[test]
    fn test_detect_delimiter_semicolon_majority() {
        assert_eq!(detect_delimiter("a;b;c;d,e"), ';');
    }

    #[test]
    fn test_detect_delimiter_tie_is_comma() {
        assert_eq!(detect_delimiter("a;b,c"), ',');
    }

    #[test]
    fn test_detect_delimiter_none_is_comma() {
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom("\u{feff}email"), "email");
        assert_eq!(strip_bom("email"), "email");
    }

    #[test]
    fn test_is_empty_row() {
        assert!(is_empty_row(&tokenize_line(" , ,", ',')));
        assert!(!is_empty_row(&tokenize_line(",x,", ',')));
    }

    #[test]
    fn test_decode_utf8_passthrough() {
        let decoded = decode_bytes_auto("sku,name\nA,Café".as_bytes());
        assert_eq!(decoded.encoding, "utf-8");
        assert!(decoded.text.contains("Café"));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_decode_invalid_utf8_falls_back() {
        let bytes: &[u8] = &[b'n', b'a', b'm', b'e', b'\n', 0x43, 0x61, 0x66, 0xE9];
        let decoded = decode_bytes_auto(bytes);
        assert!(decoded.text.starts_with("name\nCaf"));
    }
}
