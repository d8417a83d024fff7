//! Header block parsing.
//!
//! A frame starts with `name: value` lines terminated by CRLF. A blank line
//! ends the block. Names are matched case-insensitively.

use indexmap::IndexMap;

use super::error::{ProtocolError, ProtocolResult};

pub const CONTENT_LENGTH: &str = "content-length";
pub const CONTENT_TYPE: &str = "content-type";

/// Content type announced on every written frame.
pub const JSONRPC_CONTENT_TYPE: &str = "application/vscode-jsonrpc; charset=utf-8";

/// One parsed header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HeaderLine {
    Field { name: String, value: String },
    /// The blank line closing the header block.
    End,
}

/// Parse a header line with its CRLF already stripped.
pub(crate) fn parse_header_line(line: &str) -> ProtocolResult<HeaderLine> {
    if line.is_empty() {
        return Ok(HeaderLine::End);
    }

    let (name, rest) = line
        .split_once(':')
        .ok_or_else(|| ProtocolError::MalformedHeader {
            line: line.to_string(),
        })?;

    if name.is_empty() {
        return Err(ProtocolError::MalformedHeader {
            line: line.to_string(),
        });
    }

    let value = rest.strip_prefix(' ').unwrap_or(rest);
    Ok(HeaderLine::Field {
        name: name.to_ascii_lowercase(),
        value: value.to_string(),
    })
}

/// Headers of a single frame, keyed by lower-cased name in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameHeaders {
    fields: IndexMap<String, String>,
}

impl FrameHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header. A repeated name keeps the last value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The mandatory payload length in bytes.
    pub fn content_length(&self) -> ProtocolResult<usize> {
        let raw = self
            .get(CONTENT_LENGTH)
            .ok_or(ProtocolError::MissingContentLength)?;
        raw.trim()
            .parse::<usize>()
            .map_err(|_| ProtocolError::InvalidContentLength {
                value: raw.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_lowercases_name() {
        let line = parse_header_line("Content-Length: 42").unwrap();
        assert_eq!(
            line,
            HeaderLine::Field {
                name: "content-length".to_string(),
                value: "42".to_string()
            }
        );
    }

    #[test]
    fn test_parse_strips_single_space_only() {
        let line = parse_header_line("x-note:  padded").unwrap();
        assert_eq!(
            line,
            HeaderLine::Field {
                name: "x-note".to_string(),
                value: " padded".to_string()
            }
        );

        let line = parse_header_line("x-note:tight").unwrap();
        assert_eq!(
            line,
            HeaderLine::Field {
                name: "x-note".to_string(),
                value: "tight".to_string()
            }
        );
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let line = parse_header_line("Content-Type: text/plain; a=b:c").unwrap();
        assert_eq!(
            line,
            HeaderLine::Field {
                name: "content-type".to_string(),
                value: "text/plain; a=b:c".to_string()
            }
        );
    }

    #[test]
    fn test_blank_line_is_end() {
        assert_eq!(parse_header_line("").unwrap(), HeaderLine::End);
    }

    #[test]
    fn test_line_without_colon_is_rejected() {
        let err = parse_header_line("garbage").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedHeader { .. }));
    }

    #[test]
    fn test_content_length_lookup_is_case_insensitive() {
        let mut headers = FrameHeaders::new();
        headers.insert("CONTENT-LENGTH", "17");
        assert_eq!(headers.content_length().unwrap(), 17);
        assert_eq!(headers.get("Content-Length"), Some("17"));
    }

    #[test]
    fn test_missing_and_invalid_content_length() {
        let headers = FrameHeaders::new();
        assert!(matches!(
            headers.content_length(),
            Err(ProtocolError::MissingContentLength)
        ));

        let mut headers = FrameHeaders::new();
        headers.insert(CONTENT_LENGTH, "-3");
        assert!(matches!(
            headers.content_length(),
            Err(ProtocolError::InvalidContentLength { .. })
        ));
    }
}
