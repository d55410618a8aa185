//! Decoding utilities for wire body data.
//!
//! The API ships body and attachment data as URL-safe base64, sometimes
//! with padding and sometimes without.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};

/// Decodes URL-safe base64 body data, tolerating missing padding.
///
/// # Errors
///
/// Returns an error if the input is not valid base64 under either padding
/// convention.
pub fn decode_body_data(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE
        .decode(data)
        .or_else(|_| URL_SAFE_NO_PAD.decode(data))
}

/// Decodes body data into text, substituting a placeholder when the payload
/// is unreadable.
///
/// Body extraction must never fail a whole message over one bad part, so
/// this is lossy on purpose.
#[must_use]
pub fn decode_body_text(data: &str) -> String {
    decode_body_data(data).map_or_else(
        |_| "(unreadable body)".to_string(),
        |bytes| String::from_utf8_lossy(&bytes).into_owned(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_padded_and_unpadded() {
        // "hello" => aGVsbG8= padded, aGVsbG8 unpadded
        assert_eq!(decode_body_data("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_body_data("aGVsbG8").unwrap(), b"hello");
    }

    #[test]
    fn decodes_url_safe_alphabet() {
        // 0xfb 0xef => "++8=" in standard base64, "--8=" url-safe
        assert_eq!(decode_body_data("--8=").unwrap(), vec![0xfb, 0xef]);
    }

    #[test]
    fn bad_data_yields_placeholder_text() {
        assert_eq!(decode_body_text("!!not base64!!"), "(unreadable body)");
        assert_eq!(decode_body_text("aGVsbG8"), "hello");
    }
}
