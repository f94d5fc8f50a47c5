//! RFC 2397 `data:` URLs for inline file contents.
//!
//! Contents are always written percent-encoded with an empty media type, so
//! the same bytes always produce the same URL.

use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

const PREFIX: &str = "data:,";

/// Bytes escaped in a payload; everything but unreserved URL characters.
const PAYLOAD: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b':')
    .remove(b'=');

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL")]
    MissingScheme,

    #[error("data URL has no `,` separator")]
    MissingSeparator,

    #[error("base64 data URLs are not supported")]
    Base64,
}

/// Encode bytes as a data URL.
pub fn encode(data: &[u8]) -> String {
    format!("{}{}", PREFIX, percent_encode(data, PAYLOAD))
}

/// Decode a data URL produced by [`encode`] (or any non-base64 data URL).
///
/// Malformed escapes are kept as literal text.
pub fn decode(url: &str) -> Result<Vec<u8>, DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::MissingScheme)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingSeparator)?;
    if header.ends_with(";base64") {
        return Err(DataUrlError::Base64);
    }
    Ok(percent_decode_str(payload).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(b"a b\n"), "data:,a%20b%0A");
        assert_eq!(encode(b""), "data:,");
    }

    #[test]
    fn test_decode_encoded() {
        let data = b"-----BEGIN CERTIFICATE-----\nMIIB+w==\n\xff";
        assert_eq!(decode(&encode(data)).unwrap(), data);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode("http://x"), Err(DataUrlError::MissingScheme));
        assert_eq!(decode("data:text/plain"), Err(DataUrlError::MissingSeparator));
        assert_eq!(decode("data:;base64,AAAA"), Err(DataUrlError::Base64));
    }

    #[test]
    fn test_decode_keeps_malformed_escapes() {
        assert_eq!(decode("data:,%G1").unwrap(), b"%G1");
        assert_eq!(decode("data:,abc%2").unwrap(), b"abc%2");
        assert_eq!(decode("data:text/plain,a%2Fb").unwrap(), b"a/b");
    }
}
