// Data URLs - `data:<mime>;base64,<payload>` strings used as opaque image references

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Borrowed view of a parsed data URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub mime_type: &'a str,
    pub payload: &'a str,
}

/// Encode raw bytes as a base64 data URL
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Build a data URL from an already base64-encoded payload
pub fn from_base64(mime_type: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, payload)
}

pub fn parse(url: &str) -> Result<DataUrl<'_>, DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::MissingScheme)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;
    let mime_type = header.strip_suffix(";base64").ok_or(DataUrlError::NotBase64)?;

    Ok(DataUrl { mime_type, payload })
}

/// Decode the payload back into bytes
pub fn decode(url: &str) -> Result<Vec<u8>, DataUrlError> {
    let parsed = parse(url)?;
    STANDARD
        .decode(parsed.payload)
        .map_err(|e| DataUrlError::Base64(e.to_string()))
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("Not a data URL")]
    MissingScheme,

    #[error("Data URL has no payload")]
    MissingPayload,

    #[error("Data URL is not base64 encoded")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    Base64(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_and_parse() {
        let url = encode("image/png", b"hello");
        assert_eq!(url, "data:image/png;base64,aGVsbG8=");

        let parsed = parse(&url).unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.payload, "aGVsbG8=");
        assert_eq!(decode(&url).unwrap(), b"hello");
    }

    #[test]
    fn test_rejects_malformed_urls() {
        assert_eq!(parse("https://example.com/a.png"), Err(DataUrlError::MissingScheme));
        assert_eq!(parse("data:image/png;base64"), Err(DataUrlError::MissingPayload));
        assert_eq!(parse("data:text/plain,hello"), Err(DataUrlError::NotBase64));
        assert!(matches!(decode("data:image/png;base64,@@@"), Err(DataUrlError::Base64(_))));
    }
}
