use crate::http::error::RequestError;

/// Decodes a percent-encoded request target.
///
/// `+` becomes a space and `%XX` becomes the byte `0xXX`. A `%` that is not
/// followed by two hex digits fails, as does a result that is not UTF-8.
///
/// # Example
///
/// ```
/// # use lantern::docroot::decode::percent_decode;
/// assert_eq!(percent_decode("/a%20b").unwrap(), "/a b");
/// assert!(percent_decode("/a%2").is_err());
/// ```
pub fn percent_decode(input: &str) -> Result<String, RequestError> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_value);
                let lo = bytes.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => decoded.push((hi << 4) | lo),
                    _ => return Err(RequestError::DecodeError),
                }
                i += 3;
            }
            b => {
                decoded.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(decoded).map_err(|_| RequestError::DecodeError)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
