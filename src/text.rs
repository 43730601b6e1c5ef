//! `decode_str`: the UTF-8-first, charset-detection-fallback decoding
//! contract used throughout the decoders (§4.6).

/// Decodes `bytes` to a `String`. Tries strict UTF-8 first; on failure,
/// detects the charset with `chardetng` and decodes with `encoding_rs`,
/// replacing any residual malformed sequences with U+FFFD.
pub fn decode_str(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => decode_lossy_with_detection(bytes),
    }
}

fn decode_lossy_with_detection(bytes: &[u8]) -> String {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

/// Decodes `bytes` as `encoding` (falling back to UTF-8 when `encoding` is
/// `None`, per the commit decoder's default), with lossy replacement. Used
/// once a commit's declared `encoding` header value is known (§4.8).
pub fn decode_str_as(bytes: &[u8], encoding: Option<&str>) -> String {
    let enc = encoding
        .and_then(encoding_rs::Encoding::for_label)
        .unwrap_or(encoding_rs::UTF_8);
    let (decoded, _, _) = enc.decode(bytes);
    decoded.into_owned()
}
