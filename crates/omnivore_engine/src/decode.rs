use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
    /// Some bytes were invalid for the chosen encoding and got replaced.
    pub had_errors: bool,
}

/// Decode raw bytes into UTF-8 using: BOM -> strict UTF-8 -> chardetng fallback.
///
/// Never fails; undecodable bytes become U+FFFD and set `had_errors`.
pub fn decode_html(bytes: &[u8]) -> DecodedHtml {
    // 1) BOM aware decode using encoding_rs helper
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    // 2) Exports are normally UTF-8 already
    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedHtml {
            html: text.to_string(),
            encoding_label: encoding_rs::UTF_8.name().to_string(),
            had_errors: false,
        };
    }

    // 3) chardetng detection over the full document
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, false);
    decode_with(bytes, enc)
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedHtml {
    let (text, used, had_errors) = enc.decode(bytes);
    DecodedHtml {
        html: text.into_owned(),
        encoding_label: used.name().to_string(),
        had_errors,
    }
}
