//! Decode subtitle text in a wide variety of character encodings.

use encoding::{label::encoding_from_whatwg_label, types::DecoderTrap};
use log::debug;

/// Below this confidence, we refuse to trust `chardet`'s guess.
const MIN_CONFIDENCE: f32 = 0.5;

/// Guess the encoding of a byte buffer and decode it to a string. Valid
/// UTF-8 is used as-is; anything else goes through encoding detection.
/// A leading byte-order mark is dropped, and Windows line endings are
/// normalized to `\n`.
pub fn smart_decode(bytes: &[u8]) -> Result<String, String> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => detect_and_decode(bytes)?,
    };
    Ok(text.trim_start_matches('\u{FEFF}').replace("\r\n", "\n"))
}

fn detect_and_decode(bytes: &[u8]) -> Result<String, String> {
    let (name, confidence, _lang) = chardet::detect(bytes);
    debug!(
        "detected encoding name {:?} with confidence {}",
        name, confidence
    );
    if confidence < MIN_CONFIDENCE {
        return Err(format!(
            "cannot detect encoding with sufficient confidence (best guess {:?})",
            name
        ));
    }
    let encoding = encoding_from_whatwg_label(&name)
        .ok_or_else(|| format!("unknown encoding: {}", &name))?;
    encoding
        .decode(bytes, DecoderTrap::Strict)
        .map_err(|msg| msg.into_owned())
}

#[test]
fn test_smart_decode() {
    assert_eq!("ascii", &smart_decode("ascii".as_bytes()).unwrap());
    assert_eq!(
        "élèves français",
        &smart_decode("\u{FEFF}élèves français".as_bytes()).unwrap()
    );
    assert_eq!("a\nb\n", &smart_decode(b"a\r\nb\r\n").unwrap());
    assert_eq!(
        "une idée française",
        &smart_decode(&[
            0x75u8, 0x6e, 0x65, 0x20, 0x69, 0x64, 0xe9, 0x65, 0x20, 0x66, 0x72, 0x61,
            0x6e, 0xe7, 0x61, 0x69, 0x73, 0x65
        ])
        .unwrap()
    );
}
