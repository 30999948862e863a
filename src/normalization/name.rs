use unicode_normalization::UnicodeNormalization;

/// Canonical form of a game name, used as the dedup key during ingest.
///
/// Normalization steps:
/// - drop UTF-16 surrogate halves that lack their matching pair
/// - apply Unicode canonical composition (NFC)
/// - trim surrounding whitespace
///
/// Total and idempotent; `None` and empty input both yield `""`.
pub fn clean_name(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    if raw.is_empty() {
        return String::new();
    }
    let units: Vec<u16> = raw.encode_utf16().collect();
    let paired = strip_unpaired_surrogates(&units);
    let composed: String = paired.nfc().collect();
    composed.trim().to_string()
}

/// Remove code units that form half of a surrogate pair without the matching
/// other half: a high surrogate not immediately followed by a low surrogate,
/// or a low surrogate not immediately preceded by a high surrogate. Catalog
/// payloads decoded upstream can carry such units; the dedup key must not
/// depend on them.
fn strip_unpaired_surrogates(units: &[u16]) -> String {
    let mut kept: Vec<u16> = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let u = units[i];
        if (0xD800..=0xDBFF).contains(&u) {
            match units.get(i + 1) {
                Some(&low) if (0xDC00..=0xDFFF).contains(&low) => {
                    kept.push(u);
                    kept.push(low);
                    i += 2;
                }
                _ => {
                    // lone high surrogate
                    i += 1;
                }
            }
            continue;
        }
        if (0xDC00..=0xDFFF).contains(&u) {
            // lone low surrogate
            i += 1;
            continue;
        }
        kept.push(u);
        i += 1;
    }
    String::from_utf16(&kept).unwrap_or_else(|_| String::from_utf16_lossy(&kept))
}
