//! Conversion between spreadsheet column letters and 1-based ordinals

/// Convert column letters to a 1-based ordinal ("A" -> 1, "Z" -> 26, "AA" -> 27).
///
/// Letters form a bijective base-26 numeral, most significant letter first.
/// Returns `None` for an empty string, any character outside `A-Z`, or an
/// ordinal that does not fit in `u32`. Callers normalize case beforehand.
pub fn to_ordinal(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut ordinal = 0u32;
    for ch in letters.bytes() {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        ordinal = ordinal
            .checked_mul(26)?
            .checked_add(u32::from(ch - b'A') + 1)?;
    }
    Some(ordinal)
}

/// Convert a 1-based ordinal back to column letters (1 -> "A", 27 -> "AA")
pub fn to_letters(ordinal: u32) -> Option<String> {
    if ordinal == 0 {
        return None;
    }

    let mut col = ordinal - 1;
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    Some(result)
}
