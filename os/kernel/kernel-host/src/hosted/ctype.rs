use crate::abi::CtypeTable;
use crate::abi::ctype::{CNTRL, DIGIT, HARD_SPACE, HEX, LOWER, PUNCT, SPACE, UPPER};

/// ASCII half of the kernel's `_ctype[]`; the Latin-1 half is left unclassified.
pub static CTYPE: CtypeTable = CtypeTable(classify_all());

const fn classify(c: u8) -> u8 {
    let mut flags = 0;
    if c.is_ascii_uppercase() {
        flags |= UPPER;
    }
    if c.is_ascii_lowercase() {
        flags |= LOWER;
    }
    if c.is_ascii_digit() {
        flags |= DIGIT;
    }
    if c.is_ascii_control() {
        flags |= CNTRL;
    }
    if c.is_ascii_punctuation() {
        flags |= PUNCT;
    }
    if matches!(c, b'\t' | b'\n' | 0x0b | 0x0c | b'\r' | b' ') {
        flags |= SPACE;
    }
    if c == b' ' {
        flags |= HARD_SPACE;
    }
    if matches!(c, b'a'..=b'f' | b'A'..=b'F') {
        flags |= HEX;
    }
    flags
}

const fn classify_all() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut c = 0;
    while c < 128 {
        #[allow(clippy::cast_possible_truncation)]
        {
            table[c] = classify(c as u8);
        }
        c += 1;
    }
    table
}
