//! Machine words and zero-terminated word sequences.
//!
//! Everything the console sees is a [`Word`]: a 32-bit signed integer.
//! Character data travels as one Unicode scalar value per word, and
//! strings are sequences of such words ending in a zero word.

/// A single machine word.
pub type Word = i32;

/// The sentinel that ends a character sequence.
pub const TERMINATOR: Word = 0;

/// Encode a string as a zero-terminated word sequence.
pub fn encode_str(s: &str) -> Vec<Word> {
    s.chars()
        .map(|c| c as u32 as Word)
        .chain(std::iter::once(TERMINATOR))
        .collect()
}

/// Decode words into a string, stopping at the first terminator.
///
/// Words that are not valid Unicode scalar values decode to U+FFFD.
pub fn decode_words(words: &[Word]) -> String {
    words
        .iter()
        .take_while(|&&w| w != TERMINATOR)
        .map(|&w| word_to_char(w))
        .collect()
}

/// Interpret a word as a character.
pub fn word_to_char(word: Word) -> char {
    char::from_u32(word as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Position of the terminator, if the slice contains one.
pub fn terminator_position(words: &[Word]) -> Option<usize> {
    words.iter().position(|&w| w == TERMINATOR)
}

/// Division truncating toward zero, as C compilers do.
///
/// Returns `None` for a zero divisor. `Word::MIN / -1` wraps.
pub fn c_div(x: Word, y: Word) -> Option<Word> {
    if y == 0 {
        None
    } else {
        Some(x.wrapping_div(y))
    }
}

/// Remainder carrying the sign of the dividend, as C compilers do.
pub fn c_mod(x: Word, y: Word) -> Option<Word> {
    if y == 0 {
        None
    } else {
        Some(x.wrapping_rem(y))
    }
}
