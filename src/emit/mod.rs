//! Character and decimal emitters.
//!
//! Both routines turn a value into a stream of single-word writes to an
//! [`OutputRegister`]:
//! - [`emit_sequence`] copies a zero-terminated word sequence
//! - [`emit_int`] renders a non-negative integer in decimal, one digit per
//!   place value from 10^9 down to 1
//!
//! [`greet`] is the fixed caller: a greeting line, then the number 130.

use crate::device::{DeviceError, OutputRegister};
use crate::word::{self, Word};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The value every emitter returns on success.
pub const SUCCESS: Word = 1;

/// Largest decimal place value that fits a [`Word`].
pub const TOP_PLACE: Word = 1_000_000_000;

/// Number of digits [`DigitPolicy::AllPlaces`] always writes.
pub const PLACES: usize = 10;

/// The greeting written by [`greet`].
pub const GREETING: &str = "hello world\n";

/// The number written by [`greet`].
pub const GREETING_NUMBER: Word = 130;

/// How the integer emitter treats zeros above the most significant digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitPolicy {
    /// One digit per place value, leading zeros included.
    #[default]
    AllPlaces,
    /// Skip leading zeros; zero itself still prints as `0`.
    SuppressLeading,
}

/// Errors raised by the emitters.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("cannot format negative value {0} in decimal")]
    Negative(Word),

    #[error("sequence of {len} words has no terminator")]
    Unterminated { len: usize },

    #[error("sequence of {len} words exceeds limit of {limit}")]
    TooLong { len: usize, limit: usize },

    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

/// Write a zero-terminated sequence to the register, terminator excluded.
///
/// The terminator is located before anything is written, so an
/// unterminated slice produces no output at all.
pub fn emit_sequence<O: OutputRegister>(out: &mut O, seq: &[Word]) -> Result<Word, EmitError> {
    emit_sequence_bounded(out, seq, usize::MAX)
}

/// Like [`emit_sequence`], refusing sequences longer than `limit` words.
pub fn emit_sequence_bounded<O: OutputRegister>(
    out: &mut O,
    seq: &[Word],
    limit: usize,
) -> Result<Word, EmitError> {
    let len = word::terminator_position(seq)
        .ok_or(EmitError::Unterminated { len: seq.len() })?;
    if len > limit {
        return Err(EmitError::TooLong { len, limit });
    }

    for &w in &seq[..len] {
        out.write_word(w)?;
    }
    Ok(SUCCESS)
}

/// Write `value` in decimal with a digit for every place value.
pub fn emit_int<O: OutputRegister>(out: &mut O, value: Word) -> Result<(), EmitError> {
    emit_int_with(out, value, DigitPolicy::AllPlaces)
}

/// Write `value` in decimal under the given digit policy.
///
/// Digits are extracted by repeated subtraction of each place value, most
/// significant first.
pub fn emit_int_with<O: OutputRegister>(
    out: &mut O,
    value: Word,
    policy: DigitPolicy,
) -> Result<(), EmitError> {
    if value < 0 {
        return Err(EmitError::Negative(value));
    }

    let mut rest = value;
    let mut place = TOP_PLACE;
    let mut seen_nonzero = false;
    while place > 0 {
        let mut digit: Word = 0;
        while rest >= place {
            rest -= place;
            digit += 1;
        }

        seen_nonzero |= digit != 0;
        let keep = match policy {
            DigitPolicy::AllPlaces => true,
            DigitPolicy::SuppressLeading => seen_nonzero || place == 1,
        };
        if keep {
            out.write_word(digit + '0' as Word)?;
        }
        place /= 10;
    }
    Ok(())
}

/// Write the greeting, then [`GREETING_NUMBER`].
pub fn greet<O: OutputRegister>(out: &mut O) -> Result<Word, EmitError> {
    emit_sequence(out, &word::encode_str(GREETING))?;
    emit_int(out, GREETING_NUMBER)?;
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RecordingSink;

    fn int_text(value: Word, policy: DigitPolicy) -> String {
        let mut sink = RecordingSink::new();
        emit_int_with(&mut sink, value, policy).unwrap();
        sink.text()
    }

    #[test]
    fn test_sequence_writes_each_word() {
        let mut sink = RecordingSink::new();
        let result = emit_sequence(&mut sink, &word::encode_str("hi")).unwrap();

        assert_eq!(result, SUCCESS);
        assert_eq!(sink.words(), &['h' as Word, 'i' as Word]);
    }

    #[test]
    fn test_sequence_stops_at_first_zero() {
        let mut sink = RecordingSink::new();
        emit_sequence(&mut sink, &[65, 0, 66, 0]).unwrap();
        assert_eq!(sink.words(), &[65]);
    }

    #[test]
    fn test_empty_sequence_writes_nothing() {
        let mut sink = RecordingSink::new();
        assert_eq!(emit_sequence(&mut sink, &[0]).unwrap(), SUCCESS);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_unterminated_sequence_is_rejected() {
        let mut sink = RecordingSink::new();
        let err = emit_sequence(&mut sink, &[104, 105]).unwrap_err();

        assert!(matches!(err, EmitError::Unterminated { len: 2 }));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_sequence_limit() {
        let mut sink = RecordingSink::new();
        let seq = word::encode_str("abcd");

        assert!(emit_sequence_bounded(&mut sink, &seq, 4).is_ok());
        let err = emit_sequence_bounded(&mut sink, &seq, 3).unwrap_err();
        assert!(matches!(err, EmitError::TooLong { len: 4, limit: 3 }));
    }

    #[test]
    fn test_int_keeps_leading_zeros() {
        assert_eq!(int_text(130, DigitPolicy::AllPlaces), "0000000130");
        assert_eq!(int_text(0, DigitPolicy::AllPlaces), "0000000000");
        assert_eq!(int_text(7, DigitPolicy::AllPlaces), "0000000007");
    }

    #[test]
    fn test_int_at_word_max() {
        assert_eq!(int_text(Word::MAX, DigitPolicy::AllPlaces), "2147483647");
        assert_eq!(int_text(TOP_PLACE, DigitPolicy::AllPlaces), "1000000000");
        assert_eq!(int_text(1_999_999_999, DigitPolicy::AllPlaces), "1999999999");
    }

    #[test]
    fn test_int_suppressing_zeros() {
        assert_eq!(int_text(130, DigitPolicy::SuppressLeading), "130");
        assert_eq!(int_text(0, DigitPolicy::SuppressLeading), "0");
        assert_eq!(int_text(1_000_000_007, DigitPolicy::SuppressLeading), "1000000007");
    }

    #[test]
    fn test_negative_int_is_rejected() {
        let mut sink = RecordingSink::new();
        let err = emit_int(&mut sink, -5).unwrap_err();

        assert!(matches!(err, EmitError::Negative(-5)));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_greet() {
        let mut sink = RecordingSink::new();
        assert_eq!(greet(&mut sink).unwrap(), SUCCESS);
        assert_eq!(sink.text(), "hello world\n0000000130");
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let mut first = RecordingSink::new();
        let mut second = RecordingSink::new();
        greet(&mut first).unwrap();
        greet(&mut second).unwrap();
        assert_eq!(first, second);
    }
}
