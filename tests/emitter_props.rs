//! Property tests for the emitters.

use mmio_console::emit::{emit_int_with, emit_sequence, DigitPolicy, EmitError, PLACES};
use mmio_console::word::{encode_str, Word};
use mmio_console::RecordingSink;
use proptest::prelude::*;

fn render(value: Word, policy: DigitPolicy) -> String {
    let mut sink = RecordingSink::new();
    emit_int_with(&mut sink, value, policy).unwrap();
    sink.text()
}

proptest! {
    #[test]
    fn sequence_writes_exactly_the_prefix(words in prop::collection::vec(1..=0x10FFFFi32, 0..64)) {
        let mut seq = words.clone();
        seq.push(0);

        let mut sink = RecordingSink::new();
        emit_sequence(&mut sink, &seq).unwrap();

        prop_assert_eq!(sink.len(), words.len());
        prop_assert_eq!(sink.words(), words.as_slice());
    }

    #[test]
    fn sequence_round_trips_text(s in "[a-zA-Z0-9 .,!?]{0,40}") {
        let mut sink = RecordingSink::new();
        emit_sequence(&mut sink, &encode_str(&s)).unwrap();
        prop_assert_eq!(sink.text(), s);
    }

    #[test]
    fn missing_terminator_writes_nothing(words in prop::collection::vec(1..1000i32, 0..32)) {
        let mut sink = RecordingSink::new();
        let result = emit_sequence(&mut sink, &words);

        prop_assert!(matches!(result, Err(EmitError::Unterminated { .. })), "expected Unterminated");
        prop_assert!(sink.is_empty());
    }

    #[test]
    fn all_places_is_zero_padded_decimal(value in 0..=Word::MAX) {
        let text = render(value, DigitPolicy::AllPlaces);
        prop_assert_eq!(text.len(), PLACES);
        prop_assert_eq!(text, format!("{:010}", value));
    }

    #[test]
    fn suppressed_matches_display(value in 0..=Word::MAX) {
        prop_assert_eq!(render(value, DigitPolicy::SuppressLeading), value.to_string());
    }

    #[test]
    fn repeated_calls_agree(value in 0..=Word::MAX) {
        prop_assert_eq!(
            render(value, DigitPolicy::AllPlaces),
            render(value, DigitPolicy::AllPlaces)
        );
    }

    #[test]
    fn negatives_are_rejected(value in Word::MIN..0) {
        let mut sink = RecordingSink::new();
        let result = emit_int_with(&mut sink, value, DigitPolicy::AllPlaces);

        prop_assert!(matches!(result, Err(EmitError::Negative(v)) if v == value), "expected Negative");
        prop_assert!(sink.is_empty());
    }
}
