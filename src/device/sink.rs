//! Hosted output sinks.

use super::{DeviceError, OutputRegister};
use crate::word::{word_to_char, Word};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Records every word written, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSink {
    words: Vec<Word>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// The words written so far.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of writes observed.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Render the recorded words as text.
    ///
    /// Unlike sequence decoding, zero words are kept; the register
    /// accepts them like any other value.
    pub fn text(&self) -> String {
        self.words.iter().map(|&w| word_to_char(w)).collect()
    }

    /// Forget everything recorded.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Take the recorded words, leaving the sink empty.
    pub fn take(&mut self) -> Vec<Word> {
        std::mem::take(&mut self.words)
    }
}

impl OutputRegister for RecordingSink {
    fn write_word(&mut self, word: Word) -> Result<(), DeviceError> {
        self.words.push(word);
        Ok(())
    }
}

/// Writes each word as a UTF-8 character to a byte stream.
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    inner: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<(), DeviceError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Recover the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl StreamSink<std::io::Stdout> {
    /// A sink on the process's standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> OutputRegister for StreamSink<W> {
    fn write_word(&mut self, word: Word) -> Result<(), DeviceError> {
        let mut buf = [0u8; 4];
        let encoded = word_to_char(word).encode_utf8(&mut buf);
        self.inner.write_all(encoded.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.write_word('a' as Word).unwrap();
        sink.write_word('b' as Word).unwrap();

        assert_eq!(sink.words(), &['a' as Word, 'b' as Word]);
        assert_eq!(sink.text(), "ab");
        assert_eq!(sink.take().len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_stream_sink_encodes_utf8() {
        let mut sink = StreamSink::new(Vec::new());
        sink.write_word('h' as Word).unwrap();
        sink.write_word('é' as Word).unwrap();
        sink.write_word(-1).unwrap();

        let bytes = sink.into_inner();
        assert_eq!(String::from_utf8(bytes).unwrap(), "hé\u{FFFD}");
    }

    #[test]
    fn test_stream_sink_reports_io_errors() {
        let mut sink = StreamSink::new(BrokenPipe);
        let err = sink.write_word('x' as Word).unwrap_err();
        assert!(matches!(err, DeviceError::Io(_)));
    }

    #[test]
    fn test_borrowed_register_forwards() {
        fn write_seven<O: OutputRegister>(mut reg: O) {
            reg.write_word(7).unwrap();
        }

        let mut sink = RecordingSink::new();
        write_seven(&mut sink);
        write_seven(Box::new(&mut sink));
        assert_eq!(sink.words(), &[7, 7]);
    }
}
