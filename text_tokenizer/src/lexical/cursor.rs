//! Forward-only character cursor over a byte reader
//!
//! Decodes UTF-8 lazily, one read at a time, and buffers only what the
//! scanner has not consumed yet plus the current lookahead window.

use crate::config::compile_time::tokenizer::READ_BUFFER_SIZE;
use std::io::{self, Read};

/// Consumed characters are discarded once this many have piled up.
const COMPACT_THRESHOLD: usize = 4096;

/// Undecodable input, carried inside an `io::ErrorKind::InvalidData` error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid UTF-8 sequence at character offset {offset}")]
pub struct DecodeError {
    pub offset: usize,
}

#[derive(Debug)]
pub struct ScanCursor<R> {
    reader: R,
    read_buf: Box<[u8]>,
    /// Bytes of an incomplete UTF-8 sequence split across reads
    pending: Vec<u8>,
    chars: Vec<char>,
    /// Index in `chars` of the next unconsumed character
    head: usize,
    /// Stream offset of `chars[head]`
    offset: usize,
    eof: bool,
    /// Characters from `head` already known to satisfy the `fill_while`
    /// predicate
    run_checked: usize,
    /// Offset of undecodable input, reported once the characters before it
    /// have been consumed
    malformed_at: Option<usize>,
}

impl<R: Read> ScanCursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            read_buf: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            pending: Vec::new(),
            chars: Vec::new(),
            head: 0,
            offset: 0,
            eof: false,
            run_checked: 0,
            malformed_at: None,
        }
    }

    /// Rebind to a new reader, keeping buffer allocations.
    pub fn reset(&mut self, reader: R) {
        self.reader = reader;
        self.pending.clear();
        self.chars.clear();
        self.head = 0;
        self.offset = 0;
        self.eof = false;
        self.run_checked = 0;
        self.malformed_at = None;
    }

    /// Character offset of the next unconsumed character
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Next unconsumed character. Undecodable input is reported here, once,
    /// when every character before it has been consumed.
    pub fn peek(&mut self) -> io::Result<Option<char>> {
        if self.head == self.chars.len() && !self.fill()? {
            return self.end_of_input();
        }
        Ok(self.chars.get(self.head).copied())
    }

    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.head + n <= self.chars.len());
        self.head += n;
        self.offset += n;
        self.run_checked = self.run_checked.saturating_sub(n);
    }

    /// The last `n` consumed characters.
    ///
    /// Valid until the next read from the underlying stream.
    pub fn consumed_tail(&self, n: usize) -> &[char] {
        &self.chars[self.head - n..self.head]
    }

    /// Buffer ahead until `max` characters satisfying `pred` are available,
    /// a character failing `pred` is seen, or the stream ends. Returns the
    /// matching prefix of the unconsumed input.
    ///
    /// Characters checked by an earlier call are not checked again, so
    /// every call must pass the same predicate.
    pub fn fill_while(&mut self, max: usize, pred: fn(char) -> bool) -> io::Result<&[char]> {
        let mut scanned = self.run_checked.min(max);
        loop {
            let available = &self.chars[self.head..];
            while scanned < available.len() && scanned < max && pred(available[scanned]) {
                scanned += 1;
            }
            if scanned == max || scanned < available.len() {
                break;
            }
            if !self.fill()? {
                break;
            }
        }
        self.run_checked = scanned;
        Ok(&self.chars[self.head..self.head + scanned])
    }

    /// Consume characters while `pred` holds without keeping them around.
    /// Returns how many were consumed.
    pub fn skip_while(&mut self, pred: impl Fn(char) -> bool) -> io::Result<usize> {
        let mut skipped = 0;
        loop {
            while let Some(&c) = self.chars.get(self.head) {
                if !pred(c) {
                    return Ok(skipped);
                }
                self.advance(1);
                skipped += 1;
            }
            if !self.fill()? {
                return Ok(skipped);
            }
        }
    }

    /// Decode at least one more character. Returns `false` at end of stream,
    /// including input cut short by malformed bytes.
    fn fill(&mut self) -> io::Result<bool> {
        if self.eof {
            return Ok(false);
        }
        self.compact();

        loop {
            let n = match self.reader.read(&mut self.read_buf) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if n == 0 {
                self.eof = true;
                if !self.pending.is_empty() {
                    self.pending.clear();
                    self.malformed_at = Some(self.decoded_end());
                }
                return Ok(false);
            }

            self.pending.extend_from_slice(&self.read_buf[..n]);
            let before = self.chars.len();
            self.decode_pending();
            if self.chars.len() > before {
                return Ok(true);
            }
            if self.eof {
                return Ok(false);
            }
        }
    }

    fn end_of_input(&mut self) -> io::Result<Option<char>> {
        match self.malformed_at.take() {
            Some(offset) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                DecodeError { offset },
            )),
            None => Ok(None),
        }
    }

    /// Decode the valid prefix of `pending`. Malformed bytes end the input.
    fn decode_pending(&mut self) {
        let (valid, malformed) = match std::str::from_utf8(&self.pending) {
            Ok(_) => (self.pending.len(), false),
            Err(e) => (e.valid_up_to(), e.error_len().is_some()),
        };

        if let Ok(text) = std::str::from_utf8(&self.pending[..valid]) {
            self.chars.extend(text.chars());
        }
        self.pending.drain(..valid);

        if malformed {
            self.pending.clear();
            self.eof = true;
            self.malformed_at = Some(self.decoded_end());
        }
    }

    /// Stream offset just past the last decoded character
    fn decoded_end(&self) -> usize {
        self.offset + (self.chars.len() - self.head)
    }

    fn compact(&mut self) {
        if self.head == self.chars.len() {
            self.chars.clear();
            self.head = 0;
        } else if self.head >= COMPACT_THRESHOLD {
            self.chars.drain(..self.head);
            self.head = 0;
        }
    }
}
