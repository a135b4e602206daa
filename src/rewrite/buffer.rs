//! Resizable look-ahead buffer with in-place substitution.
//!
//! Keeps undelivered bytes in a single allocation addressed by
//! `(read_offset, pending_length)`. Invariant:
//! `read_offset + pending_length <= capacity`. Substitution splices a
//! replacement over a span of pending bytes with a memmove of the tail;
//! bytes already consumed by the caller are never touched.

use std::io::{self, Read};
use thiserror::Error;

/// A substitution's bookkeeping did not fit the buffer. Carries the full
/// buffer geometry for diagnostics; the affected token is delivered
/// unmodified and the stream continues.
#[derive(Debug, Error)]
#[error(
    "buffer invariant violated: substitute at={at} old_len={old_len} new_len={new_len} \
     (read_off={read_off} pending={pending} capacity={capacity})"
)]
pub struct BufferInvariant {
    pub at: usize,
    pub old_len: usize,
    pub new_len: usize,
    pub read_off: usize,
    pub pending: usize,
    pub capacity: usize,
}

/// Default look-ahead buffer capacity.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Read-ahead increment while a token capture is open.
pub const READ_AHEAD_BYTES: usize = 64;

#[derive(Debug)]
pub struct LookAheadBuffer {
    bytes: Vec<u8>,
    read_off: usize,
    pending: usize,
}

impl LookAheadBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity.max(1)],
            read_off: 0,
            pending: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Undelivered bytes, in order.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.bytes[self.read_off..self.read_off + self.pending]
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending
    }

    /// Release the first `n` pending bytes to the consumer.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.pending);
        self.read_off += n;
        self.pending -= n;
        if self.pending == 0 {
            self.read_off = 0;
        }
    }

    /// Append up to `want` bytes from `reader`. Returns the byte count,
    /// zero at end of input.
    pub fn fill_from<R: Read>(&mut self, reader: &mut R, want: usize) -> io::Result<usize> {
        self.make_room(want);
        let start = self.read_off + self.pending;
        let n = reader.read(&mut self.bytes[start..start + want])?;
        self.pending += n;
        Ok(n)
    }

    /// Replace `old_len` pending bytes starting at pending-relative index
    /// `at` with `new`. Returns the signed length delta. Fails without
    /// touching anything if the span does not lie inside the pending
    /// region.
    pub fn substitute(
        &mut self,
        at: usize,
        old_len: usize,
        new: &[u8],
    ) -> Result<isize, BufferInvariant> {
        if at.checked_add(old_len).is_none_or(|end| end > self.pending) {
            return Err(BufferInvariant {
                at,
                old_len,
                new_len: new.len(),
                read_off: self.read_off,
                pending: self.pending,
                capacity: self.capacity(),
            });
        }
        if new.len() > old_len {
            self.make_room(new.len() - old_len);
        }
        let start = self.read_off + at;
        let tail_src = start + old_len;
        let tail_end = self.read_off + self.pending;
        self.bytes
            .copy_within(tail_src..tail_end, start + new.len());
        self.bytes[start..start + new.len()].copy_from_slice(new);
        self.pending = self.pending - old_len + new.len();
        Ok(new.len() as isize - old_len as isize)
    }

    /// Make room to hold `extra` more bytes after the pending region.
    ///
    /// Growth policy: if the required live size exceeds double the current
    /// capacity, reallocate to twice the requirement; if it merely exceeds
    /// the capacity, double; otherwise a shift of the pending bytes to
    /// offset zero reclaims the slack.
    fn make_room(&mut self, extra: usize) {
        let need = self.pending + extra;
        let cap = self.capacity();
        if need <= cap {
            if self.read_off + need > cap {
                self.shift();
            }
        } else if need <= cap * 2 {
            self.grow(cap * 2);
        } else {
            self.grow(need * 2);
        }
    }

    /// Move the pending bytes to offset zero.
    fn shift(&mut self) {
        self.bytes
            .copy_within(self.read_off..self.read_off + self.pending, 0);
        self.read_off = 0;
    }

    /// Reallocate to `new_cap`, moving the pending bytes to offset zero.
    fn grow(&mut self, new_cap: usize) {
        let mut grown = vec![0; new_cap];
        grown[..self.pending]
            .copy_from_slice(&self.bytes[self.read_off..self.read_off + self.pending]);
        self.bytes = grown;
        self.read_off = 0;
    }
}

impl Default for LookAheadBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(data: &[u8], capacity: usize) -> LookAheadBuffer {
        let mut buf = LookAheadBuffer::with_capacity(capacity);
        let mut src = data;
        buf.fill_from(&mut src, data.len()).unwrap();
        buf
    }

    #[test]
    fn fill_and_consume() {
        let mut buf = filled(b"hello world", 16);
        assert_eq!(buf.pending(), b"hello world");
        buf.consume(6);
        assert_eq!(buf.pending(), b"world");
    }

    #[test]
    fn substitute_same_length() {
        let mut buf = filled(b"abcdef", 16);
        let delta = buf.substitute(2, 2, b"XY").unwrap();
        assert_eq!(delta, 0);
        assert_eq!(buf.pending(), b"abXYef");
    }

    #[test]
    fn substitute_shorter() {
        let mut buf = filled(b"abcdef", 16);
        let delta = buf.substitute(1, 4, b"-").unwrap();
        assert_eq!(delta, -3);
        assert_eq!(buf.pending(), b"a-f");
    }

    #[test]
    fn substitute_longer_within_capacity() {
        let mut buf = filled(b"abcdef", 32);
        let delta = buf.substitute(3, 1, b"LONGER").unwrap();
        assert_eq!(delta, 5);
        assert_eq!(buf.pending(), b"abcLONGERef");
    }

    #[test]
    fn substitute_grows_when_needed() {
        let mut buf = filled(b"abcdef", 8);
        let replacement = vec![b'x'; 100];
        buf.substitute(0, 6, &replacement).unwrap();
        assert_eq!(buf.pending(), replacement.as_slice());
        assert!(buf.capacity() >= 100);
    }

    #[test]
    fn substitution_does_not_touch_consumed_bytes() {
        let mut buf = filled(b"abcdef", 16);
        buf.consume(2);
        buf.substitute(0, 2, b"XXXX").unwrap();
        assert_eq!(buf.pending(), b"XXXXef");
    }

    #[test]
    fn shift_reclaims_slack_instead_of_growing() {
        let mut buf = filled(b"abcdefgh", 8);
        buf.consume(6);
        // Two pending bytes at offset 6; four more fit after a shift.
        let mut src: &[u8] = b"1234";
        buf.fill_from(&mut src, 4).unwrap();
        assert_eq!(buf.pending(), b"gh1234");
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn out_of_range_substitution_is_rejected() {
        let mut buf = filled(b"abc", 8);
        let err = buf.substitute(2, 5, b"x").unwrap_err();
        assert_eq!(err.at, 2);
        assert_eq!(err.old_len, 5);
        assert_eq!(buf.pending(), b"abc");
    }

    #[test]
    fn overflow_substitution_is_rejected() {
        let mut buf = filled(b"abc", 8);
        assert!(buf.substitute(usize::MAX, 2, b"x").is_err());
    }
}
