//! Fixed-capacity line assembler for the serial links.
//!
//! Bytes are fed one at a time; a `\n` completes the line and `\r` is
//! removed from it.  A line that outgrows the buffer is never cut into
//! fragments: its held bytes are released as [`Frame::Overlong`] and every
//! later byte up to and including the `\n` as [`Frame::Raw`], all of them
//! unmodified.

use heapless::Vec;

/// Longest line framed before it is treated as overlong.
pub const MAX_LINE_LEN: usize = 256;

/// What one fed byte produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete line, without terminator or `\r`.
    Line(String),
    /// Head of a line that outgrew the buffer, including the byte that
    /// did not fit.
    Overlong(std::vec::Vec<u8>),
    /// A byte of an overlong line's tail.
    Raw(u8),
}

pub struct LineBuffer<const N: usize = MAX_LINE_LEN> {
    buf: Vec<u8, N>,
    overlong: bool,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            overlong: false,
        }
    }

    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        if self.overlong {
            if byte == b'\n' {
                self.overlong = false;
            }
            return Some(Frame::Raw(byte));
        }
        if byte == b'\n' {
            return Some(Frame::Line(self.take()));
        }
        if self.buf.push(byte).is_ok() {
            return None;
        }

        self.overlong = true;
        let mut head = self.buf.to_vec();
        head.push(byte);
        self.buf.clear();
        Some(Frame::Overlong(head))
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop any partial line (e.g. after a transport change).
    pub fn clear(&mut self) {
        self.buf.clear();
        self.overlong = false;
    }

    fn take(&mut self) -> String {
        let bytes: std::vec::Vec<u8> = self.buf.iter().copied().filter(|&b| b != b'\r').collect();
        self.buf.clear();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
