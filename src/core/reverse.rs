// WafLogCheck - core/reverse.rs
//
// Backward line reader: yields the lines of a seekable source last-first.
// Core layer: accepts Read + Seek values, never opens files itself
// (see platform::fs::reverse_lines for the path-based entry point).
//
// Line rules:
//   - A line-feed that is the final byte of the source terminates the last
//     line; it does not produce an extra empty line.
//   - Every other line-feed separates two lines, so interior empty lines are
//     yielded as "".
//   - An empty source yields no lines at all.
//
// Bytes are decoded as lossy UTF-8 per line. Pending bytes are kept in
// reverse order and flipped once when the line is yielded, so multi-byte
// characters split across chunk boundaries are reassembled before decoding
// and a line spanning many chunks costs time linear in its length.

use crate::util::constants::DEFAULT_REVERSE_CHUNK_SIZE;
use std::io::{self, Read, Seek, SeekFrom};

/// Iterator over the lines of `R` from last to first.
#[derive(Debug)]
pub struct ReverseLines<R> {
    reader: R,
    /// Bytes `[0, pos)` of the source have not been read yet.
    pos: u64,
    /// Most recently read chunk, in file order.
    chunk: Vec<u8>,
    /// `chunk[..cursor]` has not been consumed yet.
    cursor: usize,
    /// Bytes of the line being assembled, last byte first.
    pending: Vec<u8>,
    chunk_size: usize,
    done: bool,
}

impl<R: Read + Seek> ReverseLines<R> {
    /// Position `reader` at its end and prepare to walk backward.
    pub fn new(reader: R) -> io::Result<Self> {
        Self::with_chunk_size(reader, DEFAULT_REVERSE_CHUNK_SIZE)
    }

    /// Like `new` with an explicit read chunk size. A zero size is treated
    /// as one byte.
    pub fn with_chunk_size(mut reader: R, chunk_size: usize) -> io::Result<Self> {
        let end = reader.seek(SeekFrom::End(0))?;
        let mut pos = end;

        // A final line-feed terminates the last line instead of opening a
        // new empty one.
        if end > 0 {
            reader.seek(SeekFrom::Start(end - 1))?;
            let mut last = [0u8; 1];
            reader.read_exact(&mut last)?;
            if last[0] == b'\n' {
                pos = end - 1;
            }
        }

        tracing::trace!(end, chunk_size, "Reverse reader positioned at end");

        Ok(Self {
            reader,
            pos,
            chunk: Vec::new(),
            cursor: 0,
            pending: Vec::new(),
            chunk_size: chunk_size.max(1),
            done: end == 0,
        })
    }

    /// Read the chunk preceding the current one into `chunk`.
    fn load_previous_chunk(&mut self) -> io::Result<()> {
        let n = (self.chunk_size as u64).min(self.pos) as usize;
        self.pos -= n as u64;
        self.reader.seek(SeekFrom::Start(self.pos))?;

        self.chunk.resize(n, 0);
        self.reader.read_exact(&mut self.chunk)?;
        self.cursor = n;
        Ok(())
    }

    /// Hand out the assembled line in file order.
    fn take_line(&mut self) -> String {
        let mut line = std::mem::take(&mut self.pending);
        line.reverse();
        decode(line)
    }
}

impl<R: Read + Seek> Iterator for ReverseLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let unread = &self.chunk[..self.cursor];
            match unread.iter().rposition(|&b| b == b'\n') {
                Some(nl) => {
                    self.pending.extend(unread[nl + 1..].iter().rev());
                    self.cursor = nl;
                    return Some(Ok(self.take_line()));
                }
                None => {
                    self.pending.extend(unread.iter().rev());
                    self.cursor = 0;
                }
            }

            if self.pos == 0 {
                // Start of source reached: what is left is the first line.
                self.done = true;
                return Some(Ok(self.take_line()));
            }

            if let Err(e) = self.load_previous_chunk() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for ReverseLines<R> {}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
