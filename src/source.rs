//! Newline framing over a byte stream (serial device, capture file, stdin).

use std::io::{BufRead, BufReader, ErrorKind, Read};

use log::warn;

pub const FRAME_TERMINATOR: u8 = b'\n';

#[derive(Debug)]
pub struct FrameReader<R: Read> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    frames: u64,
    eof: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: Vec::with_capacity(256),
            frames: 0,
            eof: false,
        }
    }

    /// Frames delivered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// One poll tick: the next complete frame, without its terminator.
    /// Returns `Ok(None)` at end of stream; a final unterminated chunk is
    /// still handed out as a frame. Any `\r` stays part of the frame, some
    /// formats count it in their length.
    pub fn poll(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        if self.eof {
            return Ok(None);
        }
        self.buf.clear();
        let n = loop {
            match self.inner.read_until(FRAME_TERMINATOR, &mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("frame source: read failed: {e}");
                    return Err(e);
                }
            }
        };
        if n == 0 {
            self.eof = true;
            return Ok(None);
        }
        if self.buf.last() == Some(&FRAME_TERMINATOR) {
            self.buf.pop();
        }
        self.frames += 1;
        Ok(Some(std::mem::take(&mut self.buf)))
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = std::io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.poll().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_newline_only() {
        let data: &[u8] = b"abc\r\n\n01\nlast";
        let frames: Vec<Vec<u8>> = FrameReader::new(data)
            .collect::<std::io::Result<_>>()
            .expect("in-memory read");
        assert_eq!(
            frames,
            vec![b"abc\r".to_vec(), Vec::new(), b"01".to_vec(), b"last".to_vec()]
        );
    }

    #[test]
    fn poll_reports_end_of_stream() {
        let mut r = FrameReader::new(&b"x\n"[..]);
        assert_eq!(r.poll().ok().flatten(), Some(b"x".to_vec()));
        assert_eq!(r.poll().ok().flatten(), None);
        assert!(r.is_eof());
        assert_eq!(r.frames(), 1);
    }
}
