//! `std::io` adapters and transport pumps.
//!
//! `fill_from` and `drain_to` drive the zero-copy lock/commit cycle against a
//! non-blocking source or sink: lock the contiguous span, hand it to the
//! reader or writer, commit what was actually transferred, repeat until the
//! buffer (or the peer) has nothing more to offer.

use std::io::{self, ErrorKind};

use tracing::trace;

use crate::RingBuffer;

impl io::Write for RingBuffer {
    /// Writes as much of `buf` as fits; returns 0 when the buffer is full.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let size = buf.len().min(self.available());
        RingBuffer::write(self, &buf[..size]).map_err(io::Error::other)?;
        Ok(size)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for RingBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        RingBuffer::read(self, buf).map_err(io::Error::other)
    }
}

impl RingBuffer {
    /// Receive from `src` straight into free space until the buffer is full,
    /// `src` reports end of stream, or `src` would block
    ///
    /// A buffer that is already full returns `Ok(0)` without touching `src`,
    /// the same as a source with nothing to offer. Callers that need to tell
    /// the two apart (e.g. to drop a peer that overruns its receive buffer)
    /// check [`full`](RingBuffer::full) first.
    ///
    /// # Arguments
    /// * `src` - Non-blocking source to receive from
    ///
    /// # Returns
    /// * `Ok(n)` with the total bytes received (0 if nothing was available)
    /// * `Err(e)` with the first non-retryable error from `src`, or a wrapped
    ///   [`RingError`](crate::RingError) if a write lock is already open
    pub fn fill_from<R: io::Read + ?Sized>(&mut self, src: &mut R) -> io::Result<usize> {
        let mut total = 0;

        loop {
            let mut chunk = self.write_chunk().map_err(io::Error::other)?;
            if chunk.is_empty() {
                break;
            }

            match src.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    chunk.commit(n).map_err(io::Error::other)?;
                    total += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        trace!(total, used = self.used(), "filled from source");
        Ok(total)
    }

    /// Send readable bytes to `dst` until the buffer is empty, `dst` accepts
    /// nothing more, or `dst` would block
    ///
    /// # Returns
    /// * `Ok(n)` with the total bytes sent
    /// * `Err(e)` with the first non-retryable error from `dst`, or a wrapped
    ///   [`RingError`](crate::RingError) if a read lock is already open
    pub fn drain_to<W: io::Write + ?Sized>(&mut self, dst: &mut W) -> io::Result<usize> {
        let mut total = 0;

        loop {
            let chunk = self.read_chunk().map_err(io::Error::other)?;
            if chunk.is_empty() {
                break;
            }

            match dst.write(&chunk) {
                Ok(0) => break,
                Ok(n) => {
                    chunk.commit(n).map_err(io::Error::other)?;
                    total += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        trace!(total, used = self.used(), "drained to sink");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    /// Source that hands out at most `step` bytes per call, then would block.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(ErrorKind::WouldBlock.into());
            }
            let n = buf.len().min(self.step).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    /// Sink that accepts at most `limit` bytes in total.
    struct Capped {
        out: Vec<u8>,
        limit: usize,
    }

    impl Write for Capped {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit - self.out.len());
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_io_write_is_partial_when_nearly_full() {
        let mut rb = RingBuffer::new(4).unwrap();
        assert_eq!(Write::write(&mut rb, b"abcdef").unwrap(), 4);
        assert_eq!(Write::write(&mut rb, b"g").unwrap(), 0);

        let err = rb.write_all(b"h").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteZero);
    }

    #[test]
    fn test_io_read_to_end() {
        let mut rb = RingBuffer::new(8).unwrap();
        rb.write_all(b"abc").unwrap();

        let mut out = Vec::new();
        assert_eq!(rb.read_to_end(&mut out).unwrap(), 3);
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_fill_from_wraps_and_stops_when_full() {
        let mut rb = RingBuffer::new(8).unwrap();
        rb.write(b"xxxxx").unwrap();
        rb.eat(5).unwrap();

        let mut src = Trickle {
            data: b"0123456789",
            step: 2,
        };
        assert_eq!(rb.fill_from(&mut src).unwrap(), 8);
        assert!(rb.full());
        assert_eq!(src.data, b"89");

        let mut out = [0u8; 8];
        rb.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"01234567");
    }

    #[test]
    fn test_fill_from_would_block_releases_lock() {
        let mut rb = RingBuffer::new(8).unwrap();
        let mut src = Trickle { data: b"", step: 4 };

        assert_eq!(rb.fill_from(&mut src).unwrap(), 0);
        // The abandoned chunk must not leave the write lock open.
        rb.write(b"ok").unwrap();
    }

    #[test]
    fn test_fill_from_full_on_entry_leaves_source() {
        let mut rb = RingBuffer::new(4).unwrap();
        rb.write(b"abcd").unwrap();
        assert!(rb.full());

        let mut src = Trickle {
            data: b"xyz",
            step: 3,
        };
        assert_eq!(rb.fill_from(&mut src).unwrap(), 0);
        assert_eq!(src.data, b"xyz");
        assert_eq!(rb.as_slices(), (&b"abcd"[..], &b""[..]));

        // The empty grant was released.
        rb.eat(1).unwrap();
        assert_eq!(rb.fill_from(&mut src).unwrap(), 1);
        assert_eq!(src.data, b"yz");
    }

    #[test]
    fn test_drain_to_stops_on_short_sink() {
        let mut rb = RingBuffer::new(8).unwrap();
        rb.write(b"abcdef").unwrap();
        rb.eat(4).unwrap();
        rb.write(b"ghijkl").unwrap();

        let mut sink = Capped {
            out: Vec::new(),
            limit: 5,
        };
        assert_eq!(rb.drain_to(&mut sink).unwrap(), 5);
        assert_eq!(sink.out, b"efghi");
        assert_eq!(rb.used(), 3);
        rb.read_chunk().unwrap().commit(3).unwrap();
    }
}
