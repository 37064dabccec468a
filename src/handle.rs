//! Scoped guards over the lock/commit protocol.
//!
//! Each guard holds the [`RingBuffer`] mutably borrowed for as long as the
//! zero-copy view is alive, so the view cannot outlive its grant and a
//! second guard of any kind cannot be taken at the same time. Dropping a
//! guard without calling `commit` commits zero bytes.

use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::RingBuffer;

/// Writable view returned by [`RingBuffer::write_chunk`]
#[derive(Debug)]
pub struct WriteChunk<'a> {
    ring: &'a mut RingBuffer,
    done: bool,
}

impl<'a> WriteChunk<'a> {
    pub(crate) fn new(ring: &'a mut RingBuffer, len: usize) -> Self {
        debug_assert_eq!(ring.granted_write().len(), len);
        WriteChunk { ring, done: false }
    }

    /// Publish the first `size` bytes of the chunk
    ///
    /// # Arguments
    /// * `size` - Bytes written into the chunk, at most its length
    ///
    /// # Errors
    /// * `CommitSizeInvalid` if `size` exceeds the chunk length; the grant is
    ///   then released without publishing anything
    pub fn commit(mut self, size: usize) -> Result<()> {
        self.ring.write_commit(size)?;
        self.done = true;
        Ok(())
    }

    /// Copy as much of `data` as fits and publish it, returning the count.
    pub fn fill(mut self, data: &[u8]) -> Result<usize> {
        let size = data.len().min(self.len());
        self[..size].copy_from_slice(&data[..size]);
        self.commit(size)?;
        Ok(size)
    }
}

impl Deref for WriteChunk<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.ring.granted_write()
    }
}

impl DerefMut for WriteChunk<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.ring.granted_write_mut()
    }
}

impl Drop for WriteChunk<'_> {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.ring.write_commit(0);
        }
    }
}

/// Read-only view returned by [`RingBuffer::read_chunk`]
#[derive(Debug)]
pub struct ReadChunk<'a> {
    ring: &'a mut RingBuffer,
    done: bool,
}

impl<'a> ReadChunk<'a> {
    pub(crate) fn new(ring: &'a mut RingBuffer, len: usize) -> Self {
        debug_assert_eq!(ring.granted_read().len(), len);
        ReadChunk { ring, done: false }
    }

    /// Drain the first `size` bytes of the chunk
    ///
    /// # Arguments
    /// * `size` - Bytes consumed from the chunk, at most its length
    pub fn commit(mut self, size: usize) -> Result<()> {
        self.ring.read_commit(size)?;
        self.done = true;
        Ok(())
    }
}

impl Deref for ReadChunk<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.ring.granted_read()
    }
}

impl Drop for ReadChunk<'_> {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.ring.read_commit(0);
        }
    }
}

/// Bounded read window returned by [`RingBuffer::window`]
///
/// The window can be re-requested with a different bound through
/// [`resize`](Self::resize) before deciding how much to consume, e.g. while
/// scanning for a record delimiter.
#[derive(Debug)]
pub struct ReadWindow<'a> {
    ring: &'a mut RingBuffer,
    done: bool,
}

impl<'a> ReadWindow<'a> {
    pub(crate) fn new(ring: &'a mut RingBuffer, len: usize) -> Self {
        debug_assert_eq!(ring.granted_read().len(), len);
        ReadWindow { ring, done: false }
    }

    /// Re-request the window capped at `max` bytes.
    pub fn resize(&mut self, max: usize) -> Result<&[u8]> {
        self.ring.window_read_lock_ptr(max)
    }

    /// Consume the first `size` bytes of the window
    ///
    /// # Arguments
    /// * `size` - Bytes consumed from the window, at most its current length
    pub fn commit(mut self, size: usize) -> Result<()> {
        self.ring.window_read_commit(size)?;
        self.done = true;
        Ok(())
    }
}

impl Deref for ReadWindow<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.ring.granted_read()
    }
}

impl Drop for ReadWindow<'_> {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.ring.window_read_commit(0);
        }
    }
}
