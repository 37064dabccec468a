use tracing::{debug, trace, warn};

use crate::error::{LockKind, Result, RingError};
use crate::handle::{ReadChunk, ReadWindow, WriteChunk};

/// Outstanding read-side grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadGrant {
    /// Opened by `read_lock_ptr`
    Plain(usize),
    /// Opened by `window_read_lock_ptr`, may be re-requested before commit
    Window(usize),
}

/// Fixed-capacity circular byte buffer with zero-copy lock/commit access
///
/// - Single producer, single consumer, no internal synchronization
/// - Storage is one contiguous region; the readable bytes may wrap
/// - Producer workflow: `write_lock_size` → `write_lock_ptr` → fill → `write_commit`
/// - Consumer workflow: `read_lock_size` → `read_lock_ptr` → consume → `read_commit`
pub struct RingBuffer {
    /// Owned storage, length == capacity
    storage: Box<[u8]>,
    /// Physical offset of the next byte to read, always < capacity
    read_pos: usize,
    /// Bytes currently held
    used: usize,
    /// Size handed out by the open write lock
    write_grant: Option<usize>,
    /// Size handed out by the open read or window lock
    read_grant: Option<ReadGrant>,
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.storage.len())
            .field("read_pos", &self.read_pos)
            .field("used", &self.used)
            .field("write_grant", &self.write_grant)
            .field("read_grant", &self.read_grant)
            .finish()
    }
}

/// Logs a lock-protocol violation and hands the error back for propagation.
fn violation(err: RingError) -> RingError {
    warn!(error = %err, "ring buffer lock protocol violation");
    err
}

impl RingBuffer {
    /// Create a new ring buffer holding up to `capacity` bytes
    ///
    /// # Returns
    /// * `Ok(RingBuffer)` on success
    /// * `Err(RingError::InvalidCapacity)` if `capacity` is 0
    /// * `Err(RingError::AllocationFailed)` if the storage cannot be reserved
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RingError::InvalidCapacity);
        }

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| RingError::AllocationFailed { capacity })?;
        storage.resize(capacity, 0);

        debug!(capacity, "ring buffer created");

        Ok(RingBuffer {
            storage: storage.into_boxed_slice(),
            read_pos: 0,
            used: 0,
            write_grant: None,
            read_grant: None,
        })
    }

    /// Total capacity in bytes
    pub fn max_size(&self) -> usize {
        self.storage.len()
    }

    /// Same as [`max_size`](Self::max_size)
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes currently readable
    pub fn used(&self) -> usize {
        self.used
    }

    /// Same as [`used`](Self::used)
    pub fn len(&self) -> usize {
        self.used
    }

    /// Free bytes writable before the buffer is full
    pub fn available(&self) -> usize {
        self.capacity() - self.used
    }

    /// True when nothing is readable
    pub fn empty(&self) -> bool {
        self.used == 0
    }

    /// Same as [`empty`](Self::empty)
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// True when nothing more can be written
    pub fn full(&self) -> bool {
        self.used == self.capacity()
    }

    /// Folds a logical offset in `[0, 2 * capacity)` back into storage.
    fn wrap(&self, pos: usize) -> usize {
        let cap = self.capacity();
        if pos >= cap {
            pos - cap
        } else {
            pos
        }
    }

    fn write_pos(&self) -> usize {
        self.wrap(self.read_pos + self.used)
    }

    fn contiguous_writable(&self) -> usize {
        (self.capacity() - self.write_pos()).min(self.available())
    }

    fn contiguous_readable(&self) -> usize {
        (self.capacity() - self.read_pos).min(self.used)
    }

    fn advance_read(&mut self, size: usize) {
        debug_assert!(size <= self.used);
        self.read_pos = self.wrap(self.read_pos + size);
        self.used -= size;
    }

    fn ensure_read_closed(&self) -> Result<()> {
        match self.read_grant {
            None => Ok(()),
            Some(ReadGrant::Plain(_)) => {
                Err(violation(RingError::LockAlreadyOpen(LockKind::Read)))
            }
            Some(ReadGrant::Window(_)) => {
                Err(violation(RingError::LockAlreadyOpen(LockKind::Window)))
            }
        }
    }

    // ---- write path ----

    /// Largest contiguous span writable at the current write offset
    ///
    /// Bounded by the physical end of storage and by [`available`](Self::available),
    /// so after a wrap callers may need a second lock to use all free space.
    /// While a write lock is open this reports the granted size.
    pub fn write_lock_size(&self) -> usize {
        self.write_grant.unwrap_or_else(|| self.contiguous_writable())
    }

    /// Open the write lock and return the writable span
    ///
    /// The slice is exactly [`write_lock_size`](Self::write_lock_size) bytes
    /// long. Finish with [`write_commit`](Self::write_commit).
    ///
    /// # Errors
    /// * `LockAlreadyOpen(Write)` if a write lock is outstanding
    pub fn write_lock_ptr(&mut self) -> Result<&mut [u8]> {
        if self.write_grant.is_some() {
            return Err(violation(RingError::LockAlreadyOpen(LockKind::Write)));
        }

        let size = self.contiguous_writable();
        let start = self.write_pos();
        self.write_grant = Some(size);
        Ok(&mut self.storage[start..start + size])
    }

    /// Publish `size` bytes written through the open lock and close it
    ///
    /// Committing zero bytes abandons the lock. On error the lock stays open
    /// and the cursors are untouched.
    ///
    /// # Arguments
    /// * `size` - Bytes actually written, at most the granted size
    ///
    /// # Errors
    /// * `LockNotOpen(Write)` if no write lock is outstanding
    /// * `CommitSizeInvalid` if `size` exceeds the granted size
    pub fn write_commit(&mut self, size: usize) -> Result<()> {
        let granted = self
            .write_grant
            .ok_or_else(|| violation(RingError::LockNotOpen(LockKind::Write)))?;

        if size > granted {
            return Err(violation(RingError::CommitSizeInvalid {
                kind: LockKind::Write,
                size,
                granted,
            }));
        }

        self.used += size;
        self.write_grant = None;
        trace!(size, used = self.used, "write committed");
        Ok(())
    }

    /// Copy all of `data` in, splitting across the wrap boundary if needed
    ///
    /// Either every byte is written or none is.
    ///
    /// # Errors
    /// * `CapacityExceeded` if `data` is larger than [`available`](Self::available)
    /// * `LockAlreadyOpen(Write)` if a write lock is outstanding
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.write_grant.is_some() {
            return Err(violation(RingError::LockAlreadyOpen(LockKind::Write)));
        }

        let available = self.available();
        if data.len() > available {
            return Err(RingError::CapacityExceeded {
                requested: data.len(),
                available,
            });
        }

        let start = self.write_pos();
        let first = data.len().min(self.capacity() - start);
        let (head, tail) = data.split_at(first);
        self.storage[start..start + first].copy_from_slice(head);
        self.storage[..tail.len()].copy_from_slice(tail);

        self.used += data.len();
        Ok(())
    }

    /// Scoped form of the write lock; see [`WriteChunk`].
    pub fn write_chunk(&mut self) -> Result<WriteChunk<'_>> {
        let len = self.write_lock_ptr()?.len();
        Ok(WriteChunk::new(self, len))
    }

    /// The span granted by the open write lock.
    pub(crate) fn granted_write(&self) -> &[u8] {
        let start = self.write_pos();
        let len = self.write_grant.unwrap_or(0);
        &self.storage[start..start + len]
    }

    pub(crate) fn granted_write_mut(&mut self) -> &mut [u8] {
        let start = self.write_pos();
        let len = self.write_grant.unwrap_or(0);
        &mut self.storage[start..start + len]
    }

    // ---- read path ----

    /// Contiguous bytes readable at the current read offset
    ///
    /// Bounded by the physical end of storage and by [`used`](Self::used).
    /// While a plain read lock is open this reports the granted size.
    pub fn read_lock_size(&self) -> usize {
        match self.read_grant {
            Some(ReadGrant::Plain(granted)) => granted,
            _ => self.contiguous_readable(),
        }
    }

    /// Open the read lock and return the readable span
    ///
    /// # Errors
    /// * `LockAlreadyOpen` if a read or window lock is outstanding
    pub fn read_lock_ptr(&mut self) -> Result<&[u8]> {
        self.ensure_read_closed()?;

        let size = self.contiguous_readable();
        self.read_grant = Some(ReadGrant::Plain(size));
        Ok(&self.storage[self.read_pos..self.read_pos + size])
    }

    /// Drain `size` bytes consumed through the open read lock and close it
    ///
    /// On error the lock stays open and the cursors are untouched.
    ///
    /// # Arguments
    /// * `size` - Bytes actually consumed, at most the granted size
    ///
    /// # Errors
    /// * `LockNotOpen(Read)` if no plain read lock is outstanding
    /// * `CommitSizeInvalid` if `size` exceeds the granted size
    pub fn read_commit(&mut self, size: usize) -> Result<()> {
        let granted = match self.read_grant {
            Some(ReadGrant::Plain(granted)) => granted,
            _ => return Err(violation(RingError::LockNotOpen(LockKind::Read))),
        };

        if size > granted {
            return Err(violation(RingError::CommitSizeInvalid {
                kind: LockKind::Read,
                size,
                granted,
            }));
        }

        self.advance_read(size);
        self.read_grant = None;
        trace!(size, used = self.used, "read committed");
        Ok(())
    }

    /// Peek up to `buf.len()` bytes without consuming them
    ///
    /// Returns the number of bytes copied, `min(buf.len(), used())`.
    pub fn copy(&self, buf: &mut [u8]) -> usize {
        let size = buf.len().min(self.used);
        let first = size.min(self.capacity() - self.read_pos);

        buf[..first].copy_from_slice(&self.storage[self.read_pos..self.read_pos + first]);
        buf[first..size].copy_from_slice(&self.storage[..size - first]);
        size
    }

    /// Copy up to `buf.len()` bytes out and consume them
    ///
    /// # Errors
    /// * `LockAlreadyOpen` if a read or window lock is outstanding
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_read_closed()?;

        let size = self.copy(buf);
        self.advance_read(size);
        Ok(size)
    }

    /// Fill all of `buf` or consume nothing
    ///
    /// # Errors
    /// * `InsufficientData` if fewer than `buf.len()` bytes are readable
    /// * `LockAlreadyOpen` if a read or window lock is outstanding
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure_read_closed()?;

        if buf.len() > self.used {
            return Err(RingError::InsufficientData {
                requested: buf.len(),
                used: self.used,
            });
        }

        let size = self.copy(buf);
        self.advance_read(size);
        Ok(())
    }

    /// Discard up to `size` leading bytes, returning how many were dropped
    pub fn eat(&mut self, size: usize) -> Result<usize> {
        self.ensure_read_closed()?;

        let size = size.min(self.used);
        self.advance_read(size);
        Ok(size)
    }

    /// Discard everything readable
    pub fn eat_all(&mut self) -> Result<usize> {
        self.eat(self.used)
    }

    /// Scoped form of the read lock; see [`ReadChunk`].
    pub fn read_chunk(&mut self) -> Result<ReadChunk<'_>> {
        let len = self.read_lock_ptr()?.len();
        Ok(ReadChunk::new(self, len))
    }

    /// Readable bytes in order; the second slice is the part past the wrap.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        let first = self.contiguous_readable();
        let head = &self.storage[self.read_pos..self.read_pos + first];
        let tail = &self.storage[..self.used - first];
        (head, tail)
    }

    /// The span granted by the open read or window lock.
    pub(crate) fn granted_read(&self) -> &[u8] {
        let len = match self.read_grant {
            Some(ReadGrant::Plain(granted)) | Some(ReadGrant::Window(granted)) => granted,
            None => 0,
        };
        &self.storage[self.read_pos..self.read_pos + len]
    }

    // ---- windowed read ----

    /// Contiguous readable bytes capped at `max`
    ///
    /// Never spans the wrap boundary; a window that would straddle it is cut
    /// at the end of storage.
    pub fn window_read_lock_size(&self, max: usize) -> usize {
        self.contiguous_readable().min(max)
    }

    /// Open (or re-open with a new bound) the window lock
    ///
    /// Unlike [`read_lock_ptr`](Self::read_lock_ptr) this may be called again
    /// before committing; the newer grant replaces the older one.
    ///
    /// # Arguments
    /// * `max` - Upper bound on the window; the wrap boundary may cut it shorter
    ///
    /// # Errors
    /// * `LockAlreadyOpen(Read)` if a plain read lock is outstanding
    pub fn window_read_lock_ptr(&mut self, max: usize) -> Result<&[u8]> {
        if let Some(ReadGrant::Plain(_)) = self.read_grant {
            return Err(violation(RingError::LockAlreadyOpen(LockKind::Read)));
        }

        let size = self.window_read_lock_size(max);
        self.read_grant = Some(ReadGrant::Window(size));
        Ok(&self.storage[self.read_pos..self.read_pos + size])
    }

    /// Consume `size` bytes of the open window and close it
    ///
    /// # Arguments
    /// * `size` - Bytes to consume, at most the current window length
    ///
    /// # Errors
    /// * `LockNotOpen(Window)` if no window lock is outstanding
    /// * `CommitSizeInvalid` if `size` exceeds the current window
    pub fn window_read_commit(&mut self, size: usize) -> Result<()> {
        let granted = match self.read_grant {
            Some(ReadGrant::Window(granted)) => granted,
            _ => return Err(violation(RingError::LockNotOpen(LockKind::Window))),
        };

        if size > granted {
            return Err(violation(RingError::CommitSizeInvalid {
                kind: LockKind::Window,
                size,
                granted,
            }));
        }

        self.advance_read(size);
        self.read_grant = None;
        trace!(size, used = self.used, "window committed");
        Ok(())
    }

    /// Scoped form of the window lock; see [`ReadWindow`].
    pub fn window(&mut self, max: usize) -> Result<ReadWindow<'_>> {
        let len = self.window_read_lock_ptr(max)?.len();
        Ok(ReadWindow::new(self, len))
    }
}
