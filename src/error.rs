//! Error types for zcrb.
use core::fmt;

use thiserror::Error;

/// Which side of the lock/commit protocol an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    /// The zero-copy write window.
    Write,
    /// The plain zero-copy read window.
    Read,
    /// The bounded, re-requestable read window.
    Window,
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Write => "write",
            Self::Read => "read",
            Self::Window => "window read",
        };
        f.write_str(name)
    }
}

/// Errors reported by [`RingBuffer`](crate::RingBuffer) operations.
///
/// None of these are transient: the buffer never retries internally. The
/// lock-protocol variants (`LockAlreadyOpen`, `LockNotOpen`,
/// `CommitSizeInvalid`) are programming errors in the caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// Zero-size buffer requested.
    #[error("ring buffer capacity must be non-zero")]
    InvalidCapacity,

    /// The storage region could not be allocated.
    #[error("failed to allocate {capacity} bytes of ring storage")]
    AllocationFailed {
        /// Requested capacity in bytes.
        capacity: usize,
    },

    /// A write would exceed the free space.
    #[error("write of {requested} bytes exceeds {available} available")]
    CapacityExceeded {
        /// Bytes the caller tried to write.
        requested: usize,
        /// Free bytes at the time of the call.
        available: usize,
    },

    /// An all-or-nothing read asked for more than the buffer holds.
    #[error("read of {requested} bytes exceeds {used} readable")]
    InsufficientData {
        /// Bytes the caller asked for.
        requested: usize,
        /// Readable bytes at the time of the call.
        used: usize,
    },

    /// A second lock of the same kind was requested before committing the first.
    #[error("{0} lock is already open")]
    LockAlreadyOpen(LockKind),

    /// A commit was issued with no matching lock outstanding.
    #[error("no {0} lock is open")]
    LockNotOpen(LockKind),

    /// A commit exceeded the size granted by the outstanding lock.
    #[error("{kind} commit of {size} bytes exceeds granted {granted}")]
    CommitSizeInvalid {
        /// Lock being committed.
        kind: LockKind,
        /// Size passed to the commit.
        size: usize,
        /// Size handed out by the lock.
        granted: usize,
    },
}

impl RingError {
    /// Returns true for lock/commit protocol misuse, as opposed to capacity
    /// or data-availability conditions.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::LockAlreadyOpen(_) | Self::LockNotOpen(_) | Self::CommitSizeInvalid { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, RingError>;
