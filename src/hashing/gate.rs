//! Read serialization across worker threads.
//!
//! # Overview
//!
//! On rotating storage, several threads issuing random-offset reads at once
//! make the disk head jump between files and throughput collapses. The
//! [`IoGate`] serializes only the physical read call. Seeking, opening and,
//! most importantly, hashing all happen outside the lock, so one thread's
//! digest update overlaps the next thread's queued read.
//!
//! Fingerprint reads and full-hash reads use two independent locks: a
//! fingerprint of one file never waits on a block read of another.
//!
//! Serialization can be switched off at runtime for solid-state storage,
//! where concurrent reads are cheap.
//!
//! # Example
//!
//! ```
//! use dupeprint::hashing::{IoGate, ReadGate, ReadPhase};
//! use std::sync::Arc;
//!
//! let gate = Arc::new(IoGate::new());
//! let n = gate.read(ReadPhase::Fingerprint, || 42);
//! assert_eq!(n, 42);
//! ```

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The processing phase a read belongs to. Each phase has its own lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadPhase {
    /// Head, middle and tail sample reads.
    Fingerprint,
    /// Block reads of the full-content hasher.
    FullHash,
}

impl fmt::Display for ReadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fingerprint => write!(f, "fingerprint"),
            Self::FullHash => write!(f, "fullhash"),
        }
    }
}

/// Wraps every physical read issued by the sampler and the content hasher.
///
/// Implementors must run `op` exactly once and return its result. The
/// production implementation is [`IoGate`]; tests substitute gates that count
/// in-flight reads.
pub trait ReadGate: Send + Sync {
    /// Run one physical read inside the critical section for `phase`.
    fn read<T>(&self, phase: ReadPhase, op: impl FnOnce() -> T) -> T;
}

/// Two independent phase locks with a runtime on/off switch.
///
/// Created once at startup and shared by `Arc` handle across all workers.
pub struct IoGate {
    fingerprint: Mutex<()>,
    full_hash: Mutex<()>,
    serialize: bool,
}

impl IoGate {
    /// Create a gate that serializes reads within each phase.
    #[must_use]
    pub fn new() -> Self {
        Self::with_serialization(true)
    }

    /// Create a gate that lets all reads proceed concurrently.
    #[must_use]
    pub fn unserialized() -> Self {
        Self::with_serialization(false)
    }

    /// Create a gate with serialization explicitly on or off.
    #[must_use]
    pub fn with_serialization(serialize: bool) -> Self {
        Self {
            fingerprint: Mutex::new(()),
            full_hash: Mutex::new(()),
            serialize,
        }
    }

    /// Whether reads within a phase are serialized.
    #[must_use]
    pub fn is_serialized(&self) -> bool {
        self.serialize
    }

    /// Acquire the lock for `phase`. Dropping the guard releases it.
    ///
    /// When serialization is off the guard holds nothing.
    pub fn acquire(&self, phase: ReadPhase) -> GateGuard<'_> {
        if !self.serialize {
            return GateGuard { guard: None };
        }

        let lock = match phase {
            ReadPhase::Fingerprint => &self.fingerprint,
            ReadPhase::FullHash => &self.full_hash,
        };
        // Guards no data; poisoning is ignored.
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        GateGuard { guard: Some(guard) }
    }
}

impl Default for IoGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IoGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoGate")
            .field("serialize", &self.serialize)
            .finish()
    }
}

impl ReadGate for IoGate {
    fn read<T>(&self, phase: ReadPhase, op: impl FnOnce() -> T) -> T {
        let guard = self.acquire(phase);
        let result = op();
        guard.release();
        result
    }
}

/// Held phase lock. Released on drop.
#[must_use = "the phase lock is released as soon as the guard is dropped"]
pub struct GateGuard<'a> {
    guard: Option<MutexGuard<'a, ()>>,
}

impl GateGuard<'_> {
    /// Whether this guard actually holds a lock.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.guard.is_some()
    }

    /// Release the lock explicitly.
    pub fn release(self) {
        drop(self);
    }
}
