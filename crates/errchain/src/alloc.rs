//! Allocator hooks.
//!
//! Every heap node and owned message buffer the library creates is first
//! requested from an [`Allocator`], and handed back to the same allocator when
//! the node is destroyed. Embedders use this to route error bookkeeping into a
//! tracked pool, to cap how much memory error reporting may use, or to inject
//! allocation failures in tests.
//!
//! An [`Allocator`] is an accounting and policy hook: it decides whether an
//! allocation may happen and keeps count. The memory itself still comes from
//! the global allocator through `Box` and `String`, so placing error values in
//! an arena means installing that arena as the `#[global_allocator]`.

use crate::value::Node;
use derive_getters::Getters;
use errchain_error::{AllocError, AllocErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A single allocation the library is about to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Allocation {
    /// One error node
    Node,
    /// A message buffer of `capacity` bytes
    Message {
        /// Buffer capacity in bytes
        capacity: usize,
    },
}

impl Allocation {
    /// Number of bytes this allocation occupies.
    pub fn size(&self) -> usize {
        match self {
            Allocation::Node => std::mem::size_of::<Node<'static>>(),
            Allocation::Message { capacity } => *capacity,
        }
    }
}

/// Grants and takes back the memory used by error values.
///
/// Granting is bookkeeping only; the bytes come from the global allocator.
///
/// Implementations must be `Sync`: the shared sentinels are process-wide
/// statics, and nodes keep a reference to the allocator that granted them.
pub trait Allocator: Sync {
    /// Grant or refuse `request`.
    ///
    /// # Errors
    ///
    /// A refusal makes the constructor that asked return the out-of-memory
    /// sentinel.
    fn allocate(&self, request: Allocation) -> Result<(), AllocError>;

    /// Take back a previously granted `request`.
    fn release(&self, request: Allocation);
}

/// The platform allocator. Grants every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, _request: Allocation) -> Result<(), AllocError> {
        Ok(())
    }

    fn release(&self, _request: Allocation) {}
}

static SYSTEM: SystemAllocator = SystemAllocator;

/// The process-wide default allocator.
pub fn system() -> &'static dyn Allocator {
    &SYSTEM
}

/// Snapshot of a [`TrackingAllocator`]'s counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct AllocStats {
    /// Allocations granted and not yet released
    live: usize,
    /// Bytes granted and not yet released
    live_bytes: usize,
    /// Allocations granted since creation
    allocated: usize,
    /// Allocations released since creation
    released: usize,
    /// Requests refused since creation
    refused: usize,
}

/// Allocator that keeps count of everything it grants.
///
/// Optionally enforces a byte limit, and can be told to grant only a fixed
/// number of requests before refusing the rest, which is how tests simulate
/// allocation failure at a specific step.
///
/// # Example
///
/// ```
/// use errchain::{Factory, TrackingAllocator};
///
/// let pool = TrackingAllocator::new();
/// let factory = Factory::new(&pool);
///
/// let err = factory.copied("disk full");
/// assert_eq!(*pool.stats().live(), 2); // node + message buffer
///
/// err.destroy();
/// assert_eq!(*pool.stats().live(), 0);
/// ```
#[derive(Debug, Default)]
pub struct TrackingAllocator {
    limit_bytes: Option<usize>,
    grants_left: Option<AtomicUsize>,
    live: AtomicUsize,
    live_bytes: AtomicUsize,
    allocated: AtomicUsize,
    released: AtomicUsize,
    refused: AtomicUsize,
}

impl TrackingAllocator {
    /// Unlimited tracking allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracking allocator that refuses requests once `limit_bytes` would be exceeded.
    pub fn with_limit(limit_bytes: usize) -> Self {
        Self {
            limit_bytes: Some(limit_bytes),
            ..Self::default()
        }
    }

    /// Tracking allocator that grants `grants` requests and refuses every one after.
    pub fn failing_after(grants: usize) -> Self {
        Self {
            grants_left: Some(AtomicUsize::new(grants)),
            ..Self::default()
        }
    }

    /// Configured byte limit, if any.
    pub fn limit_bytes(&self) -> Option<usize> {
        self.limit_bytes
    }

    /// Current counters.
    pub fn stats(&self) -> AllocStats {
        AllocStats {
            live: self.live.load(Ordering::Relaxed),
            live_bytes: self.live_bytes.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            refused: self.refused.load(Ordering::Relaxed),
        }
    }

    fn refuse(&self, kind: AllocErrorKind) -> Result<(), AllocError> {
        self.refused.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(reason = %kind, "Tracking allocator refused request");
        Err(AllocError::new(kind))
    }
}

impl Allocator for TrackingAllocator {
    fn allocate(&self, request: Allocation) -> Result<(), AllocError> {
        let size = request.size();

        if let Some(grants_left) = &self.grants_left
            && grants_left
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
                .is_err()
        {
            return self.refuse(AllocErrorKind::Refused(size));
        }

        if let Some(limit) = self.limit_bytes {
            let in_use = self.live_bytes.load(Ordering::Relaxed);
            if in_use.saturating_add(size) > limit {
                return self.refuse(AllocErrorKind::LimitExceeded {
                    requested: size,
                    in_use,
                    limit,
                });
            }
        }

        self.live.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_add(size, Ordering::Relaxed);
        self.allocated.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn release(&self, request: Allocation) {
        self.live.fetch_sub(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(request.size(), Ordering::Relaxed);
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}
