//! Physical address space router.
//!
//! This module implements the bus that routes physical addresses to backends. It provides:
//! 1. **Registration:** Non-overlapping `[start, last]` ranges mapped to owned or borrowed backends.
//! 2. **Access routing:** Lookup by range end address; unmapped reads return zero and
//!    unmapped writes are dropped.
//! 3. **Change tracking:** A monotonic change counter plus subscriber callbacks for changes
//!    backends make outside core-initiated writes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::PoisonError;

use tracing::{debug, warn};

use crate::common::{Address, AddressSpaceError};
use crate::soc::devices::{Backend, SharedBackend};
use crate::soc::traits::{LocationStatus, MemoryAccess};

/// Ownership of a mapped backend.
pub enum RangeBackend {
    /// The router owns the backend and drops it when the range is removed.
    Owned(Box<Backend>),
    /// The host keeps a handle; removing the range leaves the backend alive.
    Borrowed(SharedBackend),
}

impl RangeBackend {
    /// Runs `f` with exclusive access to the backend.
    fn with<R>(&mut self, f: impl FnOnce(&mut Backend) -> R) -> R {
        match self {
            Self::Owned(backend) => f(backend),
            Self::Borrowed(handle) => {
                let mut guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
                f(&mut guard)
            }
        }
    }

    fn status(&self, offset: Address) -> LocationStatus {
        match self {
            Self::Owned(backend) => backend.location_status(offset),
            Self::Borrowed(handle) => handle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .location_status(offset),
        }
    }
}

impl fmt::Debug for RangeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owned(b) => write!(f, "Owned({})", b.name()),
            Self::Borrowed(_) => f.write_str("Borrowed"),
        }
    }
}

/// Identifier returned by [`PhysAddrSpace::insert_range`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(u64);

/// One registered range.
#[derive(Debug)]
struct RangeDesc {
    id: BackendId,
    start: u64,
    last: u64,
    backend: RangeBackend,
}

/// Callback receiving the absolute `[start, last]` range of an external change.
pub type ChangeCallback = Box<dyn FnMut(Address, Address) + Send>;

/// Physical address space router.
#[derive(Default)]
pub struct PhysAddrSpace {
    /// Ranges keyed by their last address.
    ranges: BTreeMap<u64, RangeDesc>,
    /// Last address of each registered backend.
    by_id: HashMap<BackendId, u64>,
    next_id: u64,
    change_counter: u64,
    subscribers: Vec<ChangeCallback>,
}

impl PhysAddrSpace {
    /// Creates an empty address space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a backend at `[start, last]`.
    ///
    /// # Arguments
    ///
    /// * `backend` - The backend and its ownership mode.
    /// * `start` - First mapped address.
    /// * `last` - Last mapped address (inclusive).
    ///
    /// # Returns
    ///
    /// The new range's id, or an error if the range is empty or overlaps an existing
    /// range. On error the registry is unchanged.
    pub fn insert_range(
        &mut self,
        backend: RangeBackend,
        start: Address,
        last: Address,
    ) -> Result<BackendId, AddressSpaceError> {
        if last < start {
            return Err(AddressSpaceError::InvalidRange { start, last });
        }
        if let Some((_, existing)) = self.ranges.range(start.val()..).next() {
            if existing.start <= last.val() {
                warn!(%start, %last, existing_start = existing.start, "rejecting overlapping range");
                return Err(AddressSpaceError::Overlap { start, last });
            }
        }
        let id = BackendId(self.next_id);
        self.next_id += 1;
        debug!(%start, %last, backend = ?backend, "mapping range");
        let _ = self.ranges.insert(
            last.val(),
            RangeDesc {
                id,
                start: start.val(),
                last: last.val(),
                backend,
            },
        );
        let _ = self.by_id.insert(id, last.val());
        Ok(id)
    }

    /// Maps a backend owned by the router.
    pub fn insert_owned(
        &mut self,
        backend: impl Into<Backend>,
        start: Address,
        last: Address,
    ) -> Result<BackendId, AddressSpaceError> {
        self.insert_range(RangeBackend::Owned(Box::new(backend.into())), start, last)
    }

    /// Maps a backend the host keeps a handle to.
    pub fn insert_shared(
        &mut self,
        backend: &SharedBackend,
        start: Address,
        last: Address,
    ) -> Result<BackendId, AddressSpaceError> {
        self.insert_range(RangeBackend::Borrowed(backend.clone()), start, last)
    }

    /// Unmaps a backend.
    ///
    /// # Returns
    ///
    /// `false` if `id` is not registered. Owned backends are dropped.
    pub fn remove_range(&mut self, id: BackendId) -> bool {
        let Some(last) = self.by_id.remove(&id) else {
            return false;
        };
        self.ranges.remove(&last).is_some()
    }

    /// Removes every range whose start lies within `[start, last]`.
    pub fn clean_range(&mut self, start: Address, last: Address) {
        let doomed: Vec<(BackendId, u64)> = self
            .ranges
            .values()
            .filter(|r| (start.val()..=last.val()).contains(&r.start))
            .map(|r| (r.id, r.last))
            .collect();
        for (id, key) in doomed {
            let _ = self.by_id.remove(&id);
            let _ = self.ranges.remove(&key);
        }
    }

    /// Number of registered ranges.
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Registered ranges as `(id, start, last)` in address order.
    pub fn ranges(&self) -> impl Iterator<Item = (BackendId, Address, Address)> + '_ {
        self.ranges
            .values()
            .map(|r| (r.id, Address::new(r.start), Address::new(r.last)))
    }

    /// Monotonic count of content changes and external notifications.
    pub const fn change_counter(&self) -> u64 {
        self.change_counter
    }

    /// Registers a callback for external changes.
    pub fn subscribe(&mut self, callback: ChangeCallback) {
        self.subscribers.push(callback);
    }

    /// Collects changes backends made outside core-initiated writes.
    ///
    /// Each change bumps the change counter and is forwarded to subscribers with
    /// absolute addresses.
    ///
    /// # Returns
    ///
    /// The number of changes seen.
    pub fn poll_external_changes(&mut self) -> usize {
        let mut seen = Vec::new();
        for desc in self.ranges.values_mut() {
            let base = desc.start;
            for change in desc.backend.with(Backend::take_external_changes) {
                seen.push((
                    Address::new(base.wrapping_add(change.start)),
                    Address::new(base.wrapping_add(change.last)),
                ));
            }
        }
        self.change_counter += seen.len() as u64;
        for &(start, last) in &seen {
            for callback in &mut self.subscribers {
                callback(start, last);
            }
        }
        seen.len()
    }

    /// Finds the range containing `addr`.
    fn find_mut(&mut self, addr: Address) -> Option<&mut RangeDesc> {
        self.ranges
            .range_mut(addr.val()..)
            .next()
            .map(|(_, desc)| desc)
            .filter(|desc| desc.start <= addr.val())
    }

    fn find(&self, addr: Address) -> Option<&RangeDesc> {
        self.ranges
            .range(addr.val()..)
            .next()
            .map(|(_, desc)| desc)
            .filter(|desc| desc.start <= addr.val())
    }

    /// Id of the backend mapped at `addr`.
    pub fn backend_at(&self, addr: Address) -> Option<BackendId> {
        self.find(addr).map(|desc| desc.id)
    }
}

impl MemoryAccess for PhysAddrSpace {
    fn read_word(&mut self, addr: Address, debug: bool) -> u32 {
        match self.find_mut(addr) {
            Some(desc) => {
                let offset = Address::new(addr.val() - desc.start);
                desc.backend.with(|b| b.read_word(offset, debug))
            }
            None => 0,
        }
    }

    fn write_word(&mut self, addr: Address, value: u32) -> bool {
        let changed = match self.find_mut(addr) {
            Some(desc) => {
                let offset = Address::new(addr.val() - desc.start);
                desc.backend.with(|b| b.write_word(offset, value))
            }
            None => false,
        };
        if changed {
            self.change_counter += 1;
        }
        changed
    }

    fn location_status(&self, addr: Address) -> LocationStatus {
        self.find(addr).map_or(LocationStatus::Illegal, |desc| {
            desc.backend.status(Address::new(addr.val() - desc.start))
        })
    }
}

impl fmt::Debug for PhysAddrSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysAddrSpace")
            .field("ranges", &self.ranges)
            .field("change_counter", &self.change_counter)
            .finish_non_exhaustive()
    }
}
