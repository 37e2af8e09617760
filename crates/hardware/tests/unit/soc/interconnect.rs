//! Physical address space router tests.
//!
//! Covers range registration (overlap and empty-range rejection), dispatch
//! with backend-relative offsets, unmapped behaviour, owned versus borrowed
//! removal, and the external change notification path.

use std::sync::{Arc, Mutex};

use mipsim_core::common::{Address, AddressSpaceError};
use mipsim_core::soc::devices::{Backend, SpiLed};
use mipsim_core::soc::interconnect::RangeBackend;
use mipsim_core::soc::memory::Memory;
use mipsim_core::soc::traits::LocationStatus;
use mipsim_core::soc::{MemoryAccess, PhysAddrSpace};
use proptest::prelude::*;

fn a(v: u64) -> Address {
    Address::new(v)
}

fn with_backend<R>(handle: &Arc<Mutex<Backend>>, f: impl FnOnce(&mut Backend) -> R) -> R {
    f(&mut handle.lock().unwrap())
}

// ══════════════════════════════════════════════════════════
// Registration
// ══════════════════════════════════════════════════════════

#[test]
fn overlapping_range_is_rejected_without_side_effects() {
    let mut bus = PhysAddrSpace::new();
    let _ = bus.insert_owned(Memory::new(), a(0x1000), a(0x1fff)).unwrap();
    assert_eq!(
        bus.insert_owned(Memory::new(), a(0x1800), a(0x27ff)),
        Err(AddressSpaceError::Overlap {
            start: a(0x1800),
            last: a(0x27ff),
        })
    );
    assert!(bus.insert_owned(Memory::new(), a(0x0), a(0x1000)).is_err());
    assert_eq!(bus.range_count(), 1);

    // Adjacent ranges are fine.
    assert!(bus.insert_owned(Memory::new(), a(0x2000), a(0x2fff)).is_ok());
    assert!(bus.insert_owned(Memory::new(), a(0x0), a(0xfff)).is_ok());
    let starts: Vec<u64> = bus.ranges().map(|(_, start, _)| start.val()).collect();
    assert_eq!(starts, vec![0x0, 0x1000, 0x2000]);
}

#[test]
fn empty_range_is_rejected() {
    let mut bus = PhysAddrSpace::new();
    assert!(matches!(
        bus.insert_owned(Memory::new(), a(0x10), a(0xf)),
        Err(AddressSpaceError::InvalidRange { .. })
    ));
}

#[test]
fn single_byte_range() {
    let mut bus = PhysAddrSpace::new();
    let id = bus.insert_owned(Memory::new(), a(0x40), a(0x40)).unwrap();
    assert_eq!(bus.backend_at(a(0x40)), Some(id));
    assert_eq!(bus.backend_at(a(0x41)), None);
}

// ══════════════════════════════════════════════════════════
// Dispatch
// ══════════════════════════════════════════════════════════

#[test]
fn accesses_reach_backend_at_relative_offset() {
    let mut bus = PhysAddrSpace::new();
    let low = Backend::from(Memory::new()).shared();
    let high = Backend::from(Memory::new()).shared();
    let _ = bus.insert_shared(&low, a(0x0), a(0xffff)).unwrap();
    let _ = bus.insert_shared(&high, a(0x1_0000), a(0x1_ffff)).unwrap();

    assert!(bus.write_word(a(0x1_0008), 0x55));
    assert_eq!(with_backend(&high, |b| b.read_word(a(0x8), false)), 0x55);
    assert_eq!(with_backend(&low, |b| b.read_word(a(0x8), false)), 0);
    assert_eq!(bus.read_word(a(0x1_0008), false), 0x55);
    assert_eq!(bus.change_counter(), 1);
}

#[test]
fn unmapped_addresses_read_zero_and_drop_writes() {
    let mut bus = PhysAddrSpace::new();
    let _ = bus.insert_owned(Memory::new(), a(0x0), a(0xfff)).unwrap();
    assert_eq!(bus.read_word(a(0x2000), false), 0);
    assert!(!bus.write_word(a(0x2000), 1));
    assert_eq!(bus.location_status(a(0x2000)), LocationStatus::Illegal);
    assert_eq!(bus.location_status(a(0x0)), LocationStatus::None);
    assert_eq!(bus.change_counter(), 0);
}

#[test]
fn device_status_is_translated() {
    let mut bus = PhysAddrSpace::new();
    let _ = bus.insert_owned(SpiLed::new(), a(0x100), a(0x1ff)).unwrap();
    assert_eq!(bus.location_status(a(0x124)), LocationStatus::ReadOnly);
    assert_eq!(bus.location_status(a(0x104)), LocationStatus::None);
    assert_eq!(bus.location_status(a(0x1f0)), LocationStatus::Illegal);
}

// ══════════════════════════════════════════════════════════
// Removal
// ══════════════════════════════════════════════════════════

#[test]
fn removing_owned_range_unmaps_it() {
    let mut bus = PhysAddrSpace::new();
    let id = bus.insert_owned(Memory::new(), a(0x0), a(0xfff)).unwrap();
    let _ = bus.write_word(a(0x10), 9);
    assert!(bus.remove_range(id));
    assert!(!bus.remove_range(id));
    assert_eq!(bus.read_word(a(0x10), false), 0);
    assert_eq!(bus.range_count(), 0);
}

#[test]
fn removing_borrowed_range_keeps_backend_alive() {
    let mut bus = PhysAddrSpace::new();
    let ram = Backend::from(Memory::new()).shared();
    let id = bus.insert_shared(&ram, a(0x0), a(0xfff)).unwrap();
    let _ = bus.write_word(a(0x10), 9);
    assert_eq!(Arc::strong_count(&ram), 2);

    assert!(bus.remove_range(id));
    assert_eq!(Arc::strong_count(&ram), 1);
    assert_eq!(with_backend(&ram, |b| b.read_word(a(0x10), false)), 9);
}

#[test]
fn clean_range_removes_ranges_starting_inside() {
    let mut bus = PhysAddrSpace::new();
    let _ = bus.insert_owned(Memory::new(), a(0x0), a(0xfff)).unwrap();
    let _ = bus.insert_owned(Memory::new(), a(0x1000), a(0x1fff)).unwrap();
    let kept = bus.insert_owned(Memory::new(), a(0x2000), a(0x2fff)).unwrap();
    bus.clean_range(a(0x0), a(0x1fff));
    let ids: Vec<_> = bus.ranges().map(|(id, _, _)| id).collect();
    assert_eq!(ids, vec![kept]);
}

// ══════════════════════════════════════════════════════════
// External changes
// ══════════════════════════════════════════════════════════

#[test]
fn host_changes_reach_subscribers_with_absolute_addresses() {
    let mut bus = PhysAddrSpace::new();
    let led = Backend::from(SpiLed::new()).shared();
    let _ = bus.insert_shared(&led, a(0xffff_c100), a(0xffff_c1ff)).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe(Box::new(move |start, last| {
        sink.lock().unwrap().push((start.val(), last.val()));
    }));

    with_backend(&led, |b| match b {
        Backend::SpiLed(dev) => dev.red_knob_update(0x40),
        _ => unreachable!(),
    });
    assert_eq!(bus.poll_external_changes(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![(0xffff_c124, 0xffff_c127)]);
    assert_eq!(bus.change_counter(), 1);

    // Drained: nothing new on the next poll.
    assert_eq!(bus.poll_external_changes(), 0);
}

proptest! {
    #[test]
    fn second_range_is_accepted_iff_disjoint(
        s1 in 0u64..0x1000, len1 in 0u64..0x100,
        s2 in 0u64..0x1000, len2 in 0u64..0x100,
    ) {
        let (l1, l2) = (s1 + len1, s2 + len2);
        let mut bus = PhysAddrSpace::new();
        let first = bus.insert_owned(Memory::new(), a(s1), a(l1)).unwrap();
        let disjoint = l1 < s2 || l2 < s1;
        let second = bus.insert_owned(Memory::new(), a(s2), a(l2));
        prop_assert_eq!(second.is_ok(), disjoint);
        prop_assert_eq!(bus.backend_at(a(s1)), Some(first));
        prop_assert_eq!(bus.backend_at(a(l1)), Some(first));
        if let Ok(id) = second {
            prop_assert_eq!(bus.backend_at(a(s2)), Some(id));
            prop_assert_eq!(bus.range_count(), 2);
        } else {
            prop_assert_eq!(bus.range_count(), 1);
        }
    }
}

#[test]
fn owned_variant_is_constructible_directly() {
    let mut bus = PhysAddrSpace::new();
    let backend = RangeBackend::Owned(Box::new(Backend::from(Memory::new())));
    let id = bus.insert_range(backend, a(0x0), a(0xff)).unwrap();
    assert_eq!(bus.backend_at(a(0x80)), Some(id));
}
