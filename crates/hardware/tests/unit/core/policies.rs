//! Replacement policy victim selection.

use mipsim_core::core::units::cache::policies::{
    LfuPolicy, LruPolicy, RandomPolicy, ReplacementPolicy,
};
use proptest::prelude::*;

#[test]
fn lru_prefers_untouched_way() {
    let mut p = LruPolicy::new(2, 4);
    p.update(1, 0);
    p.update(1, 1);
    assert_eq!(p.get_victim(1), 2);
    // Other sets are independent.
    assert_eq!(p.get_victim(0), 0);
}

#[test]
fn lru_picks_oldest_stamp() {
    let mut p = LruPolicy::new(1, 3);
    for way in [0, 1, 2, 0, 2] {
        p.update(0, way);
    }
    assert_eq!(p.get_victim(0), 1);
}

#[test]
fn lru_invalidated_way_is_chosen_first() {
    let mut p = LruPolicy::new(1, 2);
    p.update(0, 0);
    p.update(0, 1);
    p.update(0, 0);
    p.invalidate(0, 0);
    assert_eq!(p.get_victim(0), 0);
}

#[test]
fn lfu_picks_lowest_count_and_first_on_ties() {
    let mut p = LfuPolicy::new(1, 3);
    for way in [0, 0, 1, 2, 2] {
        p.update(0, way);
    }
    assert_eq!(p.get_victim(0), 1);
    p.update(0, 1);
    assert_eq!(p.get_victim(0), 0);
}

#[test]
fn reset_forgets_history() {
    let mut p = LfuPolicy::new(1, 2);
    p.update(0, 0);
    p.update(0, 1);
    p.update(0, 1);
    p.reset();
    assert_eq!(p.get_victim(0), 0);
}

#[test]
fn random_sequence_repeats_after_reset() {
    let mut p = RandomPolicy::new(1, 4);
    let first: Vec<usize> = (0..16).map(|_| p.get_victim(0)).collect();
    p.reset();
    let again: Vec<usize> = (0..16).map(|_| p.get_victim(0)).collect();
    assert_eq!(first, again);
    assert!(first.iter().any(|&w| w != first[0]));
}

proptest! {
    #[test]
    fn victims_are_in_range(ways in 1usize..16, picks in 1usize..64) {
        let mut random = RandomPolicy::new(4, ways);
        let mut lru = LruPolicy::new(4, ways);
        let mut lfu = LfuPolicy::new(4, ways);
        for i in 0..picks {
            let set = i % 4;
            let way = random.get_victim(set);
            prop_assert!(way < ways);
            lru.update(set, way);
            lfu.update(set, way);
            prop_assert!(lru.get_victim(set) < ways);
            prop_assert!(lfu.get_victim(set) < ways);
        }
    }
}

#[test]
fn policies_render_with_debug() {
    assert!(format!("{:?}", LruPolicy::new(2, 2)).starts_with("LruPolicy"));
    assert!(format!("{:?}", LfuPolicy::new(2, 2)).starts_with("LfuPolicy"));
    assert!(format!("{:?}", RandomPolicy::new(2, 2)).starts_with("RandomPolicy"));
}
