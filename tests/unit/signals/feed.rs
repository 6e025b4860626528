//! Unit tests for new-entry detection

use finsight::models::SignalId;
use finsight::signals::detect_newest;

use crate::common::entries;

#[test]
fn test_first_unknown_id_in_feed_order_is_flagged() {
    let previous = entries(&[1, 2, 3]);
    let current = entries(&[4, 2, 3, 1]);
    assert_eq!(detect_newest(&previous, &current), Some(SignalId(4)));
}

#[test]
fn test_unchanged_feed_flags_nothing() {
    let previous = entries(&[1, 2, 3]);
    let current = entries(&[1, 2, 3]);
    assert_eq!(detect_newest(&previous, &current), None);
}

#[test]
fn test_only_first_of_several_new_ids_is_flagged() {
    let previous = entries(&[1, 2]);
    let current = entries(&[1, 7, 5, 2]);
    assert_eq!(detect_newest(&previous, &current), Some(SignalId(7)));
}

#[test]
fn test_reordering_and_removal_are_not_new() {
    let previous = entries(&[1, 2, 3]);
    let current = entries(&[3, 1]);
    assert_eq!(detect_newest(&previous, &current), None);
}

#[test]
fn test_everything_is_new_against_empty_feed() {
    let current = entries(&[9, 8]);
    assert_eq!(detect_newest(&[], &current), Some(SignalId(9)));
}
