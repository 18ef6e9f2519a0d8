use nexus_failfast::{ArrayList, Error, HashSet, LinkedList, Split};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Drains a splitter recursively, prefix before suffix.
fn drain<S: Split<u32>>(mut split: S, out: &mut Vec<u32>) {
    match split.try_split().unwrap() {
        Some(prefix) => {
            drain(prefix, out);
            drain(split, out);
        }
        None => split.for_each_remaining(|v| out.push(v)).unwrap(),
    }
}

// =============================================================================
// Capacity
// =============================================================================

#[test]
fn capacity_never_shrinks_without_trim() {
    let mut rng = SmallRng::seed_from_u64(12345);
    let mut list: ArrayList<u32> = ArrayList::new();
    let mut capacity = list.capacity();

    for _ in 0..5_000 {
        if list.is_empty() || rng.random_range(0..100) < 70 {
            let index = rng.random_range(0..=list.len());
            list.insert(index, rng.random()).unwrap();
        } else {
            let index = rng.random_range(0..list.len());
            list.remove_at(index).unwrap();
        }
        assert!(list.capacity() >= capacity);
        assert!(list.len() <= list.capacity());
        capacity = list.capacity();
    }

    list.trim_to_size().unwrap();
    assert_eq!(list.capacity(), list.len());
}

#[test]
fn growth_is_geometric() {
    let mut list: ArrayList<u64> = ArrayList::with_capacity(0).unwrap();
    let mut reallocations = 0;
    let mut capacity = list.capacity();
    for i in 0..100_000 {
        list.add(i).unwrap();
        if list.capacity() != capacity {
            assert!(list.capacity() >= capacity + capacity / 2);
            capacity = list.capacity();
            reallocations += 1;
        }
    }
    assert!(reallocations < 40);
}

// =============================================================================
// Range views
// =============================================================================

#[test]
fn view_writes_through_and_invalidates() {
    let mut list: ArrayList<u32> = [1, 2, 3, 4, 5].into_iter().collect();
    let mut view = list.subrange(1, 4).unwrap();
    assert_eq!(view.to_vec(), Ok(vec![2, 3, 4]));

    view.set(0, 9).unwrap();
    assert_eq!(list.get(1), Ok(9));

    list.remove_at(0).unwrap();
    assert_eq!(view.get(0), Err(Error::ConcurrentModification));
    assert_eq!(view.set(0, 1), Err(Error::ConcurrentModification));
}

#[test]
fn linked_view_writes_through_and_invalidates() {
    let mut list: LinkedList<u32> = [1, 2, 3, 4, 5].into_iter().collect();
    let mut view = list.subrange(1, 4).unwrap();

    view.set(0, 9).unwrap();
    assert_eq!(list.get(1), Ok(9));

    list.remove_at(4).unwrap();
    assert_eq!(view.len(), Err(Error::ConcurrentModification));
}

#[test]
fn view_bounds_are_checked_locally() {
    let list: ArrayList<u32> = (0..10).collect();
    let view = list.subrange(3, 5).unwrap();
    assert_eq!(view.get(2), Err(Error::OutOfBounds { index: 2, len: 2 }));
    assert_eq!(
        list.subrange(0, 11).err(),
        Some(Error::OutOfBounds { index: 11, len: 10 })
    );
}

// =============================================================================
// Fail-fast iteration
// =============================================================================

#[test]
fn array_iterator_fails_after_direct_add() {
    let mut list: ArrayList<u32> = [1, 2, 3].into_iter().collect();
    let mut iter = list.iter();
    list.add(4).unwrap();
    assert_eq!(iter.next(), Some(Err(Error::ConcurrentModification)));
}

#[test]
fn linked_iterator_fails_after_direct_add() {
    let mut list: LinkedList<u32> = [1, 2, 3].into_iter().collect();
    let mut iter = list.iter();
    list.add(4).unwrap();
    assert_eq!(iter.next(), Some(Err(Error::ConcurrentModification)));

    let mut descending = list.descending_iter();
    list.push_front(0).unwrap();
    assert_eq!(descending.next(), Some(Err(Error::ConcurrentModification)));
}

#[test]
fn set_keeps_iterators_valid() {
    let mut list: ArrayList<u32> = [1, 2, 3].into_iter().collect();
    let mut iter = list.iter();
    list.set(0, 7).unwrap();
    assert_eq!(iter.next(), Some(Ok(7)));

    list.replace_all(|v| v + 1).unwrap();
    assert_eq!(iter.next(), Some(Err(Error::ConcurrentModification)));

    let mut list: LinkedList<u32> = [1, 2, 3].into_iter().collect();
    let mut iter = list.iter();
    list.set(0, 7).unwrap();
    assert_eq!(iter.next(), Some(Ok(7)));
}

// =============================================================================
// Batch removal
// =============================================================================

#[test]
fn remove_if_even() {
    let mut list: ArrayList<u32> = [1, 2, 3, 4, 5, 6].into_iter().collect();
    let before = list.epoch().get();
    assert_eq!(list.len(), 6);

    assert_eq!(list.remove_if(|v| v % 2 == 0), Ok(true));
    assert_eq!(list.to_vec(), vec![1, 3, 5]);
    assert_eq!(list.len(), 3);
    assert_eq!(list.epoch().get(), before + 1);
}

#[test]
fn remove_if_invalidates_outstanding_handles_once() {
    let mut list: ArrayList<u32> = (0..100).collect();
    let mut iter = list.iter();
    list.remove_if(|v| v % 3 == 0).unwrap();
    assert_eq!(iter.next(), Some(Err(Error::ConcurrentModification)));
    assert_eq!(list.len(), 66);
}

// =============================================================================
// Split traversal
// =============================================================================

#[test]
fn array_split_visits_each_once_in_order() {
    let list: ArrayList<u32> = (1..=100).collect();
    let mut out = Vec::new();
    drain(list.splitter(), &mut out);
    assert_eq!(out, (1..=100).collect::<Vec<_>>());
}

#[test]
fn linked_split_visits_each_once_in_order() {
    let list: LinkedList<u32> = (1..=100).collect();
    let mut out = Vec::new();
    drain(list.splitter(), &mut out);
    assert_eq!(out, (1..=100).collect::<Vec<_>>());

    let list: LinkedList<u32> = (0..5_000).collect();
    let mut out = Vec::new();
    drain(list.splitter(), &mut out);
    assert_eq!(out, (0..5_000).collect::<Vec<_>>());
}

#[test]
fn view_split_visits_each_once_in_order() {
    let list: ArrayList<u32> = (0..200).collect();
    let view = list.subrange(50, 150).unwrap();
    let mut out = Vec::new();
    drain(view.splitter(), &mut out);
    assert_eq!(out, (50..150).collect::<Vec<_>>());
}

#[test]
fn split_halves_cover_disjoint_ranges() {
    let list: ArrayList<u32> = (0..64).collect();
    let mut suffix = list.splitter();
    let mut prefix = suffix.try_split().unwrap().unwrap();

    let mut a = Vec::new();
    let mut b = Vec::new();
    // Interleave consumption of the two halves
    loop {
        let left = prefix.try_advance(|v| a.push(v)).unwrap();
        let right = suffix.try_advance(|v| b.push(v)).unwrap();
        if !left && !right {
            break;
        }
    }
    assert_eq!(a, (0..32).collect::<Vec<_>>());
    assert_eq!(b, (32..64).collect::<Vec<_>>());
}

// =============================================================================
// Deque
// =============================================================================

#[test]
fn deque_round_trip() {
    let mut deque: LinkedList<u32> = LinkedList::new();
    deque.push_front(1).unwrap();
    deque.push_front(2).unwrap();
    deque.push_back(3).unwrap();

    assert_eq!(deque.poll(), Ok(Some(2)));
    assert_eq!(deque.poll(), Ok(Some(1)));
    assert_eq!(deque.poll(), Ok(Some(3)));
    assert_eq!(deque.poll(), Ok(None));
    assert_eq!(deque.remove_first(), Err(Error::Empty));
}

// =============================================================================
// Set
// =============================================================================

#[test]
fn set_delegation() {
    let mut set: HashSet<String> = HashSet::new();
    let x = String::from("x");

    assert!(set.add(x.clone()));
    assert!(!set.add(x.clone()));
    assert!(set.remove(&x));
    assert!(!set.remove(&x));
    assert!(set.is_empty());
}
