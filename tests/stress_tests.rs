//! Stress tests that push the heaps through large operation mixes
//!
//! Large shuffled loads, decrease-key storms and interleavings catch the
//! structural edge cases the small fixed tests miss.

use rand::seq::SliceRandom;
use rand::SeedableRng;

use mergeable_heaps::binary::BinaryHeap;
use mergeable_heaps::binomial::BinomialHeap;
use mergeable_heaps::fibonacci::FibonacciHeap;
use mergeable_heaps::pairing::PairingHeap;
use mergeable_heaps::siblings::Traversal;
use mergeable_heaps::{AddressableHeap, Heap, HeapError};

fn shuffled(n: i32, seed: u64) -> Vec<i32> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut values: Vec<i32> = (0..n).collect();
    values.shuffle(&mut rng);
    values
}

/// A shuffled permutation comes back out sorted
fn check_sorts_permutation<H: Heap<i32, i32>>(n: i32, seed: u64) {
    let mut heap = H::new();
    for v in shuffled(n, seed) {
        heap.push(v, v);
    }

    for expected in 0..n {
        assert_eq!(heap.pop().map(|(p, _)| p), Some(expected));
    }
    assert!(heap.is_empty());
}

/// Many decrease_key operations keep total order consistent
fn check_many_decrease_keys<H: AddressableHeap<i32, i32>>() {
    let mut heap = H::new();
    let mut handles = Vec::new();

    for i in 0..500 {
        handles.push(heap.push_with_handle(10_000 + i, i));
    }

    // Reverse the order of everything via decrease_key.
    for (i, handle) in handles.iter().enumerate() {
        heap.decrease_key(handle, 500 - i as i32).unwrap();
    }

    let mut last = i32::MIN;
    let mut count = 0;
    while let Some((priority, _)) = heap.pop() {
        assert!(priority >= last);
        last = priority;
        count += 1;
    }
    assert_eq!(count, 500);
}

/// Alternating pushes and pops in waves
fn check_wave_pattern<H: Heap<i32, i32>>() {
    let mut heap = H::new();
    let mut expected = 0usize;

    for wave in 0..10 {
        for i in 0..100 {
            heap.push(wave * 1000 + i, i);
            expected += 1;
        }
        for _ in 0..50 {
            assert!(heap.pop().is_some());
            expected -= 1;
        }
        assert_eq!(heap.len(), expected);
    }

    while heap.pop().is_some() {
        expected -= 1;
    }
    assert_eq!(expected, 0);
}

/// Interleave removals by handle with pops
fn check_interleaved_removals<H: AddressableHeap<i32, i32>>(seed: u64) {
    let mut heap = H::new();
    let mut handles = Vec::new();
    for v in shuffled(300, seed) {
        handles.push((v, heap.push_with_handle(v, v)));
    }

    // Remove every third element by handle.
    let mut removed = Vec::new();
    for (v, handle) in handles.iter().filter(|(v, _)| v % 3 == 0) {
        assert_eq!(heap.remove(handle), Ok((*v, *v)));
        removed.push(*v);
    }

    // Their handles are dead now.
    for (_, handle) in handles.iter().filter(|(v, _)| v % 3 == 0) {
        assert_eq!(heap.remove(handle), Err(HeapError::StaleHandle));
    }

    let mut drained = Vec::new();
    while let Some((p, _)) = heap.pop() {
        drained.push(p);
    }
    let expected: Vec<i32> = (0..300).filter(|v| v % 3 != 0).collect();
    assert_eq!(drained, expected);
}

#[test]
fn binary_sorts_permutation() {
    check_sorts_permutation::<BinaryHeap<i32, i32>>(2000, 7);
}

#[test]
fn binomial_sorts_permutation() {
    check_sorts_permutation::<BinomialHeap<i32, i32>>(2000, 11);
}

#[test]
fn fibonacci_sorts_permutation() {
    check_sorts_permutation::<FibonacciHeap<i32, i32>>(2000, 13);
}

#[test]
fn pairing_sorts_permutation() {
    check_sorts_permutation::<PairingHeap<i32, i32>>(2000, 17);
}

#[test]
fn binary_many_decrease_keys() {
    check_many_decrease_keys::<BinaryHeap<i32, i32>>();
}

#[test]
fn binomial_many_decrease_keys() {
    check_many_decrease_keys::<BinomialHeap<i32, i32>>();
}

#[test]
fn fibonacci_many_decrease_keys() {
    check_many_decrease_keys::<FibonacciHeap<i32, i32>>();
}

#[test]
fn pairing_many_decrease_keys() {
    check_many_decrease_keys::<PairingHeap<i32, i32>>();
}

#[test]
fn binary_wave_pattern() {
    check_wave_pattern::<BinaryHeap<i32, i32>>();
}

#[test]
fn binomial_wave_pattern() {
    check_wave_pattern::<BinomialHeap<i32, i32>>();
}

#[test]
fn fibonacci_wave_pattern() {
    check_wave_pattern::<FibonacciHeap<i32, i32>>();
}

#[test]
fn pairing_wave_pattern() {
    check_wave_pattern::<PairingHeap<i32, i32>>();
}

#[test]
fn binary_interleaved_removals() {
    check_interleaved_removals::<BinaryHeap<i32, i32>>(23);
}

#[test]
fn binomial_interleaved_removals() {
    check_interleaved_removals::<BinomialHeap<i32, i32>>(29);
}

#[test]
fn fibonacci_interleaved_removals() {
    check_interleaved_removals::<FibonacciHeap<i32, i32>>(31);
}

#[test]
fn pairing_interleaved_removals() {
    check_interleaved_removals::<PairingHeap<i32, i32>>(37);
}

/// The cascading-cut rule keeps the total number of cuts linear in the
/// number of decrease_key calls: each call performs at most one direct cut,
/// and every cascaded cut consumes a mark paid for by an earlier one.
#[test]
fn fibonacci_cut_count_stays_linear() {
    let mut heap = FibonacciHeap::new();
    let mut handles = Vec::new();
    for i in 0..1024 {
        handles.push(heap.push_with_handle(100_000 + i, i));
    }
    // Consolidate so that deep trees exist.
    heap.pop();

    let mut performed = 0u64;
    for (i, handle) in handles.iter().enumerate().skip(1) {
        if heap.decrease_key(handle, i as i32).is_ok() {
            performed += 1;
        }
    }

    assert!(performed > 0);
    assert!(
        heap.cuts() <= 2 * performed,
        "cuts {} exceeded 2x decrease count {}",
        heap.cuts(),
        performed
    );

    // The heap is still consistent afterwards.
    let mut last = i32::MIN;
    while let Some((p, _)) = heap.pop() {
        assert!(p >= last);
        last = p;
    }
}

/// A cursor created before a mutation fails, and a fresh one sees the new
/// structure.
#[test]
fn cursor_invalidation_under_mutation() {
    let mut heap: BinomialHeap<i32, i32> = (0..20).map(|i| (i, i)).collect();

    let mut cursor = heap.cursor(Traversal::DepthFirst);
    assert!(cursor.next(&heap).unwrap().is_some());

    heap.pop();
    assert_eq!(cursor.next(&heap), Err(HeapError::VersionChanged));

    let mut fresh = heap.cursor(Traversal::DepthFirst);
    let mut visited = 0;
    while fresh.next(&heap).unwrap().is_some() {
        visited += 1;
    }
    assert_eq!(visited, heap.len());
}

/// Merging many small heaps into one preserves every element.
fn check_merge_fold<H: AddressableHeap<i32, i32>>() {
    let mut acc = H::new();
    for chunk in 0..20 {
        let mut part = H::new();
        for i in 0..25 {
            part.push(chunk * 25 + i, i);
        }
        acc.merge(part);
    }

    assert_eq!(acc.len(), 500);
    for expected in 0..500 {
        assert_eq!(acc.pop().map(|(p, _)| p), Some(expected));
    }
}

#[test]
fn binary_merge_fold() {
    check_merge_fold::<BinaryHeap<i32, i32>>();
}

#[test]
fn binomial_merge_fold() {
    check_merge_fold::<BinomialHeap<i32, i32>>();
}

#[test]
fn fibonacci_merge_fold() {
    check_merge_fold::<FibonacciHeap<i32, i32>>();
}

#[test]
fn pairing_merge_fold() {
    check_merge_fold::<PairingHeap<i32, i32>>();
}
