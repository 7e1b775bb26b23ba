//! Heap usage of inline and heap placed values.
//!
//! This test binary installs a global allocator that counts allocations made
//! by the current thread. Word-sized values must never allocate, larger ones
//! must allocate exactly once per live value.

use std::{
    alloc::{GlobalAlloc, Layout, System},
    cell::Cell,
    sync::Arc,
};

use slotbox::{AnyValue, Function, INLINE_CAPACITY, Placement};

struct CountingAllocator;

thread_local! {
    static ALLOCATIONS: Cell<u64> = const { Cell::new(0) };
}

// SAFETY: Every call is forwarded to the system allocator unchanged.
unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // Allocations during thread teardown are not counted.
        _ = ALLOCATIONS.try_with(|count| count.set(count.get() + 1));
        // SAFETY: Forwarded with the caller's guarantees.
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: Forwarded with the caller's guarantees.
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator;

/// Runs `operation` and returns its result together with the number of
/// allocations it made on this thread.
fn count_allocations<T>(operation: impl FnOnce() -> T) -> (T, u64) {
    let before = ALLOCATIONS.with(Cell::get);
    let result = operation();
    let after = ALLOCATIONS.with(Cell::get);
    (result, after - before)
}

/// Exercises every code path once so that one-time initialization does not
/// show up in the measurements.
fn warm_up() {
    let mut value: AnyValue = AnyValue::new(0_u8);
    let mut copy = value.clone();
    value.swap(&mut copy);
    value.set([0_u64; 4]);
    drop(value.take());

    let function: Function<(u8,), u8> = Function::new(|x: u8| x);
    let copy = function.clone();
    let _ = copy.call((1,));
}

#[test]
fn test_word_sized_values_never_allocate() {
    warm_up();

    let boxed = Box::new(5_u64);
    let shared = Arc::new(String::from("shared"));

    let (values, allocations): ([AnyValue; 6], u64) = count_allocations(|| {
        [
            AnyValue::new(1_i32),
            AnyValue::new(u64::MAX),
            AnyValue::new('c'),
            AnyValue::new(()),
            AnyValue::new(boxed),
            AnyValue::new(shared),
        ]
    });
    assert_eq!(allocations, 0);

    for value in &values {
        assert_eq!(value.placement(), Some(Placement::Inline));
    }

    let (_copies, allocations) = count_allocations(|| {
        [values[0].clone(), values[1].clone(), values[5].clone()]
    });
    assert_eq!(allocations, 0);
}

#[test]
fn test_large_values_allocate_once_per_value() {
    warm_up();

    let (value, allocations): (AnyValue, u64) = count_allocations(|| AnyValue::new([7_u8; 64]));
    assert_eq!(allocations, 1);
    assert_eq!(value.placement(), Some(Placement::Heap));
    assert!(core::mem::size_of::<[u8; 64]>() > INLINE_CAPACITY);

    let (copy, allocations) = count_allocations(|| value.clone());
    assert_eq!(allocations, 1);
    assert_eq!(copy.get::<[u8; 64]>(), Ok(&[7_u8; 64]));

    let (copies, allocations) = count_allocations(|| [copy.clone(), copy.clone(), copy.clone()]);
    assert_eq!(allocations, 3);
    drop(copies);
}

#[test]
fn test_move_and_swap_never_allocate() {
    warm_up();

    let mut heap: AnyValue = AnyValue::new([1_u64; 4]);
    let mut inline: AnyValue = AnyValue::new(2_u32);

    let ((), allocations) = count_allocations(|| {
        heap.swap(&mut inline);
        inline.swap(&mut heap);

        let mut moved = heap.take();
        heap.assign_from(&mut moved);
        drop(moved);
    });
    assert_eq!(allocations, 0);

    assert_eq!(heap.get::<[u64; 4]>(), Ok(&[1; 4]));
    assert_eq!(inline.get::<u32>(), Ok(&2));
}

#[test]
fn test_callables_follow_the_same_boundary() {
    warm_up();

    let offset = 3_usize;
    let table = [10_u64, 20, 30];

    let (small, allocations): (Function<(usize,), usize>, u64) =
        count_allocations(|| Function::new(move |x: usize| x + offset));
    assert_eq!(allocations, 0);
    assert_eq!(small.placement(), Some(Placement::Inline));

    let (large, allocations): (Function<(usize,), u64>, u64) =
        count_allocations(|| Function::new(move |x: usize| table[x]));
    assert_eq!(allocations, 1);
    assert_eq!(large.placement(), Some(Placement::Heap));

    let (results, allocations) = count_allocations(|| (small.call((1,)), large.call((2,))));
    assert_eq!(allocations, 0);
    assert_eq!(results, (Ok(4), Ok(30)));
}
