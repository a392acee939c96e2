use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use blockdeque::{Deque, DequeError};

/// Forwards to the system allocator until the current thread runs out of budget.
struct BudgetAllocator;

thread_local! {
    static BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
}

fn take_allocation() -> bool {
    BUDGET
        .try_with(|budget| match budget.get() {
            None => true,
            Some(0) => false,
            Some(left) => {
                budget.set(Some(left - 1));
                true
            }
        })
        .unwrap_or(true)
}

#[allow(unsafe_code)]
unsafe impl GlobalAlloc for BudgetAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if take_allocation() {
            System.alloc(layout)
        } else {
            std::ptr::null_mut()
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
    }
}

#[global_allocator]
static ALLOCATOR: BudgetAllocator = BudgetAllocator;

/// Runs `f` with at most `allocations` successful allocations on this thread.
fn with_budget<R>(allocations: usize, f: impl FnOnce() -> R) -> R {
    BUDGET.with(|budget| budget.set(Some(allocations)));
    let result = f();
    BUDGET.with(|budget| budget.set(None));
    result
}

fn contents<const C: usize>(deque: &Deque<u64, C>) -> Vec<u64> {
    deque.iter().copied().collect()
}

#[test]
fn test_push_back_without_growth_needs_no_allocation() {
    let mut deque: Deque<u64, 4> = Deque::new().unwrap();

    for i in 0..6 {
        assert_eq!(with_budget(0, || deque.push_back(i)), Ok(()));
    }
    assert_eq!(deque.block_count(), 2);
}

#[test]
fn test_failed_push_back_growth_leaves_deque_unchanged() {
    let mut deque: Deque<u64, 4> = Deque::new().unwrap();

    let mut pushed = 0;
    let error = loop {
        match with_budget(0, || deque.push_back(pushed)) {
            Ok(()) => pushed += 1,
            Err(error) => break error,
        }
    };

    assert_eq!(pushed, 6);
    assert_eq!(error, DequeError::AllocationFailed { blocks: 2 });
    assert_eq!(deque.block_count(), 2);
    assert_eq!(deque.len(), 6);
    assert_eq!(contents(&deque), vec![0, 1, 2, 3, 4, 5]);

    deque.push_back(pushed).unwrap();
    assert_eq!(deque.block_count(), 4);
    assert_eq!(contents(&deque), vec![0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_failed_push_front_growth_leaves_deque_unchanged() {
    let mut deque: Deque<u64, 4> = Deque::new().unwrap();

    assert_eq!(
        with_budget(0, || deque.push_front(1)),
        Err(DequeError::AllocationFailed { blocks: 2 })
    );
    assert_eq!(deque.block_count(), 2);
    assert!(deque.is_empty());
    assert_eq!(deque.pop_front(), None);

    deque.push_front(1).unwrap();
    assert_eq!(deque.block_count(), 4);
    assert_eq!(*deque.front(), 1);
}

#[test]
fn test_block_failure_midway_releases_partial_batch() {
    let mut deque: Deque<u64, 4> = Deque::new().unwrap();
    for i in 0..7 {
        deque.push_back(i).unwrap();
    }
    assert_eq!(deque.block_count(), 4);
    let before = contents(&deque);

    // Reservation and the first two blocks succeed, the third block fails
    let mut pushed = 7;
    let error = loop {
        match with_budget(3, || deque.push_back(pushed)) {
            Ok(()) => pushed += 1,
            Err(error) => break error,
        }
    };

    assert!(matches!(error, DequeError::AllocationFailed { .. }));
    assert_eq!(deque.block_count(), 4);
    let expected: Vec<u64> = before.iter().copied().chain(7..pushed).collect();
    assert_eq!(contents(&deque), expected);

    deque.push_back(pushed).unwrap();
    assert_eq!(deque.block_count(), 8);
    assert_eq!(*deque.back(), pushed);
    assert_eq!(deque.len(), expected.len() + 1);
}

#[test]
fn test_failed_table_reservation_leaves_deque_unchanged() {
    let mut deque: Deque<u64, 4> = Deque::new().unwrap();
    for i in 0..6 {
        deque.push_back(i).unwrap();
    }

    // Every fresh block succeeds, the new table reservation fails
    let error = with_budget(3, || deque.push_back(6)).unwrap_err();

    assert_eq!(error, DequeError::AllocationFailed { blocks: 4 });
    assert_eq!(deque.block_count(), 2);
    assert_eq!(contents(&deque), vec![0, 1, 2, 3, 4, 5]);

    deque.push_back(6).unwrap();
    assert_eq!(deque.block_count(), 4);
}

#[test]
fn test_failed_initial_allocation() {
    let result = with_budget(1, Deque::<u64, 4>::new);
    assert!(matches!(result, Err(DequeError::AllocationFailed { .. })));

    let deque = with_budget(3, Deque::<u64, 4>::new).unwrap();
    assert_eq!(deque.block_count(), 2);
}
