use thiserror::Error;

/// Error types for `Deque` operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum DequeError {
    /// Index is beyond the current deque length
    #[error("Index out of bounds: index {index} is beyond deque length {length}")]
    IndexOutOfBounds {
        /// Index that was accessed
        index: usize,
        /// Current length of the deque
        length: usize,
    },
    /// The allocator could not provide memory for blocks or the block table
    #[error("Allocation failed while obtaining {blocks} block(s)")]
    AllocationFailed {
        /// Size of the whole batch of blocks being obtained (or table
        /// entries being reserved), not the index of the block that failed
        blocks: usize,
    },
    /// Element access attempted on an empty deque
    #[error("Operation on empty deque")]
    EmptyDeque,
    /// Invalid compile-time parameter
    #[error("Invalid configuration: {parameter} = {value}")]
    InvalidConfiguration {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value
        value: usize,
    },
}
