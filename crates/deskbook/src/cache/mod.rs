//! Query cache implementations.

mod memory;

pub use memory::MemoryQueryCache;
