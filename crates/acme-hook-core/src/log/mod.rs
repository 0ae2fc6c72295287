//! Log sink implementations
//!
//! This module provides implementations of the LogSink trait.

pub mod file;
pub mod memory;

pub use file::DomainLog;
pub use memory::MemoryLog;
