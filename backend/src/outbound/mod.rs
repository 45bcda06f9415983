//! Outbound adapters implementing domain ports.

pub mod memory;

pub use memory::MemoryStore;
