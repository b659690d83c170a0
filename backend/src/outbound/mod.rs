//! Outbound adapters implementing the domain storage ports.
//!
//! - **memory**: a process-local store backing all three repositories.
//!
//! Adapters translate between domain types and their own representation and
//! hold no routing logic.

pub mod memory;
