//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record store contract used by authorization, export and
//!   service orchestration.
//! - Isolate SQLite query details from business policy.
//!
//! # Invariants
//! - Read, update and delete queries match by substring containment.
//! - Exact-equality matching is reserved for write authorization probes.

pub mod record_repo;
