//! Contact record domain model.
//!
//! # Responsibility
//! - Define the single record shape stored and exported by core.
//! - Name the columns callers may address in field-scoped updates.
//!
//! # Invariants
//! - Records carry no identifier; identity is established by field matching.
//! - Persisted phones are digit streams; formatted phones exist only at export.

pub mod record;
