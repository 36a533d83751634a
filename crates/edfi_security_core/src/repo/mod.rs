//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define lookup contracts over the security store.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Repositories only read; every call runs on its own context.
//! - Single-record lookups distinguish `NotFound` from `Ambiguous` instead
//!   of picking an arbitrary row.

pub mod security_repo;
