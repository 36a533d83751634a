//! Security domain model.
//!
//! # Responsibility
//! - Define the records read from the security store.
//! - Own the fixed HTTP verb to action mapping.
//!
//! # Invariants
//! - Every record is identified by its integer primary key.
//! - Relationships are carried as foreign-key ids, never as nested records.

pub mod action;
pub mod application;
pub mod resource;

/// Integer identity shared by every security table.
pub type EntityId = i64;
