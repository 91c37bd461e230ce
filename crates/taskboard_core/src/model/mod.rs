//! Entity records, identifiers and partial-update requests.
//!
//! # Responsibility
//! - Define the user/task/tag shapes shared by repositories and services.
//! - Define patch types whose absent fields mean "no change requested".
//!
//! # Invariants
//! - Identity is assigned by the store; records carry `None` until created.
//! - Relationship collections are derived from join tables, never stored on
//!   the entity row, and nest one level deep.

pub mod entity;
pub mod patch;
