//! Use-case services over the collection store.
//!
//! # Responsibility
//! - Enforce System Laws and cascades on every write (`engine`).
//! - Derive advisory state transitions after task saves (`completion`).
//! - Compute read-only planning views over loaded records (`agenda`).

pub mod agenda;
pub mod completion;
pub mod engine;
