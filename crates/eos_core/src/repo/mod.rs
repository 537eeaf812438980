//! Typed repositories over the collection store.
//!
//! # Responsibility
//! - Give each collection an explicit repository object instead of
//!   addressing stores by ambient key strings.
//! - Provide identity-based lookup, upsert and removal on whole collections.
//!
//! # Invariants
//! - Upsert replaces in place by id, otherwise appends; other records keep
//!   their order.
//! - Repositories apply no System Laws; the engine does.

pub mod collection_repo;
