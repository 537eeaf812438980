//! Relevance-ranked search across projects, tasks and notes.
//!
//! # Responsibility
//! - Score entities against a free-text query with context weighting.
//! - Shape hits for display without exposing record internals.
//!
//! # Invariants
//! - Stateless: nothing is indexed between queries.
//! - A blank query yields no hits.

pub mod ranked;
