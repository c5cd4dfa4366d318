//! Infrastructure layer for external integrations.
//!
//! Implements the storage contract defined by the domain layer.

pub mod persistence;
