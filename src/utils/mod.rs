//! Helpers shared across layers.
//!
//! - [`client_key`] - Client identity from proxy headers and peer address
//! - [`slug_generator`] - Random slug generation and custom slug validation

pub mod client_key;
pub mod slug_generator;
