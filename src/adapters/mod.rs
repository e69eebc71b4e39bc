//! Adapters Layer
//!
//! Inbound adapters drive the application (HTTP); outbound adapters
//! implement the domain ports against real backends.

pub mod inbound;
pub mod outbound;
