//! ARK Common - shared types for the support triage daemon and its CLI.
//!
//! Audit record schemas, the inbound message envelope, and the health
//! snapshot exchanged between arkd and arkctl.

pub mod events;
pub mod status;

pub use events::*;
pub use status::*;
