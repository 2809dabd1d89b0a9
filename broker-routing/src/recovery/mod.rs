//! Recovery layer.
//!
//! Owns the router lifecycle state and the one-shot reconstruction of the routing table
//! from the store. The rebuilt table is staged privately and published in a single swap,
//! so no publisher ever routes against a partially recovered table.

pub(crate) mod loader;
pub(crate) mod state;

pub use state::RecoveryState;
