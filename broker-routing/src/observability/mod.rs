//! Structured logging vocabulary shared by every layer of the crate.

pub mod events;
pub mod fields;
