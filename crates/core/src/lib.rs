//! Domain logic for the Strider challenge platform.
//!
//! Everything in this crate is pure: no database handles, no sockets, no
//! ambient randomness. The API and worker crates feed it loaded rows and an
//! explicit RNG, which keeps the settlement and reward rules unit-testable
//! in isolation.

pub mod challenge;
pub mod envelope;
pub mod error;
pub mod milestones;
pub mod reward;
pub mod signing;
pub mod types;
