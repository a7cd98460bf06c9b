//! Payment gateway adapters.
//!
//! Two providers settle orders on this platform:
//!
//! - **Momo** ([`momo`]) needs an outbound two-phase confirmation
//!   (authorize, then capture) with HMAC-signed requests.
//! - **Alepay** ([`alepay`]) pushes its result to us; the adapter only
//!   validates the payload shape, no call goes back out.
//!
//! Nothing in this crate touches the database. The API layer confirms with
//! the gateway first and opens its settlement transaction afterwards, so no
//! lock is ever held across the network.

pub mod alepay;
pub mod error;
pub mod momo;

pub use error::GatewayError;
