//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the write paths that feed it

pub mod card_link;
pub mod challenge;
pub mod delivery;
pub mod discount;
pub mod gift;
pub mod payment;
pub mod point;
pub mod run_history;
pub mod status;
pub mod user;
pub mod user_challenge;
