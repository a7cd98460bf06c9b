//! HTTP request handlers, one module per resource.

pub mod challenges;
pub mod giftbox;
pub mod payments;
