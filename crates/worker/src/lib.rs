//! Strider background worker library.
//!
//! Hosts periodic jobs that run outside the request path. Currently this is
//! the enrollment evaluation sweep, which finalizes paid challenges whose
//! window has closed without the owner ever fetching their progress.

pub mod sweep;
