//! Wire entities and their storage models.
//!
//! Each entity type has a wire record (what API clients see), a storage
//! model (what the database holds) and a field registry connecting the two.

pub mod client;
pub mod common;
pub mod contact_info;
pub mod organization;
