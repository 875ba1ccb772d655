//! Domain types and pure logic for the registration review desk.
//!
//! This crate has no I/O. It defines the records exchanged with the
//! backend gateway, decision validation, time-range mapping, in-memory
//! listing helpers and the site-edit draft used by the workflow crate.

pub mod approval;
pub mod error;
pub mod listing;
pub mod site_edit;
pub mod time_range;
pub mod types;
