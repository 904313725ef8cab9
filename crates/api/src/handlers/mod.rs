//! Request handlers, grouped by resource.

pub mod campaigns;
pub mod jobs;
pub mod lists;
pub mod tables;
