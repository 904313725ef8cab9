//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the write operations on that entity

pub mod campaign;
pub mod contact_list;
pub mod job;
pub mod lock;
