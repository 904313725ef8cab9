//! Pure domain logic for the Sandesh bulk-messaging campaign engine.
//!
//! Everything in this crate is synchronous, deterministic, and free of
//! I/O so the persistence and HTTP layers can depend on it without
//! dragging in a runtime:
//!
//! - Phone normalization to the canonical `+91` format
//! - Contact ingestion from delimited text with per-row error reports
//! - The universal header-keyed row parser and its CSV serializer
//! - Deduplicating merge of contact lists (the Combine operation)
//! - Lock scopes and their overlap/coverage algebra
//! - Campaign and dispatch-job status enums with transition rules
//! - The shared [`error::CoreError`] taxonomy

pub mod campaign;
pub mod combine;
pub mod contact;
pub mod csv;
pub mod dispatch;
pub mod error;
pub mod ingest;
pub mod locking;
pub mod phone;
pub mod tabular;
pub mod types;
