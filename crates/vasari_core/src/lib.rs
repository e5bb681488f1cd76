//! Core data types for the Vasari generation pipeline.
//!
//! This crate provides the foundation data types shared across the Vasari
//! workspace: run identifiers, schema descriptors, validated records, and
//! size budget policies.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod budget;
mod record;
mod run_id;
mod schema;

pub use budget::{BudgetPolicy, BudgetPolicyBuilder};
pub use record::Record;
pub use run_id::RunId;
pub use schema::Schema;
