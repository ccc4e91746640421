//! Read-only access to task-execution run stores.
//!
//! A run store is a SQLite file written by the task platform. This crate
//! opens it without ever writing, resolves which optional datasets it
//! carries, and exposes the aggregate queries metric extraction needs.

#![warn(missing_docs)]

pub mod error;
pub mod queries;
pub mod schema;
pub mod store;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use error::{Result, StoreError};
pub use queries::{CostTotals, IntervalTime, TaskCounts, TaskTiming};
pub use schema::{
    IntervalSchema, IntervalTable, SchemaAdapter, SchemaPlan, SequenceTable, StateColumn,
};
pub use store::RunStore;
