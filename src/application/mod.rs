//! Application layer.
//!
//! `aggregation` holds the pure fee collection engine; `FeeService` wires it to
//! the storage ports for recording payments and building reports.

pub mod aggregation;
pub mod query;
pub mod report;
pub mod service;
