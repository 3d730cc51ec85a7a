//! Adapters between the outside world (files, streams) and the domain.

pub mod csv;
pub mod json;
