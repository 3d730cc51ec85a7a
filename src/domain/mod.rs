//! Domain layer: fee records, money and the persistence ports.

pub mod class_label;
pub mod fee_structure;
pub mod money;
pub mod payment;
pub mod ports;
pub mod snapshot;
pub mod student;
