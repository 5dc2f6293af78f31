//! Data types shared across the PW Pro workspace.
//!
//! Everything here is plain data: serde-friendly structs and enums whose field
//! names match the snake_case columns of the hosted database tables.

pub mod chemical;
pub mod dilution;
pub mod estimate;
pub mod file_formats;
pub mod geo;
pub mod inventory;
pub mod invoice;
pub mod rule;
pub mod schedule;
pub mod weather;
