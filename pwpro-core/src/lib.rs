//! Calculation core for the PW Pro field toolkit.
//!
//! The measurer and the dilution calculator are pure, total functions and are
//! safe to call from any thread. Everything else in here (rule tables,
//! repositories, the schedule book) sits on top of the `pwpro-schemas` types.

pub mod advisory;
pub mod dilution;
pub mod error;
pub mod geocode;
pub mod logger;
pub mod measure;
pub mod recommendation;
pub mod repository;
pub mod schedule;
pub mod surface;

pub use dilution::{compute, compute_batch_mix, compute_ratio_mix, nearest_preset, nearest_preset_in};
pub use error::PwProError;
pub use measure::measure_polygon;
