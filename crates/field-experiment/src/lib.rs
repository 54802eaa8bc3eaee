//! Field Experiment: harness for running finger-kernel fields.
//!
//! This crate is the external collaborator side of the system:
//! - Grid placement of fingers across room surfaces
//! - A simulated tracker (orbiting points of interest)
//! - The external frame loop driving the coordinator
//! - Run summaries written to JSON

pub mod driver;
pub mod experiment;
pub mod layout;
pub mod results;
pub mod scenario;
