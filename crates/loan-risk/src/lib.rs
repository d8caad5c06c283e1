//! Loan risk heuristic, narrative analysis, and assessment history.

pub mod config;
pub mod error;
pub mod risk;
pub mod telemetry;
