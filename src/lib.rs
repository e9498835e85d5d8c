//! Payroll computation engine
//!
//! This crate computes per-worker pay breakdowns from a roster and a
//! catalog of configurable pay concepts (earnings, deductions and employer
//! contributions, some defined by formulas), aggregates run totals, and
//! commits a finalized run exactly once per period and payroll type.

#![warn(missing_docs)]

pub mod calculation;
pub mod commit;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
