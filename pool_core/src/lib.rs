#![forbid(unsafe_code)]

//! Core domain model and dosing logic for pool maintenance.
//!
//! This crate provides:
//! - Domain types (measurements, dosing actions, warnings)
//! - Dosing constants and the maintenance target policy
//! - Dosing engine
//! - Pool registry (in-memory and CSV)
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod policy;
pub mod engine;
pub mod pool;
pub mod registry;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use policy::{DosingPolicy, MaintenancePolicy};
pub use engine::evaluate;
pub use pool::{Pool, PoolInfo};
pub use registry::{CsvRegistry, MemoryRegistry, PoolRegistry};
pub use config::Config;
