//! Database connectivity for behave.
//!
//! The chat client itself keeps no state on disk; this crate only verifies
//! that the configured MongoDB deployment answers a ping.
//!
//! # Example
//!
//! ```ignore
//! use behave_store::DatabaseProbe;
//!
//! let report = DatabaseProbe::new("mongodb://localhost:27017").probe().await?;
//! println!("ping took {:?}", report.latency);
//! ```

mod error;
mod probe;

pub use error::{Result, StoreError};
pub use probe::{DatabaseProbe, ProbeReport};
