//! Dataset loading and column-role classification for telemetry replay.
//!
//! This crate owns the read-only inputs of a replay job:
//!
//! - [`Dataset`] - an immutable header plus ordered data rows, loaded from a
//!   CSV file (optionally gzip-compressed) and shared by reference across
//!   all workers
//! - [`RoleConfig`] - injected classification sets mapping column names to
//!   [`ColumnRole`]s, with YAML overrides
//! - [`RoleTable`] - the per-header role cache computed once per dataset
//!
//! # Example
//!
//! ```ignore
//! use replay_dataset::{Dataset, RoleConfig, RoleTable};
//!
//! let dataset = Dataset::from_path("./telemetry.csv.gz")?;
//! let config = RoleConfig::default();
//! let roles = RoleTable::new(dataset.header(), &config);
//! ```

mod dataset;
mod error;
mod roles;

pub use dataset::Dataset;
pub use error::DatasetError;
pub use roles::{ColumnRole, RoleConfig, RoleTable};
