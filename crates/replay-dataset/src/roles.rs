//! Column-role classification.
//!
//! Column names are classified once per header into the roles that decide
//! how each cell is emitted on the wire. The classification sets are
//! injected configuration rather than hard-coded constants, so they can be
//! swapped per dataset without code changes. The defaults match the Cisco
//! baseline telemetry export this tool was originally built around.

use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// The role a column plays in every emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// The designated timestamp column; never emitted as a field.
    Timestamp,
    /// Categorical identifier, written before all other fields.
    Symbol,
    /// Boolean-valued measurement field.
    Boolean,
    /// 64-bit integer measurement field (the default for unknown names).
    Numeric,
}

/// Classification sets mapping column names to roles.
///
/// Loadable from YAML; [`RoleConfig::default`] carries the built-in sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleConfig {
    /// Name of the timestamp column.
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,

    /// Columns whose values are repeated categorical identifiers.
    #[serde(default)]
    pub symbol_columns: BTreeSet<String>,

    /// Columns carrying boolean values.
    #[serde(default)]
    pub boolean_columns: BTreeSet<String>,
}

fn default_timestamp_column() -> String {
    "time".to_string()
}

impl Default for RoleConfig {
    fn default() -> Self {
        let symbol_columns = [
            "name",
            "EncodingPath",
            "Producer",
            "af_name",
            "instance_name",
            "interface_name",
            "node_name",
            "route_table_name",
            "saf_name",
            "vrf_name",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let boolean_columns =
            ["performance_statistics__global__ipv4rib_server__is_rib_connection_up"]
                .into_iter()
                .map(String::from)
                .collect();

        Self {
            timestamp_column: default_timestamp_column(),
            symbol_columns,
            boolean_columns,
        }
    }
}

impl RoleConfig {
    /// Load a role configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a role configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, DatasetError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Classify a single column name.
    ///
    /// Pure and total: every name maps to exactly one role, defaulting to
    /// [`ColumnRole::Numeric`]. The timestamp name wins over set membership.
    pub fn classify(&self, name: &str) -> ColumnRole {
        if name == self.timestamp_column {
            ColumnRole::Timestamp
        } else if self.symbol_columns.contains(name) {
            ColumnRole::Symbol
        } else if self.boolean_columns.contains(name) {
            ColumnRole::Boolean
        } else {
            ColumnRole::Numeric
        }
    }
}

/// Per-header role cache, positionally aligned with the header.
///
/// Roles are static for the process lifetime, so they are computed exactly
/// once per dataset and shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct RoleTable {
    roles: Vec<ColumnRole>,
    timestamp_index: Option<usize>,
}

impl RoleTable {
    /// Classify every header column once.
    pub fn new(header: &[String], config: &RoleConfig) -> Self {
        let roles: Vec<ColumnRole> = header.iter().map(|name| config.classify(name)).collect();
        let timestamp_index = roles.iter().position(|r| *r == ColumnRole::Timestamp);
        Self {
            roles,
            timestamp_index,
        }
    }

    /// Role of the column at `index`.
    pub fn role(&self, index: usize) -> ColumnRole {
        self.roles[index]
    }

    /// All roles, in header order.
    pub fn roles(&self) -> &[ColumnRole] {
        &self.roles
    }

    /// Position of the first timestamp column, if any.
    pub fn timestamp_index(&self) -> Option<usize> {
        self.timestamp_index
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// True when the header had no columns.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
