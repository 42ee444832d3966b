// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node '{node}' is missing required field '{field}' (set it on the item or under nodes.defaults)")]
    MissingNodeField { node: String, field: &'static str },

    #[error("duplicate node name '{0}' in nodes.items")]
    DuplicateNode(String),

    #[error("{node}: failed to detect macOS version (empty sw_vers output); fabricnet requires macOS Tahoe 26.2+")]
    EmptyVersion { node: String },

    #[error("{node}: unexpected macOS version string from sw_vers: '{raw}'; fabricnet requires macOS Tahoe 26.2+")]
    InvalidVersion { node: String, raw: String },

    #[error("{node}: unsupported macOS {raw}; fabricnet requires macOS Tahoe 26.2+")]
    UnsupportedVersion { node: String, raw: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
