//! Error types for the props policy

use thiserror::Error;

/// Errors raised while applying identity overrides or gating attestation.
#[derive(Error, Debug)]
pub enum PropsError {
    /// Field name outside the closed identity field set
    #[error("unknown identity field: {0}")]
    UnknownField(String),

    /// Value could not be coerced into the field's integer type
    #[error("failed to parse value {value:?} for field {field}")]
    TypeCoercion { field: String, value: String },

    /// Key attestation refused for an integrity-verification caller
    #[error("key attestation unsupported for caller (gms: {is_gms}, finsky: {is_finsky})")]
    AttestationBlocked { is_gms: bool, is_finsky: bool },

    /// Malformed policy configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PropsError {
    /// Whether the error must abort the caller's operation.
    ///
    /// Everything except a blocked attestation is logged and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AttestationBlocked { .. })
    }
}

/// Result type for props operations
pub type Result<T> = std::result::Result<T, PropsError>;
