//! Domain error types.
//!
//! Data-layer faults (a probe finding nothing, an unreadable cache file) are
//! absorbed into empty-series sentinels so batch runs survive individual
//! failures; only malformed user input surfaces as a hard error.

/// Top-level error type for dcasim.
#[derive(Debug, thiserror::Error)]
pub enum DcasimError {
    #[error("unsupported symbol suffix: {suffix}")]
    UnsupportedSuffix { suffix: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy type: {kind}")]
    UnknownStrategy { kind: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DcasimError> for std::process::ExitCode {
    fn from(err: &DcasimError) -> Self {
        let code: u8 = match err {
            DcasimError::Io(_) => 1,
            DcasimError::ConfigParse { .. }
            | DcasimError::ConfigMissing { .. }
            | DcasimError::ConfigInvalid { .. } => 2,
            DcasimError::UnsupportedSuffix { .. } | DcasimError::UnknownStrategy { .. } => 4,
            DcasimError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
