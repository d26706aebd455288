//! Error types.
//!
//! Only malformed input is an error. Degenerate geometry (zero-length sides,
//! near-collinear corners) is recovered where it happens and logged.

use thiserror::Error;

/// Failure to read an imperial distance string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("distance string is blank")]
    Blank,

    #[error("invalid feet value: {raw:?}")]
    InvalidFeet { raw: String },

    #[error("invalid inch value: {raw:?}")]
    InvalidInches { raw: String },

    #[error("invalid distance: {raw:?}")]
    Malformed { raw: String },

    #[error("fraction has a zero denominator: {raw:?}")]
    ZeroDenominator { raw: String },

    #[error("distance must be > 0: {raw:?}")]
    NotPositive { raw: String },
}

/// Failure to turn a raw settings bundle into a [`crate::RailingConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("setting {key} is not a valid distance")]
    Distance {
        key: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("setting {key} must be at least {min}")]
    BelowMinimum { key: &'static str, min: &'static str },

    #[error("setting {key} cannot be blank")]
    BlankValue { key: &'static str },

    #[error("line reference must be LEFT, RIGHT, or MIDDLE, got {raw:?}")]
    InvalidLineRef { raw: String },

    #[error("setting {key} must be 0 or 1, got {raw:?}")]
    InvalidFlag { key: &'static str, raw: String },

    #[error("setting {key} must be an integer, got {raw:?}")]
    InvalidCount { key: &'static str, raw: String },
}

/// Failure of a whole layout invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("need at least 2 distinct pick points, got {count}")]
    TooFewPoints { count: usize },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
