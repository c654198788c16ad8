use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{param} must be a positive integer")]
    InvalidInteger { param: &'static str },

    #[error("verbosity must be one of 0, 1, 2")]
    InvalidVerbosity,

    #[error("sort_by must be one of {choices}")]
    InvalidSortBy { choices: String },

    #[error("sort_dir must be one of {choices}")]
    InvalidSortDir { choices: String },

    #[error("invalid timestamp format provided")]
    InvalidTimestamp { param: &'static str },

    #[error("{from} must not be later than {to}")]
    InvertedRange { from: &'static str, to: &'static str },
}

impl QueryError {
    /// Raised while converting raw values, before any whitelist checks
    pub fn is_malformed(&self) -> bool {
        matches!(self, QueryError::InvalidInteger { .. } | QueryError::InvalidVerbosity)
    }
}
