//! Error types for Profiles

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Lookup Errors
    #[error("The specified member does not exist: {0}")]
    NoSuchMember(String),

    #[error("The specified group does not exist: {0}")]
    NoSuchGroup(String),

    // Validation Errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing form field: {0}")]
    MissingField(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Directory Errors
    #[error("Directory connection error: {0}")]
    Connection(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Stable identifier reported in JSON output
    pub fn code(&self) -> &'static str {
        match self {
            Error::NoSuchMember(_) => "NoSuchMember",
            Error::NoSuchGroup(_) => "NoSuchGroup",
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::MissingField(_) => "MissingField",
            Error::Config(_) => "ConfigError",
            Error::Connection(_) => "DirectoryUnavailable",
            Error::Directory(_) => "DirectoryError",
            Error::Io(_) => "InternalError",
            Error::Other(_) => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::NoSuchMember("jdoe".to_string());
        assert_eq!(err.code(), "NoSuchMember");
        assert_eq!(err.to_string(), "The specified member does not exist: jdoe");

        let err = Error::MissingField("name".to_string());
        assert_eq!(err.code(), "MissingField");

        let err = Error::Connection("refused".to_string());
        assert_eq!(err.code(), "DirectoryUnavailable");
    }
}
