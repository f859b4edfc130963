use thiserror::Error;

/// The main error type for mapping operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed mapping value, e.g. a screen position that is not "x,y"
    #[error("Invalid mapping value: {0}")]
    Format(String),

    /// The sequence is already bound in the other mapping table
    #[error("Sequence already in use: {0}")]
    SequenceInUse(String),

    /// Reading or writing the mapping document failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
