use thiserror::Error;

/// The main error type for engine operations
#[derive(Error, Debug)]
pub enum Error {
    /// Installing or running the OS input hook failed
    #[error("Input hook error: {0}")]
    Hook(String),

    /// Injecting a synthetic key or mouse event failed
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Writing the clipboard failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// A notification sink rejected an update
    #[error("Sink error: {0}")]
    Sink(String),

    /// Mapping-layer errors
    #[error(transparent)]
    Mapping(#[from] seqmap::Error),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;
