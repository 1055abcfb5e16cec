/// Error returned from fallible `psyfit` operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid parameter bounds: {0}")]
    InvalidBounds(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("no trials found for session {0}")]
    UnknownSession(u32),

    #[error("parameter index {index} out of range for {ndim} parameters")]
    ParamIndexOutOfRange { index: usize, ndim: usize },

    #[error("posterior grid error: {0}")]
    Grid(&'static str),

    #[error("ensemble sampler failed: {0}")]
    Sampler(String),

    #[error("plotting failed: {0}")]
    Plot(String),
}
