use thiserror::Error;

/// Error reported by the operating system for a failed call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("os error {code}: {message}")]
pub struct OsError {
    pub code: u32,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("window class registration failed: {0}")]
    Registration(OsError),

    #[error("window creation failed: {0}")]
    WindowCreation(OsError),

    #[error("{call} failed: {source}")]
    Os {
        call: &'static str,
        source: OsError,
    },

    #[error("failed to allocate a {width}x{height} pixel buffer")]
    Allocation { width: i32, height: i32 },

    #[error("invalid pixel buffer dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("text contains an interior nul byte: {0:?}")]
    InvalidText(String),
}

impl Error {
    pub fn os(call: &'static str, source: OsError) -> Self {
        Error::Os { call, source }
    }
}
