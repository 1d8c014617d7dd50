use thiserror::Error;

/// Errors from querying the running system's version.
#[derive(Error, Debug)]
pub enum DetectError {
    /// The kernel version query returned a failure status. A process where
    /// this happens cannot meaningfully gate anything on the OS version.
    #[error("RtlGetVersion failed with status {status:#010x}")]
    VersionQueryFailed { status: i32 },
}

pub type Result<T> = std::result::Result<T, DetectError>;
