//! Central error handling for groundworks
//!
//! Provides a unified RenderError enum with consistent categorization for
//! pipeline misuse and device-reported faults.

/// Centralized error type for all pipeline operations
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// An index or span exceeded a device-reported limit.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// An operation was issued against an invalid cached state, e.g. binding
    /// vertex buffers with no vertex array bound.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A fatal error reported through the device's diagnostic channel.
    #[error("Device fault: {0}")]
    DeviceFault(String),
}

impl RenderError {
    /// Convenience constructors for common error types
    pub fn out_of_range<T: ToString>(msg: T) -> Self {
        RenderError::OutOfRange(msg.to_string())
    }

    pub fn invalid_state<T: ToString>(msg: T) -> Self {
        RenderError::InvalidState(msg.to_string())
    }

    pub fn device_fault<T: ToString>(msg: T) -> Self {
        RenderError::DeviceFault(msg.to_string())
    }
}

/// Result type alias for pipeline operations
pub type RenderResult<T> = Result<T, RenderError>;
