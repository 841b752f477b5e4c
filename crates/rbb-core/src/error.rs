//! Error types for the ring block buffer
//!
//! Only construction can fail with an error value. Running out of space and
//! finding nothing ready are ordinary `Option` outcomes, and lifecycle misuse
//! is a panic.

use core::fmt;

/// Result type for ring block buffer construction
pub type RbbResult<T> = Result<T, RbbError>;

/// Errors that can occur while building a ring block buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RbbError {
    /// Backing buffer or descriptor pool could not be allocated
    NoMemory(AllocTarget),

    /// Requested sizes are unusable
    InvalidConfig(&'static str),
}

impl fmt::Display for RbbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RbbError::NoMemory(target) => write!(f, "no memory for {}", target),
            RbbError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for RbbError {}

/// Which heap allocation failed during `create`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocTarget {
    /// The byte storage blocks are carved from
    BackingBuffer,

    /// The block descriptor array
    DescriptorPool,
}

impl fmt::Display for AllocTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocTarget::BackingBuffer => write!(f, "backing buffer"),
            AllocTarget::DescriptorPool => write!(f, "descriptor pool"),
        }
    }
}

impl From<AllocTarget> for RbbError {
    fn from(target: AllocTarget) -> Self {
        RbbError::NoMemory(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = RbbError::NoMemory(AllocTarget::BackingBuffer);
        assert_eq!(format!("{}", e), "no memory for backing buffer");

        let e = RbbError::InvalidConfig("capacity must be at least 1");
        assert_eq!(format!("{}", e), "invalid config: capacity must be at least 1");
    }

    #[test]
    fn test_error_conversion() {
        let err: RbbError = AllocTarget::DescriptorPool.into();
        assert!(matches!(err, RbbError::NoMemory(AllocTarget::DescriptorPool)));
    }
}
