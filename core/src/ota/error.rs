#![deny(unsafe_code)]
#![deny(warnings)]
//! Update engine error types

/// Firmware update operation errors
///
/// Every failure is returned to the caller as a distinct value; the
/// engine never retries internally. Failures during `begin` admission
/// leave flash and the boot selection untouched; later failures spoil
/// only the inactive target partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateError {
    /// Another update session is already staged
    SessionAlreadyActive,
    /// Descriptor record has the wrong length
    BadDescriptorLength,
    /// Candidate version equals the running version
    NoOpRejected,
    /// Candidate version equals the version that last failed verification
    RollbackRejected,
    /// No inactive application partition to stage into
    NoAvailablePartition,
    /// Erase/open of the target partition failed
    Io,
    /// Flash write of an image chunk failed
    WriteFailed,
    /// Staged image failed the storage layer's integrity check
    ValidationFailed,
    /// Boot selection could not be persisted
    SetBootFailed,
    /// Operation not valid in the session's current state
    InvalidState,
}

impl core::fmt::Display for UpdateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SessionAlreadyActive => write!(f, "Update session already active"),
            Self::BadDescriptorLength => write!(f, "Bad descriptor length"),
            Self::NoOpRejected => write!(f, "Candidate matches running version"),
            Self::RollbackRejected => write!(f, "Candidate matches last invalid version"),
            Self::NoAvailablePartition => write!(f, "No inactive application partition"),
            Self::Io => write!(f, "Update partition open failed"),
            Self::WriteFailed => write!(f, "Image write failed"),
            Self::ValidationFailed => write!(f, "Image validation failed"),
            Self::SetBootFailed => write!(f, "Boot selection update failed"),
            Self::InvalidState => write!(f, "Invalid session state"),
        }
    }
}

impl core::error::Error for UpdateError {}
