//! Update admission checks
//!
//! Two images are off-limits as update candidates: the version currently
//! running (the update would be a no-op) and the version the bootloader
//! last rolled back from (re-flashing it would loop forever between flash
//! and rollback). Comparison is byte equality on the fixed-width version
//! field; there is no ordering between versions.

use super::descriptor::AppDescriptor;
use super::error::UpdateError;

/// Why a candidate descriptor was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuardRejection {
    /// Candidate version equals the running version.
    SameAsRunning,
    /// Candidate version equals the last rolled-back version.
    SameAsLastInvalid,
}

impl From<GuardRejection> for UpdateError {
    fn from(rejection: GuardRejection) -> Self {
        match rejection {
            GuardRejection::SameAsRunning => UpdateError::NoOpRejected,
            GuardRejection::SameAsLastInvalid => UpdateError::RollbackRejected,
        }
    }
}

/// Check a candidate against the running and last-rolled-back versions.
///
/// The last-invalid comparison runs first: a candidate equal to both
/// classifies as a rollback repeat. An absent side never matches;
/// `last_invalid` is `None` when no rollback has occurred, `running` when
/// the running image's descriptor is unreadable.
pub fn validate(
    candidate: &AppDescriptor,
    running: Option<&AppDescriptor>,
    last_invalid: Option<&AppDescriptor>,
) -> Result<(), GuardRejection> {
    if let Some(invalid) = last_invalid {
        if candidate.same_version(invalid) {
            return Err(GuardRejection::SameAsLastInvalid);
        }
    }

    if let Some(running) = running {
        if candidate.same_version(running) {
            return Err(GuardRejection::SameAsRunning);
        }
    }

    Ok(())
}
