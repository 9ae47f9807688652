//! Staged firmware update session
//!
//! Sequences `begin` → `write`* → `end` → `commit` against a
//! [`FirmwareStorage`] backend. The [`Updater`] owns the backend and at
//! most one session; that single slot is the device-wide exclusivity
//! guarantee, since nothing in the core runs concurrently. A session that
//! reaches `Failed` is discarded, never retried: the running image and
//! the boot selection are untouched by anything before `commit`, so the
//! device stays bootable and the transport layer decides whether to
//! request the image again.

use hal_abstractions::flash::{FirmwareStorage, PartitionInfo, WriteToken};
use log::{error, info, warn};

use super::descriptor::{AppDescriptor, DESCRIPTOR_LEN};
use super::error::UpdateError;
use super::guard;
use super::partition::select_update_target;

/// Lifecycle of one staged update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No session staged.
    Idle,
    /// Descriptor admitted, target erased and open.
    Begun,
    /// At least one image chunk written.
    Writing,
    /// Image finalized and validated by the storage layer.
    Ended,
    /// Boot selection points at the staged image. Terminal.
    Committed,
    /// Session spoiled; discard and begin anew. Terminal.
    Failed,
}

impl SessionState {
    /// Terminal states release the session slot.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Committed | SessionState::Failed)
    }

    /// A session in an active state holds the slot.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Begun | SessionState::Writing | SessionState::Ended
        )
    }
}

/// One staged update: candidate identity, target slot, open write cycle,
/// progress. Lives from `begin` to a terminal transition.
#[derive(Debug)]
struct Session {
    state: SessionState,
    descriptor: AppDescriptor,
    target: Option<PartitionInfo>,
    token: Option<WriteToken>,
    written: usize,
}

impl Session {
    fn failed(descriptor: AppDescriptor, target: Option<PartitionInfo>) -> Self {
        Self {
            state: SessionState::Failed,
            descriptor,
            target,
            token: None,
            written: 0,
        }
    }
}

/// Firmware update engine: owns the storage backend and the single
/// session slot.
pub struct Updater<S> {
    storage: S,
    session: Option<Session>,
}

impl<S: FirmwareStorage> Updater<S> {
    /// Wrap a storage backend with no session staged.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            session: None,
        }
    }

    /// Current session state. Terminal outcomes stay visible until the
    /// next `begin` replaces the session.
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, |session| session.state)
    }

    /// Cumulative image bytes written by the current session.
    pub fn bytes_written(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |session| session.written)
    }

    /// Target partition of the current session, if one was selected.
    pub fn target(&self) -> Option<PartitionInfo> {
        self.session.as_ref().and_then(|session| session.target)
    }

    /// Candidate descriptor of the current session.
    pub fn candidate(&self) -> Option<&AppDescriptor> {
        self.session.as_ref().map(|session| &session.descriptor)
    }

    /// Borrow the backend for read-only queries.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Tear down the engine and hand the backend back.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Admit a descriptor and open a session staging into the inactive
    /// slot.
    ///
    /// Admission failures (`BadDescriptorLength`, `NoOpRejected`,
    /// `RollbackRejected`) touch nothing: no partition is selected or
    /// erased, and the slot stays free. Once admission passes, selector
    /// and erase/open failures leave a terminal `Failed` session.
    pub fn begin(&mut self, descriptor: &[u8]) -> Result<(), UpdateError> {
        if self.state().is_active() {
            warn!("Update already in progress, rejecting begin");
            return Err(UpdateError::SessionAlreadyActive);
        }

        info!("Starting firmware update");

        if descriptor.len() != DESCRIPTOR_LEN {
            warn!(
                "Bad descriptor length {} (expected {})",
                descriptor.len(),
                DESCRIPTOR_LEN
            );
            return Err(UpdateError::BadDescriptorLength);
        }
        let candidate =
            AppDescriptor::from_bytes(descriptor).ok_or(UpdateError::BadDescriptorLength)?;
        info!("New firmware version: {}", candidate.version());

        let running = self.storage.running();
        match self.storage.boot_target() {
            Ok(configured) if configured.address != running.address => {
                // Happens when the boot selection record or the preferred
                // image got corrupted and the loader fell back.
                warn!(
                    "Boot selector points at 0x{:08x}, but running from 0x{:08x}",
                    configured.address, running.address
                );
            }
            _ => {}
        }

        let running_desc = AppDescriptor::read_from(&self.storage, running);
        if let Some(desc) = &running_desc {
            info!("Running firmware version: {}", desc.version());
        }

        let invalid_desc = self
            .storage
            .last_invalid()
            .and_then(|partition| AppDescriptor::read_from(&self.storage, partition));
        if let Some(desc) = &invalid_desc {
            info!("Last invalid firmware version: {}", desc.version());
        }

        guard::validate(&candidate, running_desc.as_ref(), invalid_desc.as_ref()).map_err(
            |rejection| {
                match rejection {
                    guard::GuardRejection::SameAsRunning => {
                        warn!("Candidate is the running version, not continuing the update");
                    }
                    guard::GuardRejection::SameAsLastInvalid => {
                        warn!(
                            "Candidate {} already failed to boot and was rolled back",
                            candidate.version()
                        );
                    }
                }
                UpdateError::from(rejection)
            },
        )?;

        let target = match select_update_target(self.storage.partitions(), running) {
            Ok(target) => target,
            Err(err) => {
                error!("No inactive application partition available");
                self.session = Some(Session::failed(candidate, None));
                return Err(err);
            }
        };
        info!(
            "Writing to partition at 0x{:08x} (size 0x{:x})",
            target.address, target.size
        );

        let token = match self.storage.begin_write(target) {
            Ok(token) => token,
            Err(err) => {
                error!("Opening update partition failed: {}", err);
                self.session = Some(Session::failed(candidate, Some(target)));
                return Err(UpdateError::Io);
            }
        };

        self.session = Some(Session {
            state: SessionState::Begun,
            descriptor: candidate,
            target: Some(target),
            token: Some(token),
            written: 0,
        });
        info!("Update session begun");
        Ok(())
    }

    /// Append one image chunk to the staged update. Chunks are consumed
    /// strictly in arrival order; the call blocks until the chunk is
    /// durably written or failed.
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), UpdateError> {
        let Self { storage, session } = self;
        let Some(session) = session.as_mut() else {
            return Err(UpdateError::InvalidState);
        };
        if !matches!(session.state, SessionState::Begun | SessionState::Writing) {
            return Err(UpdateError::InvalidState);
        }
        let Some(token) = session.token else {
            return Err(UpdateError::InvalidState);
        };

        match storage.write(token, chunk) {
            Ok(()) => {
                session.written += chunk.len();
                session.state = SessionState::Writing;
                info!("Written image length {}", session.written);
                Ok(())
            }
            Err(err) => {
                error!("Image write failed: {}", err);
                session.state = SessionState::Failed;
                Err(UpdateError::WriteFailed)
            }
        }
    }

    /// Finalize the staged image; the storage layer runs its integrity
    /// and size checks here.
    pub fn end(&mut self) -> Result<(), UpdateError> {
        let Self { storage, session } = self;
        let Some(session) = session.as_mut() else {
            return Err(UpdateError::InvalidState);
        };
        if session.state != SessionState::Writing {
            return Err(UpdateError::InvalidState);
        }
        let Some(token) = session.token else {
            return Err(UpdateError::InvalidState);
        };

        match storage.finish_write(token) {
            Ok(()) => {
                session.state = SessionState::Ended;
                info!("Image finalized after {} bytes", session.written);
                Ok(())
            }
            Err(err) => {
                error!("Image validation failed, image is corrupted: {}", err);
                session.state = SessionState::Failed;
                Err(UpdateError::ValidationFailed)
            }
        }
    }

    /// Point the boot selector at the staged image. On failure the
    /// running partition and the previous selection are unaffected.
    pub fn commit(&mut self) -> Result<(), UpdateError> {
        let Self { storage, session } = self;
        let Some(session) = session.as_mut() else {
            return Err(UpdateError::InvalidState);
        };
        if session.state != SessionState::Ended {
            return Err(UpdateError::InvalidState);
        }
        let Some(target) = session.target else {
            return Err(UpdateError::InvalidState);
        };

        match storage.set_boot_target(target) {
            Ok(()) => {
                session.state = SessionState::Committed;
                info!(
                    "Update to {} committed, boots from 0x{:08x} on next restart",
                    session.descriptor.version(),
                    target.address
                );
                Ok(())
            }
            Err(err) => {
                error!("Persisting boot selection failed: {}", err);
                session.state = SessionState::Failed;
                Err(UpdateError::SetBootFailed)
            }
        }
    }
}


#[cfg(test)]
impl<S: FirmwareStorage> Updater<S> {
    /// Test-only backend access for fault injection.
    pub(crate) fn storage_mut_for_test(&mut self) -> &mut S {
        &mut self.storage
    }
}
