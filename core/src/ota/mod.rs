//! Firmware update engine and boot integrity reporting
//!
//! Staging a replacement image is the one stateful, partially-failing,
//! irreversible thing this firmware does, so it lives behind an explicit
//! session: `begin` admits a descriptor, `write` streams the image into
//! the inactive slot, `end` lets the storage layer validate it, and
//! `commit` flips the boot selector. The admission checks ([`guard`]) and
//! slot rotation ([`partition`]) are pure functions; [`boot`] is the
//! read-only startup report of what the bootloader left behind.

pub mod boot;
pub mod descriptor;
pub mod error;
pub mod guard;
pub mod partition;
pub mod session;

#[cfg(test)]
pub(crate) mod testflash;

pub use boot::{report, running_descriptor, BootInfo};
pub use descriptor::{AppDescriptor, DESCRIPTOR_LEN};
pub use error::UpdateError;
pub use guard::GuardRejection;
pub use partition::select_update_target;
pub use session::{SessionState, Updater};
