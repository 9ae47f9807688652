//! Boot integrity report
//!
//! Runs once at startup, strictly before any network or update activity,
//! and surfaces what the bootloader left behind: which partition is
//! executing, its descriptor, the persisted verification state, and the
//! storage layer's SHA-256 digests of the boot-critical flash regions.
//! Read-only throughout; transitioning the verification state is the
//! bootloader/watchdog's job.

use core::fmt::Write;

use hal_abstractions::flash::{DigestRegion, FirmwareStorage, ImageState, PartitionInfo, DIGEST_LEN};
use heapless::String;
use log::{info, warn};

use super::descriptor::AppDescriptor;

/// Snapshot of the running image's identity and trust state.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootInfo {
    /// Partition the current image is executing from.
    pub partition: PartitionInfo,
    /// Its descriptor, `None` when unreadable.
    pub descriptor: Option<AppDescriptor>,
    /// Persisted verification state; `Undefined` when no record exists.
    pub state: ImageState,
}

/// Inspect the running image and log the report.
pub fn report<S: FirmwareStorage>(storage: &S) -> BootInfo {
    let running = storage.running();

    for (region, label) in [
        (DigestRegion::PartitionTable, "the partition table"),
        (DigestRegion::Bootloader, "bootloader"),
        (DigestRegion::Partition(running), "current firmware"),
    ] {
        match storage.digest(region) {
            Ok(digest) => info!("SHA-256 for {}: {}", label, hex(&digest)),
            Err(err) => warn!("SHA-256 for {} unavailable: {}", label, err),
        }
    }

    let descriptor = AppDescriptor::read_from(storage, running);
    if let Some(desc) = &descriptor {
        info!(
            "Running firmware: {} {} built {} {}",
            desc.project(),
            desc.version(),
            desc.build_date(),
            desc.build_time()
        );
    } else {
        warn!("Running partition has no readable descriptor");
    }

    let state = storage.image_state(running);
    info!("Running image state: {}", state.as_str());

    BootInfo {
        partition: running,
        descriptor,
        state,
    }
}

/// Descriptor of the currently running image, for telemetry queries.
pub fn running_descriptor<S: FirmwareStorage>(storage: &S) -> Option<AppDescriptor> {
    AppDescriptor::read_from(storage, storage.running())
}

fn hex(digest: &[u8; DIGEST_LEN]) -> String<{ DIGEST_LEN * 2 }> {
    let mut out = String::new();
    for byte in digest {
        // Two chars per byte, capacity is exactly DIGEST_LEN * 2.
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
