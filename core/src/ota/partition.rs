//! Update slot selection
//!
//! Classic A/B rotation generalized to N application slots: the update
//! target is the lowest app slot after the running one, wrapping around.
//! A running image outside the app slots (factory image) rotates to the
//! lowest app slot. Data partitions are never candidates.

use hal_abstractions::flash::PartitionInfo;

use super::error::UpdateError;

/// Pick the inactive application partition to stage the next image into.
///
/// Deterministic for a given table and running partition, and never
/// returns the running partition itself. Fails with
/// [`UpdateError::NoAvailablePartition`] when the table holds no other
/// application slot.
pub fn select_update_target(
    table: &[PartitionInfo],
    running: PartitionInfo,
) -> Result<PartitionInfo, UpdateError> {
    let running_slot = running.app_slot();

    // Lowest slot overall (wrap target) and lowest slot after the running
    // one, both excluding the running partition itself.
    let mut first: Option<(u8, PartitionInfo)> = None;
    let mut next: Option<(u8, PartitionInfo)> = None;

    for &partition in table {
        let Some(slot) = partition.app_slot() else {
            continue;
        };
        if partition.address == running.address {
            continue;
        }

        if first.map_or(true, |(s, _)| slot < s) {
            first = Some((slot, partition));
        }
        if let Some(running_slot) = running_slot {
            if slot > running_slot && next.map_or(true, |(s, _)| slot < s) {
                next = Some((slot, partition));
            }
        }
    }

    next.or(first)
        .map(|(_, partition)| partition)
        .ok_or(UpdateError::NoAvailablePartition)
}
