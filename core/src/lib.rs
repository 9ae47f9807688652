//! Platform-agnostic core logic for the counter-node firmware
//!
//! This crate contains the business logic shared across all supported
//! boards: the firmware update engine with its boot integrity report,
//! telemetry payload formatting, and the persisted settings schema.
//! It has NO hardware dependencies; boards implement the
//! `hal-abstractions` traits and hand them in. Everything here builds
//! and tests on the host.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod config;
pub mod ota;
pub mod sensor;
pub mod telemetry;
