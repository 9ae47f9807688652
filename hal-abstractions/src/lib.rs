//! Hardware abstraction traits for the counter-node firmware
//!
//! This crate defines traits that abstract over hardware differences
//! between boards, plus the small data types those traits exchange.
//! BSPs implement these traits; `counter-core` consumes them.

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod flash;
pub mod kv;
pub mod sensor;
