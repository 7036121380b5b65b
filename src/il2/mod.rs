//! # IL-2 DeviceLink Protocol Module
//!
//! Implementation of the text datagram protocol spoken by the simulator.
//!
//! This module handles:
//! - Command packet encoding (control surfaces, power, attitude overlay)
//! - Answer packet decoding into flight snapshots
//! - Unit and coordinate conversion at the protocol boundary

pub mod protocol;
pub mod encoder;
pub mod decoder;
