//! # HITL Bridge Library
//!
//! Fly an autopilot against the IL-2 flight simulator.
//!
//! This library relays the autopilot's control outputs to the simulator over
//! UDP and feeds the simulated flight state back into the autopilot's
//! telemetry objects, tracking the liveness of both sides.

pub mod atmosphere;
pub mod bridge;
pub mod config;
pub mod error;
pub mod flight;
pub mod il2;
pub mod link;
pub mod logging;
pub mod net;
pub mod telemetry;
pub mod units;
