//! # Telemetry Module
//!
//! Interface to the autopilot telemetry object store.
//!
//! This module handles:
//! - Data types for the objects the bridge reads and writes
//! - Object metadata (access and update-rate settings)
//! - Store events that drive autopilot liveness
//! - An in-memory store for the standalone binary and tests

pub mod memory;
pub mod objects;

use tokio::sync::mpsc;

pub use memory::MemoryStore;
pub use objects::{
    Access, ActuatorDesired, AltitudeActual, AttitudeActual, FixStatus, ObjectId,
    ObjectMetadata, PositionActual, TelemetryStats, TelemetryStatus, UpdateMode,
};

/// Notification published by the store about the autopilot link
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreEvent {
    /// Telemetry link to the autopilot came up
    Connected,
    /// Telemetry link to the autopilot went down
    Disconnected,
    /// The link statistics object was refreshed
    StatsUpdated(TelemetryStats),
}

/// Handle-based access to the telemetry object store
///
/// The store outlives the bridge and is shared with the host application,
/// so every method takes `&self` and implementations synchronize internally.
#[cfg_attr(test, mockall::automock)]
pub trait TelemetryStore: Send + Sync {
    /// Latest control outputs requested by the autopilot
    fn actuator_desired(&self) -> ActuatorDesired;

    /// Current telemetry link statistics
    fn telemetry_stats(&self) -> TelemetryStats;

    fn set_altitude_actual(&self, data: AltitudeActual);

    fn set_attitude_actual(&self, data: AttitudeActual);

    fn set_position_actual(&self, data: PositionActual);

    /// Replace the link settings of one object
    fn set_metadata(&self, id: ObjectId, metadata: ObjectMetadata);

    /// Register for link and statistics events
    fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreEvent>;
}

/// Objects the bridge reads, with their flight-side update period in ms
pub const INPUT_OBJECTS: &[(ObjectId, u32)] = &[(ObjectId::ActuatorDesired, 75)];

/// Objects the bridge writes, with their ground-side update period in ms
pub const OUTPUT_OBJECTS: &[(ObjectId, u32)] = &[
    (ObjectId::AltitudeActual, 250),
    (ObjectId::AttitudeActual, 75),
    (ObjectId::PositionActual, 250),
];

/// Configure update rates and access for every object the bridge exchanges
pub fn setup_objects<S: TelemetryStore + ?Sized>(store: &S) {
    for &(id, period) in INPUT_OBJECTS {
        store.set_metadata(id, ObjectMetadata::input(period));
    }
    for &(id, period) in OUTPUT_OBJECTS {
        store.set_metadata(id, ObjectMetadata::output(period));
    }
}
