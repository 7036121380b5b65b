//! In-memory telemetry object store

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

use super::{
    ActuatorDesired, AltitudeActual, AttitudeActual, ObjectId, ObjectMetadata, PositionActual,
    StoreEvent, TelemetryStats, TelemetryStore,
};

#[derive(Debug, Default)]
struct Objects {
    actuator_desired: ActuatorDesired,
    altitude_actual: AltitudeActual,
    attitude_actual: AttitudeActual,
    position_actual: PositionActual,
    telemetry_stats: TelemetryStats,
    metadata: HashMap<ObjectId, ObjectMetadata>,
}

/// Telemetry store kept entirely in process memory
///
/// Stands in for the real object manager when the bridge runs standalone.
/// The host side drives it through [`MemoryStore::set_actuator_desired`],
/// [`MemoryStore::set_telemetry_stats`] and [`MemoryStore::publish`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<Objects>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<StoreEvent>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, Objects> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver an event to every live subscriber, dropping closed ones
    pub fn publish(&self, event: StoreEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event).is_ok());
        debug!("Published {:?} to {} subscribers", event, subscribers.len());
    }

    pub fn set_actuator_desired(&self, data: ActuatorDesired) {
        self.objects().actuator_desired = data;
    }

    /// Update link statistics and notify subscribers
    pub fn set_telemetry_stats(&self, stats: TelemetryStats) {
        self.objects().telemetry_stats = stats;
        self.publish(StoreEvent::StatsUpdated(stats));
    }

    pub fn altitude_actual(&self) -> AltitudeActual {
        self.objects().altitude_actual
    }

    pub fn attitude_actual(&self) -> AttitudeActual {
        self.objects().attitude_actual
    }

    pub fn position_actual(&self) -> PositionActual {
        self.objects().position_actual
    }

    pub fn metadata(&self, id: ObjectId) -> Option<ObjectMetadata> {
        self.objects().metadata.get(&id).copied()
    }
}

impl TelemetryStore for MemoryStore {
    fn actuator_desired(&self) -> ActuatorDesired {
        self.objects().actuator_desired
    }

    fn telemetry_stats(&self) -> TelemetryStats {
        self.objects().telemetry_stats
    }

    fn set_altitude_actual(&self, data: AltitudeActual) {
        self.objects().altitude_actual = data;
    }

    fn set_attitude_actual(&self, data: AttitudeActual) {
        self.objects().attitude_actual = data;
    }

    fn set_position_actual(&self, data: PositionActual) {
        self.objects().position_actual = data;
    }

    fn set_metadata(&self, id: ObjectId, metadata: ObjectMetadata) {
        self.objects().metadata.insert(id, metadata);
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }
}
