//! # Bridge Orchestrator
//!
//! Runs the closed loop between the telemetry store and the simulator.
//!
//! A single event loop owns every piece of mutable bridge state. Each turn it
//! waits for the next [`BridgeEvent`] (transmit tick, inbound datagram, store
//! event, liveness deadline) and dispatches it:
//!
//! - **Tick**: read the actuator object, encode, send
//! - **DatagramArrived**: feed simulator liveness, decode, derive rates,
//!   write altitude, attitude and position objects
//! - **Telemetry**: drive autopilot liveness
//! - **DeadlineReached**: confirm the timeout against the last contact
//!
//! The host observes the bridge through a [`BridgeHandle`]: edge-triggered
//! [`Notification`]s and synchronous connection queries.

use std::fmt;
use std::future::Future;
use std::io::ErrorKind;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::atmosphere::{pressure_at_altitude, temperature_celsius_at_altitude};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::flight::{derive_rates, FlightSnapshot};
use crate::il2::decoder::decode_inbound;
use crate::il2::encoder::encode_outbound;
use crate::il2::protocol::MAX_DATAGRAM_SIZE;
use crate::link::{LinkEdge, LinkMonitor, Peer};
use crate::net::DatagramIo;
use crate::telemetry::{
    setup_objects, AltitudeActual, AttitudeActual, FixStatus, PositionActual, StoreEvent,
    TelemetryStatus, TelemetryStore,
};
use crate::units::PA_PER_KPA;

/// Number of received packets between status log messages
const LOG_INTERVAL_PACKETS: u64 = 500;

/// Satellite count reported with simulated positions
const SIMULATED_SATELLITES: u8 = 7;

/// Notification emitted to the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Started,
    AutopilotConnected,
    AutopilotDisconnected,
    SimulatorConnected,
    SimulatorDisconnected,
}

impl Notification {
    fn from_edge(peer: Peer, edge: LinkEdge) -> Self {
        match (peer, edge) {
            (Peer::Autopilot, LinkEdge::Connected) => Notification::AutopilotConnected,
            (Peer::Autopilot, LinkEdge::Disconnected) => Notification::AutopilotDisconnected,
            (Peer::Simulator, LinkEdge::Connected) => Notification::SimulatorConnected,
            (Peer::Simulator, LinkEdge::Disconnected) => Notification::SimulatorDisconnected,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Notification::Started => "bridge started",
            Notification::AutopilotConnected => "autopilot connected",
            Notification::AutopilotDisconnected => "autopilot disconnected",
            Notification::SimulatorConnected => "simulator connected",
            Notification::SimulatorDisconnected => "simulator disconnected",
        };
        f.write_str(text)
    }
}

/// Connection state of both peers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStatus {
    pub autopilot: bool,
    pub simulator: bool,
}

/// Packet counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub packets_sent: u64,
    pub send_failures: u64,
    pub packets_received: u64,
    pub decode_failures: u64,
}

/// Input to one turn of the event loop
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// Transmit period elapsed
    Tick,
    /// Datagram received from the simulator side
    DatagramArrived(Bytes),
    /// Event published by the telemetry store
    Telemetry(StoreEvent),
    /// A peer's liveness deadline passed
    DeadlineReached(Peer),
}

/// Host-side view of a running bridge
#[derive(Debug)]
pub struct BridgeHandle {
    notifications: mpsc::UnboundedReceiver<Notification>,
    status: watch::Receiver<LinkStatus>,
}

impl BridgeHandle {
    pub fn is_autopilot_connected(&self) -> bool {
        self.status.borrow().autopilot
    }

    pub fn is_simulator_connected(&self) -> bool {
        self.status.borrow().simulator
    }

    /// Watch channel that changes whenever either peer connects or drops
    pub fn status(&self) -> watch::Receiver<LinkStatus> {
        self.status.clone()
    }

    /// Wait for the next notification
    ///
    /// Returns `None` once the bridge has stopped and every notification
    /// has been consumed.
    pub async fn next_notification(&mut self) -> Option<Notification> {
        self.notifications.recv().await
    }

    /// Take the next notification if one is already queued
    pub fn try_next_notification(&mut self) -> Option<Notification> {
        self.notifications.try_recv().ok()
    }
}

/// Hardware-in-the-loop bridge between a telemetry store and the simulator
pub struct Bridge<S: TelemetryStore + ?Sized, D: DatagramIo> {
    config: BridgeConfig,
    store: Arc<S>,
    io: D,
    store_events: mpsc::UnboundedReceiver<StoreEvent>,
    autopilot: LinkMonitor,
    simulator: LinkMonitor,
    current: Option<FlightSnapshot>,
    old: Option<FlightSnapshot>,
    stats: BridgeStats,
    notify_tx: mpsc::UnboundedSender<Notification>,
    status_tx: watch::Sender<LinkStatus>,
}

impl<S: TelemetryStore + ?Sized, D: DatagramIo> fmt::Debug for Bridge<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("autopilot", &self.autopilot)
            .field("simulator", &self.simulator)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Sleep until the deadline, or forever without one
async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl<S: TelemetryStore + ?Sized, D: DatagramIo> Bridge<S, D> {
    /// Create a bridge and the handle the host observes it through
    ///
    /// Subscribes to the store's events once, here.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated runtime configuration
    /// * `store` - Shared telemetry object store
    /// * `io` - Datagram link to the simulator
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration does not validate
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use hitl_bridge::bridge::Bridge;
    /// use hitl_bridge::config::BridgeConfig;
    /// use hitl_bridge::net::UdpLink;
    /// use hitl_bridge::telemetry::MemoryStore;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let config = BridgeConfig::new("127.0.0.1", 1100, "45.0", "-93.0")?;
    ///     let link = UdpLink::bind(&config).await?;
    ///     let (bridge, mut handle) = Bridge::new(config, Arc::new(MemoryStore::new()), link)?;
    ///
    ///     tokio::spawn(bridge.run(async {
    ///         let _ = tokio::signal::ctrl_c().await;
    ///     }));
    ///
    ///     while let Some(notification) = handle.next_notification().await {
    ///         println!("{}", notification);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn new(config: BridgeConfig, store: Arc<S>, io: D) -> Result<(Self, BridgeHandle)> {
        config.validate()?;

        let (notify_tx, notifications) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(LinkStatus::default());
        let store_events = store.subscribe();

        let bridge = Self {
            autopilot: LinkMonitor::new(Peer::Autopilot, config.autopilot_timeout),
            simulator: LinkMonitor::new(Peer::Simulator, Some(config.simulator_timeout)),
            config,
            store,
            io,
            store_events,
            current: None,
            old: None,
            stats: BridgeStats::default(),
            notify_tx,
            status_tx,
        };

        Ok((bridge, BridgeHandle { notifications, status }))
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_autopilot_connected(&self) -> bool {
        self.autopilot.is_connected()
    }

    pub fn is_simulator_connected(&self) -> bool {
        self.simulator.is_connected()
    }

    /// Latest decoded simulator state
    pub fn current(&self) -> Option<&FlightSnapshot> {
        self.current.as_ref()
    }

    /// Simulator state before [`Bridge::current`]
    pub fn previous(&self) -> Option<&FlightSnapshot> {
        self.old.as_ref()
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Run the event loop until `shutdown` completes
    ///
    /// Both peers are reported disconnected on the way out.
    ///
    /// # Returns
    ///
    /// * `BridgeStats` - Packet counters at shutdown
    pub async fn run<F>(mut self, shutdown: F) -> BridgeStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        self.start(Instant::now());

        let mut tx_interval = interval(self.config.update_period);
        tx_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut store_open = true;

        loop {
            let simulator_deadline = self.simulator.deadline();
            let autopilot_deadline = self.autopilot.deadline();

            // Ticks go first so a datagram flood cannot starve transmission.
            // Arrivals go before deadlines so a packet landing on the
            // deadline keeps the link up.
            let event = tokio::select! {
                biased;

                _ = &mut shutdown => break,

                _ = tx_interval.tick() => BridgeEvent::Tick,

                result = self.io.recv(&mut buf) => match result {
                    Ok(len) => BridgeEvent::DatagramArrived(Bytes::copy_from_slice(&buf[..len])),
                    // ICMP port unreachable while the simulator is not up yet
                    Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                        debug!("Simulator port unreachable: {}", e);
                        continue;
                    }
                    Err(e) => {
                        warn!("UDP receive error: {}", e);
                        continue;
                    }
                },

                event = self.store_events.recv(), if store_open => match event {
                    Some(event) => BridgeEvent::Telemetry(event),
                    None => {
                        warn!("Telemetry store closed its event channel");
                        store_open = false;
                        continue;
                    }
                },

                _ = sleep_until_deadline(simulator_deadline) => {
                    BridgeEvent::DeadlineReached(Peer::Simulator)
                }

                _ = sleep_until_deadline(autopilot_deadline) => {
                    BridgeEvent::DeadlineReached(Peer::Autopilot)
                }
            };

            self.dispatch(event, Instant::now()).await;
        }

        self.stop();
        self.stats
    }

    /// Process one event
    pub async fn dispatch(&mut self, event: BridgeEvent, now: Instant) {
        match event {
            BridgeEvent::Tick => {
                if let Err(e) = self.transmit().await {
                    self.stats.send_failures += 1;
                    debug!("Failed to send packet: {}", e);
                }
            }
            BridgeEvent::DatagramArrived(datagram) => self.receive(&datagram, now),
            BridgeEvent::Telemetry(event) => self.on_store_event(event, now),
            BridgeEvent::DeadlineReached(peer) => {
                let edge = self.monitor_mut(peer).check_timeout(now);
                self.apply_edge(peer, edge);
            }
        }
        self.publish_status();
    }

    fn start(&mut self, now: Instant) {
        info!(
            "Bridge started: simulator {}:{}, origin {:.6},{:.6}, update every {:?}",
            self.config.host,
            self.config.port,
            self.config.origin.latitude,
            self.config.origin.longitude,
            self.config.update_period
        );
        self.notify(Notification::Started);

        // The autopilot may already be linked when the bridge comes up
        if self.store.telemetry_stats().status == TelemetryStatus::Connected {
            let edge = self.autopilot.record_contact(now);
            self.apply_edge(Peer::Autopilot, edge);
        }
        self.publish_status();
    }

    fn stop(&mut self) {
        let edge = self.autopilot.disconnect();
        self.apply_edge(Peer::Autopilot, edge);
        let edge = self.simulator.disconnect();
        self.apply_edge(Peer::Simulator, edge);
        self.publish_status();

        info!(
            "Bridge stopped: {} packets sent ({} failed), {} received ({} malformed)",
            self.stats.packets_sent,
            self.stats.send_failures,
            self.stats.packets_received,
            self.stats.decode_failures
        );
    }

    /// Encode the autopilot outputs and send them to the simulator
    async fn transmit(&mut self) -> Result<()> {
        let packet = encode_outbound(&self.store.actuator_desired());

        self.io
            .send(&packet)
            .await
            .map_err(|e| BridgeError::Transmit(format!("Failed to send to simulator: {}", e)))?;

        self.stats.packets_sent += 1;
        Ok(())
    }

    /// Handle one inbound datagram
    ///
    /// Any datagram proves the simulator is alive, even one that fails to
    /// decode. Only decoded packets touch the snapshot pair.
    fn receive(&mut self, datagram: &[u8], now: Instant) {
        self.stats.packets_received += 1;

        let edge = self.simulator.record_contact(now);
        self.apply_edge(Peer::Simulator, edge);

        match decode_inbound(datagram, &self.config.origin) {
            Ok(snapshot) => {
                let current = derive_rates(snapshot, self.current.as_ref());
                self.old = self.current.replace(current);
                self.write_telemetry(&current);
                debug!(
                    "Simulator t={:.3}s alt={:.1}m tas={:.1}m/s hdg={:.1}",
                    current.t, current.z, current.tas, current.azimuth
                );
            }
            Err(e) => {
                self.stats.decode_failures += 1;
                warn!("Dropping simulator packet: {}", BridgeError::from(e));
            }
        }

        if self.stats.packets_received % LOG_INTERVAL_PACKETS == 0 {
            let speed = self.current.map(|s| s.horizontal_speed()).unwrap_or_default();
            info!(
                "Received {} packets ({} malformed), ground track speed {:.1} m/s",
                self.stats.packets_received, self.stats.decode_failures, speed
            );
        }
    }

    /// Push a simulator snapshot into the altitude, attitude and position objects
    fn write_telemetry(&self, snapshot: &FlightSnapshot) {
        self.store.set_altitude_actual(AltitudeActual {
            altitude: snapshot.z as f32,
            temperature: temperature_celsius_at_altitude(snapshot.z) as f32,
            pressure: (pressure_at_altitude(snapshot.z) / PA_PER_KPA) as f32,
        });

        self.store.set_attitude_actual(AttitudeActual::from_euler(
            snapshot.roll,
            snapshot.pitch,
            snapshot.azimuth,
        ));

        let (latitude, longitude) = self.config.origin.to_geodetic(snapshot.x, snapshot.y);
        self.store.set_position_actual(PositionActual {
            status: FixStatus::Fix3D,
            latitude,
            longitude,
            altitude: snapshot.z as f32,
            heading: snapshot.azimuth as f32,
            groundspeed: snapshot.groundspeed as f32,
            velocity_north: snapshot.dy as f32,
            velocity_east: snapshot.dx as f32,
            velocity_down: -snapshot.dz as f32,
            satellites: SIMULATED_SATELLITES,
        });
    }

    fn on_store_event(&mut self, event: StoreEvent, now: Instant) {
        let edge = match event {
            StoreEvent::Connected => self.autopilot.record_contact(now),
            StoreEvent::Disconnected => self.autopilot.disconnect(),
            StoreEvent::StatsUpdated(stats) if stats.status == TelemetryStatus::Connected => {
                self.autopilot.record_contact(now)
            }
            StoreEvent::StatsUpdated(stats) => {
                debug!("Telemetry link status {:?}", stats.status);
                self.autopilot.disconnect()
            }
        };
        self.apply_edge(Peer::Autopilot, edge);
    }

    fn monitor_mut(&mut self, peer: Peer) -> &mut LinkMonitor {
        match peer {
            Peer::Autopilot => &mut self.autopilot,
            Peer::Simulator => &mut self.simulator,
        }
    }

    /// Act on a link transition and tell the host about it
    fn apply_edge(&mut self, peer: Peer, edge: Option<LinkEdge>) {
        let Some(edge) = edge else {
            return;
        };

        match edge {
            LinkEdge::Connected => info!("{} connected", peer),
            LinkEdge::Disconnected => info!("{} disconnected", peer),
        }

        if peer == Peer::Autopilot && edge == LinkEdge::Connected {
            setup_objects(&*self.store);
        }

        self.notify(Notification::from_edge(peer, edge));
    }

    fn notify(&self, notification: Notification) {
        // The host may have dropped its handle; the bridge keeps running
        let _ = self.notify_tx.send(notification);
    }

    fn publish_status(&self) {
        let status = LinkStatus {
            autopilot: self.autopilot.is_connected(),
            simulator: self.simulator.is_connected(),
        };
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }
}
