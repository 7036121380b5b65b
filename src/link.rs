//! # Link Monitor
//!
//! Connection liveness for one peer of the bridge.
//!
//! Each peer (autopilot, simulator) gets its own [`LinkMonitor`], a two-state
//! machine that reports only edges. Timeouts use last-contact semantics: a
//! deadline firing is confirmed against the most recent contact before the
//! link is declared down, so a stale timer can never disconnect a peer that
//! was heard from after the timer was armed.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// Which side of the bridge a monitor watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Peer {
    Autopilot,
    Simulator,
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::Autopilot => write!(f, "autopilot"),
            Peer::Simulator => write!(f, "simulator"),
        }
    }
}

/// Connection state of a peer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connected,
}

/// State transition reported by a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEdge {
    Connected,
    Disconnected,
}

/// Edge-triggered liveness tracker for one peer
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    peer: Peer,
    state: LinkState,
    last_contact: Option<Instant>,
    timeout: Option<Duration>,
}

impl LinkMonitor {
    /// Create a disconnected monitor
    ///
    /// # Arguments
    ///
    /// * `peer` - Side being watched
    /// * `timeout` - Silence after which the link drops, `None` for purely
    ///   event-driven links
    pub fn new(peer: Peer, timeout: Option<Duration>) -> Self {
        Self {
            peer,
            state: LinkState::Disconnected,
            last_contact: None,
            timeout,
        }
    }

    pub fn peer(&self) -> Peer {
        self.peer
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn last_contact(&self) -> Option<Instant> {
        self.last_contact
    }

    /// Record that the peer was heard from
    ///
    /// Returns `Some(LinkEdge::Connected)` only when the link was down.
    pub fn record_contact(&mut self, now: Instant) -> Option<LinkEdge> {
        // A late caller must not move the last contact backwards
        self.last_contact = Some(match self.last_contact {
            Some(previous) if previous > now => previous,
            _ => now,
        });

        match self.state {
            LinkState::Connected => None,
            LinkState::Disconnected => {
                self.state = LinkState::Connected;
                Some(LinkEdge::Connected)
            }
        }
    }

    /// Drop the link unconditionally
    ///
    /// Returns `Some(LinkEdge::Disconnected)` only when the link was up.
    pub fn disconnect(&mut self) -> Option<LinkEdge> {
        match self.state {
            LinkState::Disconnected => None,
            LinkState::Connected => {
                self.state = LinkState::Disconnected;
                Some(LinkEdge::Disconnected)
            }
        }
    }

    /// Instant at which the link times out if nothing else is heard
    ///
    /// `None` while disconnected or when no timeout is configured.
    pub fn deadline(&self) -> Option<Instant> {
        match (self.state, self.timeout, self.last_contact) {
            (LinkState::Connected, Some(timeout), Some(last)) => Some(last + timeout),
            _ => None,
        }
    }

    /// Drop the link if the peer has been silent for the full timeout
    pub fn check_timeout(&mut self, now: Instant) -> Option<LinkEdge> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.disconnect(),
            _ => None,
        }
    }
}
