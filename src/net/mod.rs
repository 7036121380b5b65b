//! # Network Module
//!
//! Handles the UDP link to the simulator.
//!
//! This module handles:
//! - Resolving the simulator host name
//! - Binding the local datagram socket
//! - Sending command packets to the simulator
//! - Receiving answer packets from the simulator only
//!
//! The socket is connected to the simulator address, so the kernel drops
//! datagrams from any other source.

pub mod io_trait;

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, info, trace};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};

pub use io_trait::DatagramIo;

/// UDP endpoint talking to one simulator instance
#[derive(Debug)]
pub struct UdpLink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpLink {
    /// Resolve the simulator address, bind the local socket and connect it
    ///
    /// # Arguments
    ///
    /// * `config` - Bridge configuration holding host, port and local port
    ///
    /// # Returns
    ///
    /// * `Result<UdpLink>` - Bound link or error
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The host name does not resolve (`InvalidConfig`)
    /// - The local port cannot be bound (`Io`)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hitl_bridge::config::BridgeConfig;
    /// use hitl_bridge::net::UdpLink;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let config = BridgeConfig::new("127.0.0.1", 1100, "45.0", "-93.0")?;
    ///     let link = UdpLink::bind(&config).await?;
    ///     println!("Listening on {}", link.local_addr()?);
    ///     Ok(())
    /// }
    /// ```
    pub async fn bind(config: &BridgeConfig) -> Result<Self> {
        let peer = Self::resolve(&config.host, config.port).await?;

        let local: SocketAddr = if peer.is_ipv6() {
            (Ipv6Addr::UNSPECIFIED, config.local_port).into()
        } else {
            (Ipv4Addr::UNSPECIFIED, config.local_port).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;
        info!(
            "UDP link bound to {}, simulator at {}",
            socket.local_addr()?,
            peer
        );

        Ok(Self { socket, peer })
    }

    /// Resolve a host name to the first address it maps to
    async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
        debug!("Resolving simulator host {}:{}", host, port);

        let mut addrs = lookup_host((host, port)).await.map_err(|e| {
            BridgeError::InvalidConfig(format!("cannot resolve simulator host {}: {}", host, e))
        })?;

        addrs.next().ok_or_else(|| {
            BridgeError::InvalidConfig(format!("simulator host {} has no addresses", host))
        })
    }

    /// Local address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Simulator address datagrams are sent to
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

#[async_trait]
impl DatagramIo for UdpLink {
    async fn send(&self, data: &[u8]) -> io::Result<usize> {
        let sent = self.socket.send(data).await?;
        trace!("Sent {} bytes to {}", sent, self.peer);
        Ok(sent)
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.socket.recv(buf).await?;
        trace!("Received {} bytes from {}", len, self.peer);
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn local_config(port: u16) -> BridgeConfig {
        BridgeConfig::new("127.0.0.1", port, "45.0", "-93.0").unwrap()
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let link = UdpLink::bind(&local_config(1100)).await.unwrap();
        assert_ne!(link.local_addr().unwrap().port(), 0);
        assert_eq!(link.peer_addr(), "127.0.0.1:1100".parse().unwrap());
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_config_error() {
        let mut config = local_config(1100);
        config.host = "no-such-host.invalid".to_string();

        match UdpLink::bind(&config).await {
            Err(BridgeError::InvalidConfig(msg)) => assert!(msg.contains("no-such-host.invalid")),
            other => panic!("Expected InvalidConfig error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_and_receive_over_loopback() {
        let simulator = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sim_port = simulator.local_addr().unwrap().port();
        let link = UdpLink::bind(&local_config(sim_port)).await.unwrap();

        link.send(b"R/0/").await.unwrap();
        let mut buf = [0u8; 64];
        let (len, from) = simulator.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"R/0/");

        simulator.send_to(b"A/0\\1/", from).await.unwrap();
        let len = link.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"A/0\\1/");
    }

    #[tokio::test]
    async fn test_datagrams_from_other_hosts_are_ignored() {
        let simulator = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sim_port = simulator.local_addr().unwrap().port();
        let link = UdpLink::bind(&local_config(sim_port)).await.unwrap();
        let link_addr = link.local_addr().unwrap();

        let stranger = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        stranger.send_to(b"A/stranger/", link_addr).await.unwrap();
        simulator.send_to(b"A/simulator/", link_addr).await.unwrap();

        let mut buf = [0u8; 64];
        let len = timeout(Duration::from_secs(2), link.recv(&mut buf))
            .await
            .expect("simulator datagram should arrive")
            .unwrap();
        assert_eq!(&buf[..len], b"A/simulator/");

        // Nothing else is waiting
        let next = timeout(Duration::from_millis(100), link.recv(&mut buf)).await;
        assert!(next.is_err(), "stranger datagram was delivered");
    }
}
