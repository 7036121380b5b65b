//! Trait abstraction for datagram I/O to enable testing

use async_trait::async_trait;
use std::io;

/// Trait for connectionless datagram I/O with a single simulator peer
///
/// Both methods take `&self` so a pending receive can be raced against a
/// send inside the bridge event loop.
#[async_trait]
pub trait DatagramIo: Send + Sync {
    /// Send one datagram to the peer
    async fn send(&self, data: &[u8]) -> io::Result<usize>;

    /// Wait for the next inbound datagram and copy it into `buf`
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use bytes::Bytes;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    /// Mock datagram endpoint for testing
    #[derive(Clone)]
    pub struct MockDatagramIo {
        pub sent_data: Arc<Mutex<Vec<Vec<u8>>>>,
        pub send_error: Arc<Mutex<Option<io::ErrorKind>>>,
        inbound_tx: mpsc::UnboundedSender<Bytes>,
        inbound_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Bytes>>>,
    }

    impl MockDatagramIo {
        pub fn new() -> Self {
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
            Self {
                sent_data: Arc::new(Mutex::new(Vec::new())),
                send_error: Arc::new(Mutex::new(None)),
                inbound_tx,
                inbound_rx: Arc::new(tokio::sync::Mutex::new(inbound_rx)),
            }
        }

        /// Queue a datagram as if the simulator had sent it
        pub fn inject(&self, data: impl AsRef<[u8]>) {
            self.inbound_tx
                .send(Bytes::copy_from_slice(data.as_ref()))
                .unwrap();
        }

        pub fn get_sent_data(&self) -> Vec<Vec<u8>> {
            self.sent_data.lock().unwrap().clone()
        }

        pub fn set_send_error(&self, error: io::ErrorKind) {
            *self.send_error.lock().unwrap() = Some(error);
        }

        pub fn clear_send_error(&self) {
            *self.send_error.lock().unwrap() = None;
        }
    }

    #[async_trait]
    impl DatagramIo for MockDatagramIo {
        async fn send(&self, data: &[u8]) -> io::Result<usize> {
            if let Some(error) = *self.send_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock send error"));
            }
            self.sent_data.lock().unwrap().push(data.to_vec());
            Ok(data.len())
        }

        async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
            let mut inbound = self.inbound_rx.lock().await;
            match inbound.recv().await {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                // Sender lives in self, so the channel never closes
                None => std::future::pending().await,
            }
        }
    }

    #[test]
    fn test_mock_records_sends() {
        let mock = MockDatagramIo::new();
        tokio_test::block_on(async {
            assert_eq!(mock.send(b"R/0/").await.unwrap(), 4);
        });
        assert_eq!(mock.get_sent_data(), vec![b"R/0/".to_vec()]);
    }

    #[test]
    fn test_mock_send_error() {
        let mock = MockDatagramIo::new();
        mock.set_send_error(io::ErrorKind::ConnectionRefused);
        let result = tokio_test::block_on(mock.send(b"R/"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::ConnectionRefused);

        mock.clear_send_error();
        assert!(tokio_test::block_on(mock.send(b"R/")).is_ok());
    }

    #[test]
    fn test_mock_delivers_injected_datagrams() {
        let mock = MockDatagramIo::new();
        mock.inject(b"A/0\\1/");
        let mut buf = [0u8; 64];
        let len = tokio_test::block_on(mock.recv(&mut buf)).unwrap();
        assert_eq!(&buf[..len], b"A/0\\1/");
    }
}
