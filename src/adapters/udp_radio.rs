//! UDP radio adapter.
//!
//! Stands in for the LoRa transceiver when running on the host: each
//! datagram is one radio packet, sent to a fixed peer address. Two
//! processes pointed at each other behave like two nodes on one frequency.
//! Loss, duplication and foreign-channel traffic can be injected with any
//! UDP tool, which makes this the easiest way to exercise retransmission.

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use log::{debug, info};

use crate::app::ports::{RadioLink, RxPacket, MAX_RADIO_PAYLOAD};
use crate::error::RadioError;

/// Smallest read timeout we hand the socket (zero means "block forever").
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

pub struct UdpRadio {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpRadio {
    /// Bind `local` and transmit to `peer`.
    pub fn bind(local: impl ToSocketAddrs, peer: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(local)?;
        info!("UdpRadio: {} -> {}", socket.local_addr()?, peer);
        Ok(Self::from_socket(socket, peer))
    }

    /// Wrap an already-bound socket.
    pub fn from_socket(socket: UdpSocket, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl RadioLink for UdpRadio {
    fn send(&mut self, packet: &[u8]) -> Result<(), RadioError> {
        if packet.len() > MAX_RADIO_PAYLOAD {
            return Err(RadioError::PacketTooLarge(packet.len()));
        }
        self.socket.send_to(packet, self.peer).map_err(|e| {
            debug!("UdpRadio: send_to {} failed: {}", self.peer, e);
            RadioError::SendFailed
        })?;
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<RxPacket>, RadioError> {
        self.socket
            .set_read_timeout(Some(timeout.max(MIN_TIMEOUT)))
            .map_err(|_| RadioError::ReceiveFailed)?;

        let mut buf = [0u8; MAX_RADIO_PAYLOAD];
        match self.socket.recv_from(&mut buf) {
            Ok((len, from)) => {
                debug!("UdpRadio: {} bytes from {}", len, from);
                // `len` never exceeds the buffer, so this cannot fail.
                Ok(RxPacket::from_slice(&buf[..len]).ok())
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => {
                debug!("UdpRadio: recv failed: {}", e);
                Err(RadioError::ReceiveFailed)
            }
        }
    }
}
