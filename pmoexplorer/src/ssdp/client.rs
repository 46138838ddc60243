use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, warn};

use super::{MSEARCH_ROOT_DEVICE, SSDP_MULTICAST_IPV4, SSDP_PORT};
use super::response::{SearchResponse, parse_search_response};
use crate::errors::Result;

/// One-shot SSDP search.
///
/// The socket binds an ephemeral port: answers to an `M-SEARCH` are unicast back
/// to the sender, so port 1900 is never needed.
#[derive(Debug, Clone)]
pub struct SsdpClient {
    timeout: Duration,
    buffer_size: usize,
    log_datagrams: bool,
    target: SocketAddrV4,
}

impl SsdpClient {
    pub fn new(timeout: Duration, buffer_size: usize) -> Self {
        Self {
            timeout,
            buffer_size,
            log_datagrams: false,
            target: SocketAddrV4::new(SSDP_MULTICAST_IPV4, SSDP_PORT),
        }
    }

    /// Logs every raw datagram at debug level.
    pub fn log_datagrams(mut self, enabled: bool) -> Self {
        self.log_datagrams = enabled;
        self
    }

    /// Sends the search to `target` instead of the SSDP multicast group.
    #[cfg(test)]
    pub(crate) fn with_target(mut self, target: SocketAddrV4) -> Self {
        self.target = target;
        self
    }

    fn open_socket(&self) -> Result<UdpSocket> {
        let socket2 = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket2.set_reuse_address(true)?;

        let bind_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
        socket2.bind(&bind_addr.into())?;

        let socket: UdpSocket = socket2.into();
        // A zero duration is rejected by set_read_timeout.
        socket.set_read_timeout(Some(self.timeout.max(Duration::from_millis(1))))?;
        Ok(socket)
    }

    /// Sends one root-device `M-SEARCH` and gathers answers until a receive times out.
    ///
    /// Answers without a `LOCATION` header are dropped. The socket is closed when
    /// this returns, whatever the outcome.
    pub fn search(&self) -> Result<Vec<SearchResponse>> {
        let socket = self.open_socket()?;
        socket.send_to(MSEARCH_ROOT_DEVICE.as_bytes(), self.target)?;
        info!("📤 M-SEARCH sent (ST=upnp:rootdevice, MX=2)");

        let mut responses = Vec::new();
        let mut buf = vec![0u8; self.buffer_size.max(1)];
        loop {
            match socket.recv_from(&mut buf) {
                Ok((n, from)) => {
                    let data = String::from_utf8_lossy(&buf[..n]);
                    if self.log_datagrams {
                        debug!("📥 SSDP datagram from {}:\n{}", from, data);
                    }
                    match parse_search_response(&data) {
                        Ok(response) => responses.push(response),
                        Err(e) => warn!("Ignoring SSDP datagram from {}: {}", from, e),
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    debug!("SSDP receive window closed");
                    break;
                }
                Err(e) => {
                    warn!("❌ SSDP read error, keeping {} answer(s): {}", responses.len(), e);
                    break;
                }
            }
        }

        info!("{} SSDP answer(s) received", responses.len());
        Ok(responses)
    }
}
