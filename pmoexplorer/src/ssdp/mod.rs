//! # SSDP search
//!
//! A control point only needs the search half of SSDP: one `M-SEARCH` sent to the
//! multicast group, then the unicast `HTTP/1.1 200 OK` answers read back on the
//! same socket until it stays silent for the receive timeout.
//!
//! - [`SsdpClient`] : socket lifecycle and receive loop
//! - [`SearchResponse`] : one parsed answer

mod client;
mod response;

pub use client::SsdpClient;
pub use response::{SearchResponse, parse_search_response};

use std::net::Ipv4Addr;

/// SSDP multicast address
pub const SSDP_MULTICAST_IPV4: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// SSDP port
pub const SSDP_PORT: u16 = 1900;

/// Search query for root devices.
pub const MSEARCH_ROOT_DEVICE: &str = "M-SEARCH * HTTP/1.1\r\n\
HOST:239.255.255.250:1900\r\n\
ST:upnp:rootdevice\r\n\
MX:2\r\n\
MAN:\"ssdp:discover\"\r\n\
\r\n";
