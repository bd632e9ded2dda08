//! Classification gateway for quietfeed
//!
//! Two operations, verdict lookup by post id and report by post id, are
//! relayed through a typed transport boundary to the remote service. The
//! page side holds a [`Gateway`]; the privileged side implements
//! [`Transport`], with [`HttpRelay`] as the production implementation.

mod client;
mod error;
mod http_relay;
mod relay;

pub use client::Gateway;
pub use error::TransportError;
pub use http_relay::{HttpRelay, HttpRelayConfig};
pub use relay::{Ack, RelayError, RelayRequest, RelayResponse, Transport};
