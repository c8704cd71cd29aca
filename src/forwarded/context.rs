//! Client identity resolution from the hop chain.

use std::fmt;
use std::net::SocketAddr;

use serde::Serialize;

use crate::forwarded::parser::HopChain;

/// Address reported when neither the header nor the transport knows the peer.
pub const UNKNOWN_PEER: &str = "unknown";

/// Request scheme as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    /// Parse a `proto` token (case-insensitive). Unknown schemes yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("https") {
            Some(Protocol::Https)
        } else if token.eq_ignore_ascii_case("http") {
            Some(Protocol::Http)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the connection that delivered the request was itself encrypted.
///
/// Inserted as a request extension by the server depending on whether it
/// terminates TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    #[default]
    Plain,
    Encrypted,
}

impl TransportSecurity {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, TransportSecurity::Encrypted)
    }
}

/// Resolved, per-request view of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientContext {
    pub ip: String,
    pub protocol: Protocol,
}

impl ClientContext {
    /// Resolve the effective client address and scheme.
    ///
    /// Each parameter is taken from the client-nearest hop that declares it;
    /// the transport peer and channel state fill whatever the chain leaves out.
    pub fn resolve(
        chain: &HopChain,
        peer: Option<SocketAddr>,
        transport: TransportSecurity,
    ) -> Self {
        let ip = chain
            .first_value("for")
            .map(str::to_string)
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| UNKNOWN_PEER.to_string());

        let protocol = chain
            .first_value("proto")
            .and_then(Protocol::from_token)
            .unwrap_or(if transport.is_encrypted() {
                Protocol::Https
            } else {
                Protocol::Http
            });

        Self { ip, protocol }
    }

    pub fn is_secure(&self) -> bool {
        self.protocol == Protocol::Https
    }
}
