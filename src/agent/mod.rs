//! SNMP Agent (listener/responder).
//!
//! This module provides an SNMP agent that answers GET, GETNEXT and GETBULK
//! requests for v1/v2c managers from a table of managed objects.
//!
//! # Features
//!
//! - **Community allowlist**: accept any community, or only configured ones
//! - **Ordered MIB**: lexicographic OID table drives GETNEXT and GETBULK walks
//! - **Graceful shutdown**: stop the serve loop with a [`CancellationToken`]
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tiny_snmp_agent::agent::Agent;
//! use tiny_snmp_agent::handler::{StaticValue, Uptime};
//! use tiny_snmp_agent::oid;
//!
//! # async fn example() -> tiny_snmp_agent::Result<()> {
//! let agent = Agent::builder()
//!     .bind("0.0.0.0:1161")
//!     .community(b"public")
//!     .object(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Arc::new(StaticValue::string("My router")))
//!     .object(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Arc::new(Uptime::new()))
//!     .build()
//!     .await?;
//!
//! agent.run().await
//! # }
//! ```

mod dispatch;
mod request;

pub use dispatch::Mib;
pub use request::handle_datagram;

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::handler::ManagedObject;
use crate::oid::Oid;
use crate::util::bind_udp_socket;

/// Largest UDP payload over IPv4, used as the default receive buffer.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 65507;

/// Builder for [`Agent`].
///
/// # Example
///
/// ```rust,no_run
/// use tiny_snmp_agent::agent::{Agent, Mib};
///
/// # async fn example() -> tiny_snmp_agent::Result<()> {
/// let agent = Agent::builder()
///     .bind("127.0.0.1:1161")
///     .communities(["public", "monitor"])
///     .mib(Mib::new())
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct AgentBuilder {
    bind_addr: String,
    communities: Vec<Vec<u8>>,
    mib: Mib,
    max_message_size: usize,
    recv_buffer_size: Option<usize>,
    cancel: Option<CancellationToken>,
    rejected: Option<Error>,
}

impl AgentBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Bind address: `0.0.0.0:161` (UDP)
    /// - Max message size: 65507 bytes
    /// - Receive buffer size: kernel default
    /// - No communities configured (any community accepted)
    /// - Empty MIB
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:161".to_string(),
            communities: Vec::new(),
            mib: Mib::new(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            recv_buffer_size: None,
            cancel: None,
            rejected: None,
        }
    }

    /// Set the UDP bind address.
    ///
    /// Default is `0.0.0.0:161`. Binding to port 161 typically requires
    /// elevated privileges. Use `[::]:port` for dual-stack.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Add an accepted community string.
    ///
    /// Once any community is added, requests carrying other communities are
    /// dropped without a response.
    pub fn community(mut self, community: &[u8]) -> Self {
        self.communities.push(community.to_vec());
        self
    }

    /// Add several accepted community strings.
    pub fn communities<I, C>(mut self, communities: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        for c in communities {
            self.communities.push(c.as_ref().to_vec());
        }
        self
    }

    /// Replace the MIB.
    pub fn mib(mut self, mib: Mib) -> Self {
        self.mib = mib;
        self
    }

    /// Register one managed object.
    ///
    /// An OID that cannot be encoded makes [`build`](Self::build) fail with
    /// [`Error::InvalidOid`].
    pub fn object(mut self, oid: Oid, object: Arc<dyn ManagedObject>) -> Self {
        if let Err(e) = self.mib.register(oid, object)
            && self.rejected.is_none()
        {
            self.rejected = Some(e);
        }
        self
    }

    /// Set the receive buffer size (largest request accepted).
    ///
    /// Longer datagrams are truncated by the socket and then fail to decode.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Set the UDP socket receive buffer size.
    ///
    /// The kernel may cap this at `net.core.rmem_max`.
    pub fn recv_buffer_size(mut self, size: Option<usize>) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Set a cancellation token for graceful shutdown.
    ///
    /// If not set, the agent creates its own token accessible via `Agent::cancel()`.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Bind the socket and build the agent.
    pub async fn build(self) -> Result<Agent> {
        if let Some(e) = self.rejected {
            return Err(e);
        }

        let bind_addr: SocketAddr = self.bind_addr.parse().map_err(|_| {
            Error::Config(format!("invalid bind address: {}", self.bind_addr).into())
        })?;

        if self.max_message_size == 0 {
            return Err(Error::Config("max message size must be positive".into()));
        }

        let socket = bind_udp_socket(bind_addr, self.recv_buffer_size)
            .await
            .map_err(|e| Error::Io {
                target: Some(bind_addr),
                source: e,
            })?;

        let local_addr = socket.local_addr().map_err(|e| Error::Io {
            target: Some(bind_addr),
            source: e,
        })?;

        tracing::debug!(target: "tiny_snmp_agent::agent", { snmp.local_addr = %local_addr, objects = self.mib.len() }, "agent bound");

        Ok(Agent {
            inner: Arc::new(AgentInner {
                socket,
                local_addr,
                communities: self.communities,
                mib: self.mib,
                max_message_size: self.max_message_size,
                cancel: self.cancel.unwrap_or_default(),
            }),
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Inner state shared across agent clones.
struct AgentInner {
    socket: UdpSocket,
    local_addr: SocketAddr,
    communities: Vec<Vec<u8>>,
    mib: Mib,
    max_message_size: usize,
    cancel: CancellationToken,
}

/// SNMP Agent.
///
/// Cheap to clone; clones share the socket and the MIB.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

impl Agent {
    /// Create a builder for configuring the agent.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Get the local address the agent is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// The objects this agent answers for.
    pub fn mib(&self) -> &Mib {
        &self.inner.mib
    }

    /// Get the cancellation token for this agent.
    ///
    /// Call `token.cancel()` to initiate graceful shutdown.
    pub fn cancel(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Run the agent until the cancellation token fires.
    ///
    /// Each datagram is handled on its own task. A failure in one cycle is
    /// logged and never stops the loop; only a receive error on the socket
    /// itself is returned.
    #[instrument(skip(self), err, fields(snmp.local_addr = %self.local_addr()))]
    pub async fn run(&self) -> Result<()> {
        let mut buf = vec![0u8; self.inner.max_message_size];

        loop {
            let (len, source) = tokio::select! {
                result = self.inner.socket.recv_from(&mut buf) => {
                    result.map_err(|e| Error::Io { target: None, source: e })?
                }
                _ = self.inner.cancel.cancelled() => {
                    tracing::info!(target: "tiny_snmp_agent::agent", "agent shutdown requested");
                    return Ok(());
                }
            };

            let data = Bytes::copy_from_slice(&buf[..len]);
            let agent = self.clone();

            tokio::spawn(async move {
                agent.serve_one(data, source).await;
            });
        }
    }

    async fn serve_one(&self, data: Bytes, source: SocketAddr) {
        let span = tracing::debug_span!(target: "tiny_snmp_agent::agent", "request", snmp.source = %source);
        let response = {
            let _enter = span.enter();
            handle_datagram(&self.inner.mib, &self.inner.communities, data)
        };
        let Some(response) = response else {
            return;
        };

        if let Err(e) = self.inner.socket.send_to(&response, source).await {
            tracing::warn!(target: "tiny_snmp_agent::agent", { snmp.source = %source, error = %e }, "failed to send response");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::StaticValue;
    use crate::oid;

    #[tokio::test]
    async fn test_builder_defaults_and_bind() {
        let agent = Agent::builder()
            .bind("127.0.0.1:0")
            .object(oid!(1, 2, 3, 4), Arc::new(StaticValue::string("string value")))
            .build()
            .await
            .unwrap();
        assert!(agent.local_addr().is_ipv4());
        assert_ne!(agent.local_addr().port(), 0);
        assert_eq!(agent.mib().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_bind_address() {
        let err = Agent::builder().bind("not an address").build().await;
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_unencodable_object_fails_build() {
        let err = Agent::builder()
            .bind("127.0.0.1:0")
            .object(oid!(1, 2, 3, 4), Arc::new(StaticValue::string("string value")))
            .object(oid!(3, 1), Arc::new(StaticValue::integer(1)))
            .build()
            .await;
        assert!(matches!(err, Err(Error::InvalidOid { .. })));
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let agent = Agent::builder().bind("127.0.0.1:0").build().await.unwrap();
        let token = agent.cancel();
        token.cancel();
        agent.run().await.unwrap();
    }
}
