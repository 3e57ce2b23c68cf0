//! Common test fixtures and constants.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tiny_snmp_agent::handler::{ManagedObject, StaticValue, Uptime};
use tiny_snmp_agent::{Agent, CommunityMessage, Mib, Oid, Pdu, oid};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}

/// System subtree root: 1.3.6.1.2.1.1
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// OID sorting after everything in [`test_mib`].
pub fn past_end_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}

/// V2c community accepted by [`TestAgent`]
pub const COMMUNITY: &[u8] = b"public";

/// sysDescr, sysUpTime, sysName plus the two demonstration objects.
pub fn test_mib() -> Mib {
    let mut mib = Mib::new();
    let objects: [(Oid, Arc<dyn ManagedObject>); 5] = [
        (sys_descr(), Arc::new(StaticValue::string("Test Device"))),
        (sys_uptime(), Arc::new(Uptime::new())),
        (sys_name(), Arc::new(StaticValue::string("Device name"))),
        (oid!(1, 2, 3, 4), Arc::new(StaticValue::string("string value"))),
        (oid!(1, 2, 3, 5), Arc::new(StaticValue::integer(5))),
    ];
    for (oid, object) in objects {
        mib.register(oid, object).expect("valid OID");
    }
    mib
}

// =============================================================================
// Loopback agent
// =============================================================================

/// Agent serving [`test_mib`] on an ephemeral loopback port.
pub struct TestAgent {
    pub agent: Agent,
    pub addr: SocketAddr,
    task: JoinHandle<tiny_snmp_agent::Result<()>>,
}

impl TestAgent {
    pub async fn new() -> Self {
        Self::with_mib(test_mib(), &[COMMUNITY]).await
    }

    pub async fn with_mib(mib: Mib, communities: &[&[u8]]) -> Self {
        let agent = Agent::builder()
            .bind("127.0.0.1:0")
            .communities(communities)
            .mib(mib)
            .build()
            .await
            .expect("bind agent");
        let addr = agent.local_addr();
        let runner = agent.clone();
        let task = tokio::spawn(async move { runner.run().await });
        Self { agent, addr, task }
    }

    /// Cancel the serve loop and wait for it to return.
    pub async fn shutdown(self) {
        self.agent.cancel().cancel();
        let result = tokio::time::timeout(Duration::from_secs(2), self.task)
            .await
            .expect("agent did not stop")
            .expect("agent task panicked");
        result.expect("agent returned an error");
    }
}

/// Manager-side socket talking to one agent.
pub struct Manager {
    socket: UdpSocket,
    target: SocketAddr,
}

impl Manager {
    pub async fn new(target: SocketAddr) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind manager");
        Self { socket, target }
    }

    pub async fn send_raw(&self, data: &[u8]) {
        self.socket.send_to(data, self.target).await.expect("send");
    }

    /// Wait up to `wait` for one datagram.
    pub async fn recv_raw(&self, wait: Duration) -> Option<Bytes> {
        let mut buf = vec![0u8; 65535];
        match tokio::time::timeout(wait, self.socket.recv_from(&mut buf)).await {
            Ok(Ok((len, _))) => Some(Bytes::copy_from_slice(&buf[..len])),
            Ok(Err(e)) => panic!("recv failed: {}", e),
            Err(_) => None,
        }
    }

    /// Send a v2c request and decode the response.
    pub async fn request(&self, pdu: Pdu) -> CommunityMessage {
        self.request_with(CommunityMessage::v2c(Bytes::from_static(COMMUNITY), pdu))
            .await
            .expect("no response")
    }

    pub async fn request_with(&self, msg: CommunityMessage) -> Option<CommunityMessage> {
        self.send_raw(&msg.encode().expect("encode request")).await;
        let data = self.recv_raw(Duration::from_secs(2)).await?;
        Some(CommunityMessage::decode(data).expect("decode response"))
    }
}
