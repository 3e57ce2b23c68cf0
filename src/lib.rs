//! # tiny-snmp-agent
//!
//! Small async SNMP agent for Rust.
//!
//! ## Features
//!
//! - SNMPv1 and v2c with community strings
//! - GET, GETNEXT and GETBULK over an OID-ordered table of managed objects
//! - Zero-copy BER encoding/decoding with first-error-wins diagnostics
//! - Async serve loop built on Tokio, one task per request
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tiny_snmp_agent::handler::{StaticValue, Uptime};
//! use tiny_snmp_agent::{Agent, oid};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tiny_snmp_agent::Error> {
//!     let agent = Agent::builder()
//!         .bind("0.0.0.0:5000")
//!         .community(b"public")
//!         .object(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Arc::new(StaticValue::string("My router")))
//!         .object(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Arc::new(Uptime::new()))
//!         .build()
//!         .await?;
//!
//!     agent.run().await
//! }
//! ```
//!
//! ## Codec only
//!
//! The message codec and dispatch work without a socket:
//!
//! ```rust
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use tiny_snmp_agent::agent::{Mib, handle_datagram};
//! use tiny_snmp_agent::handler::StaticValue;
//! use tiny_snmp_agent::{CommunityMessage, Pdu, oid};
//!
//! let mib = Mib::new()
//!     .with_object(oid!(1, 2, 3, 4), Arc::new(StaticValue::string("string value")))
//!     .unwrap();
//!
//! let request = CommunityMessage::v2c(Bytes::from_static(b"public"), Pdu::get_request(1, &[oid!(1, 2, 3, 4)]))
//!     .encode()
//!     .unwrap();
//!
//! let response = handle_datagram(&mib, &[], request).unwrap();
//! let response = CommunityMessage::decode(response).unwrap();
//! assert_eq!(response.pdu.varbinds[0].value.as_str(), Some("string value"));
//! ```

pub mod agent;
pub mod ber;
pub mod error;
pub mod handler;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

// Re-exports for convenience
pub use agent::{Agent, AgentBuilder, Mib};
pub use error::{DecodeErrorKind, EncodeErrorKind, Error, ErrorStatus, OidErrorKind, Result};
pub use handler::{ManagedObject, OidTable};
pub use message::CommunityMessage;
pub use oid::Oid;
pub use pdu::{Pdu, PduType};
pub use value::{Value, ValueType};
pub use varbind::VarBind;
pub use version::Version;
