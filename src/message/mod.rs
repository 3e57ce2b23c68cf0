//! SNMP message wrappers.
//!
//! A message wraps a PDU with the protocol version and community string.
//! Only the community-based versions (v1/v2c) are handled.

mod community;

pub use community::{CommunityMessage, MessageHeader};
