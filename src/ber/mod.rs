//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! A cursor-based decoder over a bounded window of a datagram and a growable
//! encoder that back-patches constructed headers. Both keep the first error
//! they see (see [`FirstError`](crate::error::FirstError)).

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;
