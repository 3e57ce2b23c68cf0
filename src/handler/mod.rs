//! Managed objects and the OID table that holds them.
//!
//! - [`ManagedObject`] - Capability the agent queries for a type tag and a value
//! - [`OidTable`] - Sorted OID storage with exact, successor and lower-bound lookup
//! - [`StaticValue`], [`Counter32Object`], [`Uptime`], [`FnObject`] - Sample objects
//!
//! # Overview
//!
//! Objects are registered under a full instance OID (for scalars this ends
//! in `.0`). GET looks the OID up exactly; GETNEXT and GETBULK walk the table
//! in lexicographic OID order, which is why every object lives in one
//! [`OidTable`].
//!
//! ```rust
//! use std::sync::Arc;
//! use tiny_snmp_agent::agent::Mib;
//! use tiny_snmp_agent::handler::{Counter32Object, StaticValue, Uptime};
//! use tiny_snmp_agent::oid;
//!
//! # fn main() -> tiny_snmp_agent::Result<()> {
//! let mut mib = Mib::new();
//! mib.register(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Arc::new(StaticValue::string("Router")))?;
//! mib.register(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Arc::new(Uptime::new()))?;
//! mib.register(oid!(1, 3, 6, 1, 4, 1, 99999, 1, 0), Arc::new(Counter32Object::new(0)))?;
//! assert_eq!(mib.len(), 3);
//!
//! // OIDs that cannot go on the wire are refused
//! assert!(mib.register(oid!(3, 1), Arc::new(Uptime::new())).is_err());
//! # Ok(())
//! # }
//! ```

mod oid_table;
mod providers;
mod traits;

pub use oid_table::OidTable;
pub use providers::{Counter32Object, FnObject, StaticValue, Uptime};
pub use traits::ManagedObject;
