//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use tiny_snmp_agent::prelude::*;
//! ```
//!
//! This imports:
//! - Agent types: [`Agent`], [`Mib`], [`ManagedObject`]
//! - Core types: [`Oid`], [`Value`], [`ValueType`], [`VarBind`]
//! - Error handling: [`Error`], [`Result`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::agent::{Agent, Mib};
pub use crate::error::{Error, Result};
pub use crate::handler::{ManagedObject, StaticValue};
pub use crate::oid::Oid;
pub use crate::value::{Value, ValueType};
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
