//! ManagedObject trait.

use std::sync::Arc;

use crate::value::{Value, ValueType};

/// A value the agent can answer queries about.
///
/// Objects are registered in a [`Mib`](crate::agent::Mib) under an OID.
/// Each response that names the object calls [`value_type`] and [`value`]
/// once, and a GETBULK walk may call many objects while building one
/// response.
///
/// # Thread Safety
///
/// The agent serves requests concurrently and holds objects behind `Arc`,
/// so implementations must be `Send + Sync`. Calls should be fast and must
/// not block; any state an object keeps is its own (see
/// [`Counter32Object`](super::Counter32Object) for an atomic example).
///
/// # Type Agreement
///
/// The value returned by [`value`] must carry the type announced by
/// [`value_type`]. A mismatch is logged and the request is answered with
/// `genErr` rather than sending a value the manager was not told about.
///
/// [`value_type`]: ManagedObject::value_type
/// [`value`]: ManagedObject::value
///
/// # Example
///
/// ```rust
/// use tiny_snmp_agent::handler::ManagedObject;
/// use tiny_snmp_agent::{Value, ValueType};
///
/// struct Answer;
///
/// impl ManagedObject for Answer {
///     fn value_type(&self) -> ValueType {
///         ValueType::Integer
///     }
///
///     fn value(&self) -> Value {
///         Value::Integer(42)
///     }
/// }
/// ```
pub trait ManagedObject: Send + Sync {
    /// Type tag of the values this object produces.
    fn value_type(&self) -> ValueType;

    /// Current value.
    fn value(&self) -> Value;
}

impl<T: ManagedObject + ?Sized> ManagedObject for Arc<T> {
    fn value_type(&self) -> ValueType {
        (**self).value_type()
    }

    fn value(&self) -> Value {
        (**self).value()
    }
}

impl<T: ManagedObject + ?Sized> ManagedObject for Box<T> {
    fn value_type(&self) -> ValueType {
        (**self).value_type()
    }

    fn value(&self) -> Value {
        (**self).value()
    }
}
