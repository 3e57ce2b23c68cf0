//! Ready-made managed objects.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use bytes::Bytes;

use super::ManagedObject;
use crate::value::{Value, ValueType};

/// An object that always answers the same value.
#[derive(Debug, Clone)]
pub struct StaticValue {
    value_type: ValueType,
    value: Value,
}

impl StaticValue {
    /// Wrap a value. Returns `None` for [`Value::Unknown`], which has no type
    /// tag to announce.
    pub fn new(value: Value) -> Option<Self> {
        let value_type = value.value_type()?;
        Some(Self { value_type, value })
    }

    /// Pair a value with the type to announce for it.
    ///
    /// The pair is not checked here; a mismatch surfaces as `genErr` when
    /// the object is queried.
    pub fn with_type(value_type: ValueType, value: Value) -> Self {
        Self { value_type, value }
    }

    /// An OCTET STRING object.
    pub fn string(s: impl Into<String>) -> Self {
        Self {
            value_type: ValueType::OctetString,
            value: Value::OctetString(Bytes::from(s.into())),
        }
    }

    /// An INTEGER object.
    pub fn integer(v: i32) -> Self {
        Self {
            value_type: ValueType::Integer,
            value: Value::Integer(v),
        }
    }
}

impl ManagedObject for StaticValue {
    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn value(&self) -> Value {
        self.value.clone()
    }
}

/// Counter32 that increments on every read.
///
/// The first read returns the starting value. Wraps at `u32::MAX`.
#[derive(Debug, Default)]
pub struct Counter32Object {
    next: AtomicU32,
}

impl Counter32Object {
    /// Counter starting at `start`.
    pub fn new(start: u32) -> Self {
        Self {
            next: AtomicU32::new(start),
        }
    }
}

impl ManagedObject for Counter32Object {
    fn value_type(&self) -> ValueType {
        ValueType::Counter32
    }

    fn value(&self) -> Value {
        Value::Counter32(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// TimeTicks since the object was created, in hundredths of a second.
#[derive(Debug, Clone)]
pub struct Uptime {
    started: Instant,
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Uptime counted from `started`.
    pub fn since(started: Instant) -> Self {
        Self { started }
    }
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedObject for Uptime {
    fn value_type(&self) -> ValueType {
        ValueType::TimeTicks
    }

    fn value(&self) -> Value {
        let ticks = self.started.elapsed().as_millis() / 10;
        // TimeTicks wraps after ~497 days
        Value::TimeTicks(ticks as u32)
    }
}

/// Object backed by a closure.
pub struct FnObject<F> {
    value_type: ValueType,
    f: F,
}

impl<F> FnObject<F>
where
    F: Fn() -> Value + Send + Sync,
{
    /// The closure must return values of `value_type`.
    pub fn new(value_type: ValueType, f: F) -> Self {
        Self { value_type, f }
    }
}

impl<F> ManagedObject for FnObject<F>
where
    F: Fn() -> Value + Send + Sync,
{
    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn value(&self) -> Value {
        (self.f)()
    }
}

impl<F> std::fmt::Debug for FnObject<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnObject")
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}
