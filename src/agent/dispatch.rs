//! Request dispatch over the managed-object table.

use std::sync::Arc;

use crate::error::{ErrorStatus, Result};
use crate::handler::{ManagedObject, OidTable};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::value::Value;
use crate::varbind::VarBind;

/// The set of managed objects an agent answers for.
///
/// Populated before serving starts and read-only afterwards. Request
/// handlers rewrite the PDU's bindings in place; the caller turns the PDU
/// into a response.
#[derive(Clone, Default)]
pub struct Mib {
    objects: OidTable<Arc<dyn ManagedObject>>,
}

impl Mib {
    /// Create an empty MIB.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object under its instance OID, replacing any previous one.
    ///
    /// The OID must be encodable (see [`Oid::validate`]); a walk that reached
    /// an OID the encoder rejects could never be answered.
    pub fn register(&mut self, oid: Oid, object: Arc<dyn ManagedObject>) -> Result<()> {
        oid.validate()?;
        self.objects.insert(oid, object);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_object(mut self, oid: Oid, object: Arc<dyn ManagedObject>) -> Result<Self> {
        self.register(oid, object)?;
        Ok(self)
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if no objects are registered.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Registered OIDs in table order.
    pub fn oids(&self) -> impl Iterator<Item = &Oid> {
        self.objects.iter().map(|(oid, _)| oid)
    }

    /// Answer a request PDU in place.
    ///
    /// GET, GETNEXT and GETBULK go to their handlers; any other command is
    /// answered with `genErr`. The PDU type is left untouched.
    pub fn dispatch(&self, pdu: &mut Pdu) {
        match pdu.pdu_type {
            PduType::GetRequest => self.handle_get(pdu),
            PduType::GetNextRequest => self.handle_get_next(pdu),
            PduType::GetBulkRequest => self.handle_get_bulk(pdu),
            PduType::Response | PduType::SetRequest | PduType::Trap => {
                tracing::debug!(target: "tiny_snmp_agent::agent", { snmp.request_id = pdu.request_id, snmp.pdu_type = %pdu.pdu_type }, "unsupported command");
                pdu.varbinds.clear();
                pdu.add_error(ErrorStatus::GenErr, "unsupported command");
            }
        }
    }

    /// GET: exact lookup for every requested OID.
    ///
    /// Unknown OIDs are answered with NULL.
    pub fn handle_get(&self, pdu: &mut Pdu) {
        if pdu.varbinds.is_empty() {
            pdu.add_error(ErrorStatus::NoSuchName, "empty request");
            return;
        }

        let mut failed = None;
        for (index, vb) in pdu.varbinds.iter_mut().enumerate() {
            vb.value = match self.objects.get(&vb.oid) {
                Some(object) => match checked_value(&vb.oid, object.as_ref()) {
                    Some(value) => value,
                    None => {
                        failed.get_or_insert(index);
                        Value::Null
                    }
                },
                None => Value::Null,
            };
        }

        if let Some(index) = failed {
            pdu.set_error(ErrorStatus::GenErr, index as i32 + 1);
        }
    }

    /// GETNEXT: the strict successor of the first requested OID.
    ///
    /// Further requested OIDs are ignored.
    pub fn handle_get_next(&self, pdu: &mut Pdu) {
        let Some(first) = pdu.varbinds.first() else {
            pdu.add_error(ErrorStatus::NoSuchName, "empty request");
            return;
        };

        let next = self.objects.get_next(&first.oid);
        pdu.varbinds.clear();

        let Some((oid, object)) = next else {
            pdu.add_error(ErrorStatus::EndOfMibView, "no more vars");
            return;
        };

        match checked_value(oid, object.as_ref()) {
            Some(value) => pdu.varbinds.push(VarBind::new(oid.clone(), value)),
            None => {
                pdu.set_error(ErrorStatus::GenErr, 1);
            }
        }
    }

    /// GETBULK: walk forward from the first requested OID, inclusive.
    ///
    /// At least one binding is returned when anything is found, even if
    /// `max_repetitions` is zero or negative.
    pub fn handle_get_bulk(&self, pdu: &mut Pdu) {
        let Some(first) = pdu.varbinds.first() else {
            pdu.add_error(ErrorStatus::NoSuchName, "empty request");
            return;
        };

        let start = first.oid.clone();
        if self.objects.get_at_or_after(&start).is_none() {
            pdu.add_error(ErrorStatus::EndOfMibView, "no more vars");
            return;
        }

        pdu.varbinds.clear();
        let max = pdu.max_repetitions.max(1) as usize;

        for (oid, object) in self.objects.range_from(&start).take(max) {
            let Some(value) = checked_value(oid, object.as_ref()) else {
                pdu.set_error(ErrorStatus::GenErr, pdu.varbinds.len() as i32 + 1);
                return;
            };
            pdu.varbinds.push(VarBind::new(oid.clone(), value));
        }
    }
}

impl std::fmt::Debug for Mib {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.oids()).finish()
    }
}

/// Read an object's value, checking it against the type it announces.
fn checked_value(oid: &Oid, object: &dyn ManagedObject) -> Option<Value> {
    let expected = object.value_type();
    let value = object.value();
    if value.value_type() != Some(expected) {
        tracing::warn!(target: "tiny_snmp_agent::agent", { snmp.oid = %oid, expected = %expected, actual = %value }, "managed object returned a value of the wrong type");
        return None;
    }
    Some(value)
}
