#![no_main]

use std::sync::Arc;
use std::sync::OnceLock;

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use tiny_snmp_agent::agent::{Mib, handle_datagram};
use tiny_snmp_agent::handler::StaticValue;
use tiny_snmp_agent::message::{CommunityMessage, MessageHeader};
use tiny_snmp_agent::oid;
use tiny_snmp_agent::pdu::Pdu;

fn mib() -> &'static Mib {
    static MIB: OnceLock<Mib> = OnceLock::new();
    MIB.get_or_init(|| {
        Mib::new()
            .with_object(oid!(1, 2, 3, 4), Arc::new(StaticValue::string("string value")))
            .and_then(|mib| mib.with_object(oid!(1, 2, 3, 5), Arc::new(StaticValue::integer(5))))
            .unwrap_or_default()
    })
}

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    let _ = CommunityMessage::decode(bytes.clone());
    let _ = MessageHeader::peek(&bytes);

    let mut decoder = tiny_snmp_agent::ber::Decoder::new(bytes.clone());
    let _ = Pdu::decode(&mut decoder);

    // Whatever comes back must itself be a well-formed message.
    if let Some(response) = handle_datagram(mib(), &[], bytes) {
        assert!(CommunityMessage::decode(response).is_ok());
    }
});
