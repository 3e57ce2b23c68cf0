#![no_main]

use libfuzzer_sys::fuzz_target;

use tiny_snmp_agent::oid::Oid;

fuzz_target!(|data: &[u8]| {
    if let Ok(oid) = Oid::from_ber(data) {
        let _ = oid.to_ber();
    }

    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(oid) = Oid::parse(s)
    {
        assert_eq!(oid.to_string().is_empty(), oid.is_empty());
    }
});
