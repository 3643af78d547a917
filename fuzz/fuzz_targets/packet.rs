#![no_main]
use libfuzzer_sys::fuzz_target;
use mqtt_wire::{MPacket, MProtocolLevel};

fuzz_target!(|data: &[u8]| {
    for level in [MProtocolLevel::V31, MProtocolLevel::V311, MProtocolLevel::V5] {
        if let Ok(packet) = MPacket::parse_complete(data, level) {
            let _ = packet.encode();
        }

        let mut reader = data;
        let _ = MPacket::read_from(&mut reader, level);
    }
});
