//! Fuzz target: captured-record decoder.
//!
//! Feeds arbitrary bytes into `CommandPacket::from_bytes`. The decoder must
//! never panic, and anything it accepts must re-encode to the same bytes and
//! re-sign deterministically.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_packet_decode

#![no_main]

use doorlink::keys::SecretKey;
use doorlink::protocol::{CommandPacket, Signer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(packet) = CommandPacket::from_bytes(data) else {
        return;
    };
    assert_eq!(&packet.to_bytes()[..], data);

    let signer = Signer::new(SecretKey::from_bytes([0; 32]));
    let header = packet.header_bytes();
    assert_eq!(signer.sign_header(&header), signer.sign_header(&header));
});
