//! Packet signer.
//!
//! The signature is `SHA-256(key ∥ header)`, where `header` is the first
//! seven bytes of the encoded packet. This is a plain keyed hash rather than
//! HMAC; the receiver computes exactly this digest, so the construction must
//! not change without replacing the receiver as well.

use hmac_sha256::Hash;

use super::packet::{CommandPacket, SIGNATURE_LEN};
use crate::keys::SecretKey;

/// Sole owner of the shared secret.
pub struct Signer {
    key: SecretKey,
}

impl Signer {
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }

    fn keyed(&self, header: &[u8]) -> Hash {
        let mut h = Hash::new();
        h.update(self.key.as_bytes());
        h.update(header);
        h
    }

    /// Digest over the key followed by `header`.
    pub fn sign_header(&self, header: &[u8]) -> [u8; SIGNATURE_LEN] {
        self.keyed(header).finalize()
    }

    /// Compute the signature for `packet` and write it into the packet.
    pub fn sign(&self, packet: &mut CommandPacket) {
        packet.signature = self.sign_header(&packet.header_bytes());
    }

    /// Re-derive the signature of a captured packet and compare in constant time.
    pub fn verify(&self, packet: &CommandPacket) -> bool {
        self.keyed(&packet.header_bytes())
            .finalize_verify(&packet.signature)
    }
}

impl core::fmt::Debug for Signer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signer").field("key", &self.key).finish()
    }
}
