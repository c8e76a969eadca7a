//! Shared-secret provisioning.
//!
//! The 32-byte key is written to persistent storage once, out of band, and
//! read back byte by byte at boot. There is no runtime write or regeneration
//! path.

use log::{info, warn};

use crate::app::ports::KeyStorePort;
use crate::error::KeyError;

/// Length of the shared secret in bytes.
pub const KEY_LEN: usize = 32;

/// The shared secret. Moved into the [`Signer`](crate::protocol::Signer)
/// after loading; only the signer reads the raw bytes.
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Erased flash reads back as all-0xFF.
    fn looks_erased(&self) -> bool {
        self.0.iter().all(|&b| b == 0xFF)
    }
}

impl core::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Read the key from `store`, one byte per offset.
///
/// An erased (all-0xFF) key is accepted but logged: the receiver will
/// reject every packet until the device is provisioned.
pub fn load_key(store: &impl KeyStorePort) -> Result<SecretKey, KeyError> {
    let mut bytes = [0u8; KEY_LEN];
    for (offset, slot) in bytes.iter_mut().enumerate() {
        *slot = store
            .read(offset)
            .map_err(|_| KeyError::ReadFailed { offset })?;
    }
    let key = SecretKey::from_bytes(bytes);
    if key.looks_erased() {
        warn!("keys: stored key is all 0xFF, device looks unprovisioned");
    } else {
        info!("keys: shared key loaded ({} bytes)", KEY_LEN);
    }
    Ok(key)
}
