//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] and [`KeyStorePort`] for the Doorlink controller.
//!
//! - Config lives in the `doorlink` namespace as a postcard blob, validated
//!   before every save.
//! - The shared key lives in the `eeprom` namespace, blob `eeprom`, which is
//!   where the Arduino-ESP32 EEPROM emulation keeps its bytes. Devices
//!   provisioned with the legacy sketch therefore keep their key. The key
//!   area is read once and cached; there is no on-device write path.

use crate::app::ports::{ConfigError, ConfigPort, KeyStorePort, StorageError};
use crate::config::ControllerConfig;
use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use core::cell::RefCell;

const CONFIG_NAMESPACE: &str = "doorlink";
const CONFIG_KEY: &str = "cfg";

const KEY_NAMESPACE: &str = "eeprom";
const KEY_BLOB: &str = "eeprom";
/// Bytes read from the key area. Matches the legacy `EEPROM.begin(32)`.
pub const KEY_AREA_LEN: usize = 32;

const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    key_area: RefCell<Option<[u8; KEY_AREA_LEN]>>,
    #[cfg(not(target_os = "espidf"))]
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably. On a version mismatch or a full partition the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as esp_err_t {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            key_area: RefCell::new(None),
            #[cfg(not(target_os = "espidf"))]
            store: RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Simulation only: place key bytes where the device would have them.
    #[cfg(not(target_os = "espidf"))]
    pub fn provision_key_area(&mut self, bytes: &[u8]) {
        let composite = Self::composite_key(KEY_NAMESPACE, KEY_BLOB);
        self.store.borrow_mut().insert(composite, bytes.to_vec());
        self.key_area.replace(None);
    }

    /// Load the key area on first use.
    fn key_area(&self) -> Result<[u8; KEY_AREA_LEN], StorageError> {
        if let Some(area) = *self.key_area.borrow() {
            return Ok(area);
        }
        let mut area = [0u8; KEY_AREA_LEN];
        let len = self.read_blob(KEY_NAMESPACE, KEY_BLOB, &mut area)?;
        if len < KEY_AREA_LEN {
            return Err(StorageError::NotFound);
        }
        self.key_area.replace(Some(area));
        Ok(area)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let composite = Self::composite_key(namespace, key);
        match self.store.borrow().get(&composite) {
            Some(data) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            None => Err(StorageError::NotFound),
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let result = Self::with_nvs_handle(namespace, false, |handle| {
            let key_buf = c_name(key);

            // Query the stored size first: nvs_get_blob refuses short buffers.
            let mut size: usize = 0;
            let ret = unsafe {
                nvs_get_blob(handle, key_buf.as_ptr() as *const _, core::ptr::null_mut(), &mut size)
            };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            if size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH as esp_err_t);
            }
            let mut tmp = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    tmp.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            let len = size.min(buf.len());
            buf[..len].copy_from_slice(&tmp[..len]);
            Ok(len)
        });
        match result {
            Ok(len) => Ok(len),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Err(StorageError::NotFound),
            Err(e) => {
                warn!("NvsAdapter: read {}::{} failed ({})", namespace, key, e);
                Err(StorageError::IoError)
            }
        }
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = c_name(namespace);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

/// NUL-terminated copy of an NVS name (max 15 chars).
#[cfg(target_os = "espidf")]
fn c_name(name: &str) -> [u8; 16] {
    let mut buf = [0u8; 16];
    let bytes = name.as_bytes();
    let len = bytes.len().min(15);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

fn validate_config(cfg: &ControllerConfig) -> Result<(), ConfigError> {
    if cfg.remote_host.is_empty() {
        return Err(ConfigError::ValidationFailed("remote_host must not be empty"));
    }
    if cfg.remote_port == 0 {
        return Err(ConfigError::ValidationFailed("remote_port must be 1–65535"));
    }
    if !(1..=5).contains(&cfg.transmit_attempts) {
        return Err(ConfigError::ValidationFailed("transmit_attempts must be 1–5"));
    }
    if !(1..=5000).contains(&cfg.dispatch_delay_ms) {
        return Err(ConfigError::ValidationFailed("dispatch_delay_ms must be 1–5000"));
    }
    if !(1..=1000).contains(&cfg.idle_poll_ms) {
        return Err(ConfigError::ValidationFailed("idle_poll_ms must be 1–1000"));
    }
    if cfg.connect_timeout_ms == 0 || cfg.write_timeout_ms == 0 {
        return Err(ConfigError::ValidationFailed("socket timeouts must be > 0"));
    }
    if !(1000..=60_000).contains(&cfg.watchdog_timeout_ms) {
        return Err(ConfigError::ValidationFailed("watchdog_timeout_ms must be 1000–60000"));
    }
    if cfg.worst_case_dispatch_ms() >= u64::from(cfg.watchdog_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "attempts × (connect + write timeout) + dispatch_delay_ms must be < watchdog_timeout_ms",
        ));
    }
    if cfg.network_poll_interval_ms == 0
        || cfg.network_poll_interval_ms > cfg.network_join_timeout_ms
    {
        return Err(ConfigError::ValidationFailed(
            "network_poll_interval_ms must be 1..=network_join_timeout_ms",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<ControllerConfig, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        match self.read_blob(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => {
                let cfg: ControllerConfig =
                    postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
                validate_config(&cfg)?;
                info!("NvsAdapter: loaded config ({} bytes)", len);
                Ok(cfg)
            }
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(ControllerConfig::default())
            }
            Err(StorageError::IoError) => Err(ConfigError::IoError),
        }
    }

    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            self.store.borrow_mut().insert(key, bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, true, |handle| {
                let key_buf = c_name(CONFIG_KEY);
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

impl KeyStorePort for NvsAdapter {
    fn read(&self, offset: usize) -> Result<u8, StorageError> {
        self.key_area()?
            .get(offset)
            .copied()
            .ok_or(StorageError::NotFound)
    }
}
