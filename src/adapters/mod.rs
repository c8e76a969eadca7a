//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `log_sink` | EventSink          | Serial log output        |
//! | `nvs`      | ConfigPort         | NVS / in-memory store    |
//! |            | KeyStorePort       | Legacy EEPROM key area   |
//! | `sntp`     | ClockSyncPort      | ESP-IDF SNTP client      |
//! | `tcp`      | TransmitPort       | Receiver TCP socket      |
//! | `time`     | ClockPort          | RTC via gettimeofday     |
//! |            | DelayNs            | Blocking thread sleep    |
//! | `wifi`     | ConnectivityPort   | ESP-IDF WiFi STA         |

pub mod log_sink;
pub mod nvs;
pub mod sntp;
pub mod tcp;
pub mod time;
pub mod wifi;
