//! Doorlink Firmware: Main Entry Point
//!
//! Edge-triggered door commands, signed and fired at a TCP receiver.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter     SntpAdapter     NvsAdapter     SystemClock    │
//! │  (Connectivity)  (ClockSync)     (Config+Key)   (ClockPort)    │
//! │  TcpTransmitter  LogEventSink    TriggerInputs  Watchdog       │
//! │  (TransmitPort)  (EventSink)     (GPIO ISR)     (TWDT)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            DoorController (pure logic)                 │    │
//! │  │  PacketBuilder · FreshnessEncoder · Signer             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                         ▲                                      │
//! │            PendingAction (lock-free, ISR → main)               │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Result, bail};
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::InputPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use doorlink::adapters::log_sink::LogEventSink;
use doorlink::adapters::nvs::NvsAdapter;
use doorlink::adapters::sntp::SntpAdapter;
use doorlink::adapters::tcp::TcpTransmitter;
use doorlink::adapters::time::SystemClock;
use doorlink::adapters::wifi::WifiAdapter;
use doorlink::app::ports::{ConfigPort, ConnectivityPort};
use doorlink::app::service::DoorController;
use doorlink::app::startup;
use doorlink::config::ControllerConfig;
use doorlink::drivers::trigger::TriggerInputs;
use doorlink::drivers::watchdog::Watchdog;
use doorlink::events::PendingAction;
use doorlink::keys::load_key;
use doorlink::protocol::Signer;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Doorlink v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Persistent storage: config + shared key ────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => bail!("NVS init failed ({}), cannot read the shared key", e),
    };
    let config = match nvs.load() {
        Ok(c) => c,
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            ControllerConfig::default()
        }
    };
    info!(
        "Config: receiver {}:{} attempts={} dispatch_delay={}ms",
        config.remote_host, config.remote_port, config.transmit_attempts, config.dispatch_delay_ms
    );

    let key = load_key(&nvs).map_err(doorlink::Error::from)?;
    let signer = Signer::new(key);

    // ── 3. Network + clock ────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), None)?;
    let mut wifi = WifiAdapter::new().with_driver(BlockingWifi::wrap(esp_wifi, sysloop)?);
    if let Err(e) = wifi.set_credentials(&config.wifi_ssid, &config.wifi_password) {
        warn!("WiFi credentials rejected: {}", e);
    }

    let mut sntp = SntpAdapter::new();
    let mut delay = FreeRtos;
    let mut sink = LogEventSink::new();

    if let Err(e) = startup::bring_up(&config, &mut wifi, &mut sntp, &mut delay, &mut sink) {
        error!("Startup failed: {}, restarting", e);
        esp_idf_svc::hal::reset::restart();
    }

    // ── 4. Triggers + controller ──────────────────────────────
    let pending = Arc::new(PendingAction::new());
    let mut triggers = TriggerInputs::new(
        peripherals.pins.gpio27.downgrade_input(),
        peripherals.pins.gpio26.downgrade_input(),
        &pending,
    )?;

    let mut controller = DoorController::new(&config, signer, Arc::clone(&pending));
    let clock = SystemClock::new();
    let mut tx = TcpTransmitter::from_config(&config);
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    controller.start(&mut sink);

    // ── 5. Dispatch loop ──────────────────────────────────────
    loop {
        controller.run_once(&clock, &mut tx, &mut delay, &mut sink);
        triggers.rearm();
        watchdog.feed();
        wifi.poll();
    }
}
