//! OpenSesame node: main entry point.
//!
//! Wires concrete adapters to the protocol agent and runs the cooperative
//! loop forever.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  UdpRadio       NmeaGps / NullGps   HardwareAdapter          │
//! │  (RadioLink)    (GpsSource)         (Relay + StatusLed)      │
//! │  MonotonicClock LogEventSink                                 │
//! │  (Clock)        (EventSink)                                  │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                  Agent (pure logic)                    │  │
//! │  │  codec · filter · dispatch · tracker · geofence        │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::fs::File;
use std::io::{self, BufReader};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use opensesame::adapters::hardware::HardwareAdapter;
use opensesame::adapters::log_sink::LogEventSink;
use opensesame::adapters::nmea_gps::NmeaGps;
use opensesame::adapters::time::MonotonicClock;
use opensesame::adapters::udp_radio::UdpRadio;
use opensesame::app::ports::NullGps;
use opensesame::app::service::Agent;
use opensesame::config::DeviceConfig;
use opensesame::link::codec::MessageKind;
use opensesame::link::dispatch::Role;

// ── Command line ──────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "opensesame", version, about = "LoRa garage-door opener node")]
struct Cli {
    /// Device configuration (JSON).
    #[arg(default_value = "config.json")]
    config: PathBuf,

    /// Local UDP address standing in for the radio.
    #[arg(long, default_value = "127.0.0.1:7001")]
    bind: String,

    /// UDP address of the other node.
    #[arg(long, default_value = "127.0.0.1:7002")]
    peer: SocketAddr,

    /// NMEA log replayed as the GPS feed (car role), one sentence per loop.
    #[arg(long)]
    gps: Option<PathBuf>,

    /// Send one Ping at startup to probe the peer.
    #[arg(long)]
    ping: bool,
}

// ── Logging ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .try_init()
        .context("installing log subscriber")?;
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    info!("OpenSesame v{}", env!("CARGO_PKG_VERSION"));

    // An unsupported role or out-of-range value stops here.
    let config = DeviceConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    info!(
        "Config: role={} channel={} ack_timeout={}s",
        config.mode, config.channel, config.ack_timeout_secs
    );
    info!(
        "LoRa: {} MHz, {} dBm, rx timeout {}s (simulated over UDP)",
        config.lora.freq_mhz, config.lora.tx_power_db, config.lora.msg_timeout_secs
    );

    let relay_pin = (config.mode == Role::Garage).then_some(config.relay.pin);
    let mut hw = HardwareAdapter::from_pins(relay_pin).context("GPIO bring-up")?;
    let mut radio = UdpRadio::bind(&cli.bind, cli.peer)
        .with_context(|| format!("binding radio socket {}", cli.bind))?;
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    let mut agent = Agent::new(&config, &clock);
    agent.start(&mut sink);

    if cli.ping {
        agent.send_command(&mut radio, MessageKind::Ping, &mut sink);
    }

    match (config.mode.has_geofence(), cli.gps) {
        (true, Some(path)) => {
            let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
            let mut gps = NmeaGps::new(BufReader::new(file), io::sink());
            gps.configure(config.gps.mode, config.gps.update_rate_ms)
                .context("configuring GPS")?;
            agent.run(&mut radio, &mut gps, &mut hw, &mut sink)
        }
        (true, None) => {
            warn!("No GPS feed given; the geofence will wait for a fix forever");
            agent.run(&mut radio, &mut NullGps, &mut hw, &mut sink)
        }
        (false, _) => agent.run(&mut radio, &mut NullGps, &mut hw, &mut sink),
    }
}
