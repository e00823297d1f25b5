//! CLI entry point for pulse-daq.
//!
//! A thin shell over the [`Hp8131a`] driver: reads and writes the declared
//! properties, sends raw commands, fires the manual trigger, runs the
//! self-test, and reports health.
//!
//! # Usage
//!
//! ```bash
//! pulse-daq list
//! pulse-daq read period
//! pulse-daq write width1 5e-7
//! pulse-daq write trigger_mode burst
//! pulse-daq --mock self-test
//! pulse-daq query "*IDN?"
//! ```
//!
//! If the connection target cannot be opened or the instrument does not
//! answer the identity query, the shell keeps running degraded with health
//! `FAULTED` so `status` and `self-test` stay usable for diagnosis.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use pulse_daq::commands::PulseProperty;
use pulse_daq::config::Config;
use pulse_daq::core::Instrument;
use pulse_daq::error::PulseError;
use pulse_daq::instruments::Hp8131a;
use pulse_daq::tracing_setup;
use pulse_daq::transport::{MockPulseGen, Transport};
use pulse_daq::value::PropertyValue;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "pulse-daq")]
#[command(about = "Remote control for the HP 8131A pulse generator", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config/pulse-daq.toml")]
    config: PathBuf,

    /// Run against the built-in instrument simulator
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a property from the instrument
    Read {
        /// Property name (see `list`)
        property: String,
    },

    /// Write a property value
    Write {
        /// Property name (see `list`)
        property: String,
        /// Value: number, on/off, or a trigger mode/slope name
        value: String,
    },

    /// Send a raw command and print the reply
    Query {
        /// Raw command, e.g. "*IDN?"
        command: String,
    },

    /// Send a raw command with no reply expected
    Send {
        /// Raw command, e.g. ":PULS:TIM:PER 1E-6"
        command: String,
    },

    /// Fire a single trigger event
    Trigger,

    /// Run the instrument self-test and report health
    SelfTest,

    /// Show connection state and identity
    Status,

    /// List the property surface (name, type, unit, range)
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The property listing is static; no connection needed.
    if matches!(cli.command, Commands::List) {
        print_property_table();
        return Ok(());
    }

    let config = Config::load_from(&cli.config)?;
    config
        .validate()
        .map_err(PulseError::Configuration)?;
    tracing_setup::init_from_config(&config).map_err(PulseError::Configuration)?;

    let use_mock = cli.mock || config.instrument.mock;
    let mut device = match build_transport(&config, use_mock) {
        Ok(transport) => Hp8131a::with_transport(config.instrument.id.as_str(), transport),
        Err(err) => {
            warn!(%err, "failed to open connection target; continuing degraded");
            Hp8131a::disconnected(config.instrument.id.as_str())
        }
    };

    if let Err(err) = device.initialize().await {
        warn!(%err, "initialization failed; continuing degraded");
    }

    let outcome = run_command(&mut device, cli.command).await;
    device.shutdown().await?;
    outcome
}

fn build_transport(config: &Config, use_mock: bool) -> Result<Box<dyn Transport>> {
    if use_mock {
        return Ok(Box::new(MockPulseGen::new()));
    }

    #[cfg(feature = "instrument_serial")]
    {
        use pulse_daq::transport::SerialTransport;
        let transport = SerialTransport::open(
            &config.instrument.port,
            config.instrument.baud_rate,
            std::time::Duration::from_millis(config.instrument.timeout_ms),
        )?;
        Ok(Box::new(transport))
    }

    #[cfg(not(feature = "instrument_serial"))]
    {
        let _ = config;
        Err(PulseError::SerialFeatureDisabled.into())
    }
}

async fn run_command(device: &mut Hp8131a, command: Commands) -> Result<()> {
    match command {
        Commands::Read { property } => {
            let property = PulseProperty::from_name(&property)?;
            let value = device.read(property).await?;
            match property.unit() {
                Some(unit) => println!("{value} {unit}"),
                None => println!("{value}"),
            }
        }
        Commands::Write { property, value } => {
            let property = PulseProperty::from_name(&property)?;
            let value = PropertyValue::parse_input(property.kind(), &value)?;
            device.write(property, value).await?;
        }
        Commands::Query { command } => {
            let reply = device.send_and_receive(&command).await?;
            println!("{reply}");
        }
        Commands::Send { command } => {
            device.send(&command).await?;
        }
        Commands::Trigger => {
            device.manual_trigger().await?;
        }
        Commands::SelfTest => {
            device.self_test().await?;
            println!("{}", device.health());
        }
        Commands::Status => {
            println!("health: {}", device.health());
            if let Some(identity) = device.identity() {
                println!("identity: {identity}");
            }
        }
        Commands::List => print_property_table(),
    }

    Ok(())
}

fn print_property_table() {
    println!(
        "{:<18} {:<14} {:<6} {:<24} {}",
        "PROPERTY", "TYPE", "UNIT", "RANGE", "MNEMONIC"
    );
    for property in PulseProperty::ALL {
        let range = property
            .bounds()
            .map(|(min, max)| format!("{min:E} .. {max:E}"))
            .unwrap_or_default();
        println!(
            "{:<18} {:<14} {:<6} {:<24} {}",
            property.name(),
            property.kind().expected(),
            property.unit().unwrap_or(""),
            range,
            property.mnemonic()
        );
    }
}
