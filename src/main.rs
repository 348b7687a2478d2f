use clap::Parser;
use std::fs::File;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use i2c_motor_panel::args::parse_address;
use i2c_motor_panel::config::{DEFAULT_LOG_FILE, DEFAULT_MOTOR_ADDRESS, DEFAULT_PORT};

/// Control panel for I2C motors behind a Bus Pirate
#[derive(Parser)]
#[command(name = "i2c-motor-panel", version)]
struct Args {
    /// Serial port of the Bus Pirate
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    /// 7-bit I2C address of the motor controller
    #[arg(short, long, value_parser = parse_address, default_value_t = DEFAULT_MOTOR_ADDRESS)]
    address: u8,

    /// File receiving the log (the terminal is taken by the panel)
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: String,
}

fn main() {
    let args = Args::parse();

    let log_file = match File::create(&args.log_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Could not create log file {}: {}", args.log_file, e);
            std::process::exit(1);
        }
    };

    // Setup logging (set RUST_LOG=debug for every transaction)
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()),
        )
        .init();

    if let Err(e) = i2c_motor_panel::panel::run(&args.port, args.address) {
        eprintln!("Panel error: {}", e);
        std::process::exit(1);
    }
}
