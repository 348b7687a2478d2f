// Simple tool for driving the USB-to-I2C adapter based on the FTDI FT232R.
//
// Usage: usbi2c -a 0x10 [-p /dev/ttyUSB0] write -r REGISTER DATA...
//        usbi2c -a 0x10 [-p /dev/ttyUSB0] read -r REGISTER LENGTH

use clap::Parser;
use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use i2c_motor_panel::usbi2c::{execute, AdapterError, Cli, UsbI2c};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut adapter = match UsbI2c::open(&cli.port) {
        Ok(adapter) => adapter,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Could not open {}", cli.port);
            std::process::exit(1);
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(e) = execute(&cli.command, cli.address, &mut adapter, &mut stdout) {
        match e {
            AdapterError::WriteNotAcknowledged { .. } => eprintln!("Failure writing."),
            other => eprintln!("{}", other),
        }
        std::process::exit(1);
    }
}
