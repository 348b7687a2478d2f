// Command-line surface of the usbi2c tool

use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use tracing::info;

use super::adapter::{format_bytes, AdapterError, UsbI2c};
use crate::args::{parse_address, parse_byte};
use crate::config::DEFAULT_PORT;

/// Single read/write operations through the USB-I2C adapter (FTDI FT232R)
#[derive(Debug, Parser)]
#[command(name = "usbi2c", version)]
pub struct Cli {
    /// The 7-bit address of the slave
    #[arg(short, long, value_parser = parse_address)]
    pub address: u8,

    /// Serial port provided by the adapter; must be readable and writable
    #[arg(short, long, default_value = DEFAULT_PORT)]
    pub port: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Write bytes starting at a register
    Write {
        /// Target register (1 byte)
        #[arg(short, long, value_parser = parse_byte)]
        register: u8,

        /// Device dependent amount of data
        #[arg(value_parser = parse_byte)]
        data: Vec<u8>,
    },
    /// Read bytes starting at a register and print them
    Read {
        /// Target register (1 byte)
        #[arg(short, long, value_parser = parse_byte)]
        register: u8,

        /// Number of bytes to read
        #[arg(value_parser = parse_byte)]
        length: u8,
    },
}

/// Run one subcommand against the adapter, printing read data to `out`
pub fn execute<P, W>(
    command: &Command,
    address: u8,
    adapter: &mut UsbI2c<P>,
    out: &mut W,
) -> Result<(), AdapterError>
where
    P: Read + Write,
    W: Write,
{
    match command {
        Command::Write { register, data } => {
            info!(
                "Writing {} byte(s) to 0x{:02x} register 0x{:02x}",
                data.len(),
                address,
                register
            );
            adapter.write(address, *register, data)
        }
        Command::Read { register, length } => {
            info!(
                "Reading {} byte(s) from 0x{:02x} register 0x{:02x}",
                length, address, register
            );
            let data = adapter.read(address, *register, *length)?;
            writeln!(out, "{}", format_bytes(&data))?;
            Ok(())
        }
    }
}
