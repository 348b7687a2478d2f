// Raw byte transport to the serial-to-I2C adapter

use serialport::{self, DataBits, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

use crate::config::{BUS_PIRATE_BAUDRATE, USB_I2C_BAUDRATE, USB_I2C_TIMEOUT};

/// Error types for bridge communication
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Fixed framing parameters of one adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineProfile {
    pub baudrate: u32,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub data_bits: DataBits,
    pub timeout: Duration,
}

/// Bus Pirate text console. Reads only drain what is buffered, so the timeout
/// never comes into play.
pub const BUS_PIRATE: LineProfile = LineProfile {
    baudrate: BUS_PIRATE_BAUDRATE,
    parity: Parity::None,
    stop_bits: StopBits::One,
    data_bits: DataBits::Eight,
    timeout: Duration::from_millis(100),
};

/// FTDI FT232R based USB-I2C adapter
pub const FTDI_USB_I2C: LineProfile = LineProfile {
    baudrate: USB_I2C_BAUDRATE,
    parity: Parity::None,
    stop_bits: StopBits::Two,
    data_bits: DataBits::Eight,
    timeout: USB_I2C_TIMEOUT,
};

/// Open a serial port with the given line profile
///
/// Errors stay `serialport::Error`; callers convert them into their own type.
pub fn open_port(path: &str, profile: &LineProfile) -> serialport::Result<Box<dyn SerialPort>> {
    debug!("Opening {} at {} baud", path, profile.baudrate);
    serialport::new(path, profile.baudrate)
        .parity(profile.parity)
        .stop_bits(profile.stop_bits)
        .data_bits(profile.data_bits)
        .timeout(profile.timeout)
        .open()
}

/// Byte-level access the handshake needs from a port
pub trait Transport {
    /// Write every byte and flush
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Number of bytes received and not yet read
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read up to `buf.len()` already-received bytes
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl Transport for Box<dyn SerialPort> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        Write::write_all(self, bytes)?;
        self.flush()?;
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.bytes_to_read()? as usize)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.read(buf)?)
    }
}
