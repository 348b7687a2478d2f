// Binary protocol of the FTDI FT232R based USB-I2C adapter
//
// Frame format (7-bit addressed devices):
//   write: [0x55, addr << 1, reg, len, data...]   -> 1 status byte, non-zero on success
//   read:  [0x55, (addr << 1) | 1, reg, len]      -> len data bytes

use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use tracing::{debug, warn};

use crate::bridge::{open_port, FTDI_USB_I2C};

/// Read/write one or more bytes on a device with a 7-bit address
pub const I2C_AD1: u8 = 0x55;

/// Error types for the USB-I2C adapter
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("0x{0:02x} is not a 7-bit I2C address")]
    InvalidAddress(u8),

    #[error("Cannot send {0} bytes in one frame (max 255)")]
    PayloadTooLong(usize),

    #[error("Write to device 0x{address:02x} register 0x{register:02x} was not acknowledged")]
    WriteNotAcknowledged { address: u8, register: u8 },
}

pub type Result<T> = std::result::Result<T, AdapterError>;

/// USB-I2C adapter on any byte stream
pub struct UsbI2c<P: Read + Write> {
    port: P,
}

impl UsbI2c<Box<dyn SerialPort>> {
    /// Open the adapter with its fixed line parameters
    pub fn open(path: &str) -> Result<Self> {
        Ok(Self::new(open_port(path, &FTDI_USB_I2C)?))
    }
}

impl<P: Read + Write> UsbI2c<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    pub fn into_inner(self) -> P {
        self.port
    }

    fn check_address(address: u8) -> Result<()> {
        if address > 0x7f {
            return Err(AdapterError::InvalidAddress(address));
        }
        Ok(())
    }

    /// Write `data` starting at `register`
    ///
    /// The status byte is always consumed: leaving it in the adapter's buffer
    /// would be returned as data by the next read.
    pub fn write(&mut self, address: u8, register: u8, data: &[u8]) -> Result<()> {
        Self::check_address(address)?;
        let len = u8::try_from(data.len()).map_err(|_| AdapterError::PayloadTooLong(data.len()))?;

        let mut frame = Vec::with_capacity(4 + data.len());
        frame.extend_from_slice(&[I2C_AD1, address << 1, register, len]);
        frame.extend_from_slice(data);
        debug!("Write frame: {:02X?}", frame);
        self.port.write_all(&frame)?;
        self.port.flush()?;

        let mut status = [0u8; 1];
        let acknowledged = match self.port.read(&mut status) {
            Ok(1) => status[0] != 0,
            Ok(_) => false,
            Err(e) if e.kind() == ErrorKind::TimedOut => false,
            Err(e) => return Err(e.into()),
        };
        if !acknowledged {
            return Err(AdapterError::WriteNotAcknowledged { address, register });
        }
        Ok(())
    }

    /// Read `len` bytes starting at `register`
    ///
    /// Returns whatever arrived before the port timeout, which may be fewer
    /// bytes than requested.
    pub fn read(&mut self, address: u8, register: u8, len: u8) -> Result<Vec<u8>> {
        Self::check_address(address)?;
        let frame = [I2C_AD1, (address << 1) | 1, register, len];
        debug!("Read frame: {:02X?}", frame);
        self.port.write_all(&frame)?;
        self.port.flush()?;

        let mut data = vec![0u8; len as usize];
        let mut received = 0;
        while received < data.len() {
            match self.port.read(&mut data[received..]) {
                Ok(0) => break,
                Ok(n) => received += n,
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if received < data.len() {
            warn!("Short read: expected {} bytes, got {}", data.len(), received);
        }
        data.truncate(received);
        Ok(data)
    }
}

/// Render bytes the way the tool prints them: `0xaa 0xbb 0xcc`
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
