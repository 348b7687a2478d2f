// USB-I2C adapter tool (FTDI FT232R + PIC firmware)
//
// Not protocol-compatible with the Bus Pirate: this adapter speaks a fixed
// binary framing instead of a text console.

pub mod adapter;
pub mod cli;

pub use adapter::{format_bytes, AdapterError, UsbI2c};
pub use cli::{execute, Cli, Command};
