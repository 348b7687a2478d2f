// Serial-to-I2C bridge (Bus Pirate style text console)
//
// Provides:
// - Serial transport with the adapters' fixed line profiles
// - Command/response handshake with prompt matching
// - Bus Pirate I2C transaction syntax

pub mod buspirate;
mod console;
#[cfg(test)]
pub(crate) mod mock;
mod transport;

pub use console::{reply_matches, Console, ResponseReader, SettleDrain};
pub use transport::{open_port, BridgeError, LineProfile, Transport, BUS_PIRATE, FTDI_USB_I2C};
