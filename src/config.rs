// Serial line profiles, prompts, defaults
use std::time::Duration;

// Serial port used by both tools unless overridden on the command line
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

// Bus Pirate adapter (control panel)
pub const BUS_PIRATE_BAUDRATE: u32 = 34800;

// FTDI FT232R USB-I2C adapter (usbi2c tool)
pub const USB_I2C_BAUDRATE: u32 = 19200;
pub const USB_I2C_TIMEOUT: Duration = Duration::from_millis(500);

// Wait this long per '\n' in a command before draining the reply
pub const SETTLE_PER_LINE: Duration = Duration::from_millis(25);

// Prompts printed by the Bus Pirate firmware
pub const MENU_PROMPT: &str = "(1)>";
pub const I2C_PROMPT: &str = "I2C>";

// 7-bit slave address of the motor controller firmware
pub const DEFAULT_MOTOR_ADDRESS: u8 = 0x10;

// Panel limits
pub const LOG_LINES: usize = 500;
pub const HISTORY_LEN: usize = 32;
pub const DEFAULT_LOG_FILE: &str = "i2c-motor-panel.log";
