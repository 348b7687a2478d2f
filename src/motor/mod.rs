// Motor control module for the four-motor car controller
//
// Provides:
// - Register catalog (opcodes, response sizes, motor sub-addresses)
// - Telemetry reassembly from echoed hex tokens
// - High-level controller API over the Bus Pirate console

pub mod catalog;
mod controller;
pub mod telemetry;

pub use catalog::{DriveAction, MotorSelect, MotorStatus, ReadCommand, WriteCommand};
pub use controller::{MotorController, Reading};
