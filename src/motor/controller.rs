// High-level motor controller over the Bus Pirate console
//
// Combines the command catalog and the I2C text syntax into the operations
// the panel offers: apply settings, acquire telemetry, halt and calibrate.

use tracing::{debug, info, warn};

use super::catalog::{
    command_byte, DriveAction, MotorSelect, MotorStatus, ReadCommand, WriteCommand,
};
use super::telemetry::{decode_byte, decode_counter, decode_float, decode_status};
use crate::bridge::buspirate::{
    enter_i2c_mode_sequence, raw_step, read_tokens, read_transaction, transaction_step,
    write_transaction,
};
use crate::bridge::{BridgeError, Console, Transport};
use crate::messages::{IoRecord, MotorSetting, SequenceOutcome, SequenceStep, Telemetry};

type Result<T> = std::result::Result<T, BridgeError>;

/// Tokens read back from a register, empty when the transaction failed
#[derive(Debug, Clone, Default)]
pub struct Reading {
    pub success: bool,
    pub tokens: Vec<String>,
}

/// Motor controller reached through a text console at a fixed I2C address
pub struct MotorController<T: Transport> {
    console: Console<T>,
    address: u8,
    journal: Vec<IoRecord>,
}

impl<T: Transport> MotorController<T> {
    pub fn new(console: Console<T>, address: u8) -> Self {
        Self {
            console,
            address,
            journal: Vec::new(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn console(&self) -> &Console<T> {
        &self.console
    }

    /// Every I/O record since the last call, oldest first
    pub fn take_journal(&mut self) -> Vec<IoRecord> {
        std::mem::take(&mut self.journal)
    }

    fn run(&mut self, steps: &[SequenceStep]) -> Result<SequenceOutcome> {
        let outcome = self.console.run_sequence(steps)?;
        self.journal.extend(outcome.trace.iter().cloned());
        Ok(outcome)
    }

    /// Walk the adapter menu until it sits at the I2C prompt
    pub fn enter_i2c_mode(&mut self) -> Result<bool> {
        info!("Entering I2C mode");
        let outcome = self.run(&enter_i2c_mode_sequence())?;
        if outcome.success {
            info!("Adapter ready at I2C prompt");
        } else {
            warn!("Adapter did not reach the I2C prompt");
        }
        Ok(outcome.success)
    }

    /// Send a free-form console command; the reply is only journaled
    pub fn raw(&mut self, command: &str) -> Result<SequenceOutcome> {
        debug!("Raw command: {}", command);
        self.run(&[raw_step(command)])
    }

    /// Write one register
    pub fn write(
        &mut self,
        command: WriteCommand,
        motor: Option<MotorSelect>,
        value: u8,
    ) -> Result<bool> {
        let byte = command_byte(command.opcode(), motor);
        debug!("{:?} on {:?}: 0x{:02x}", command, motor, value);
        let transaction = write_transaction(self.address, byte, &[value]);
        Ok(self.run(&[transaction_step(&transaction)])?.success)
    }

    /// Read one register of one motor
    pub fn read(&mut self, command: ReadCommand, motor: MotorSelect) -> Result<Reading> {
        let byte = command_byte(command.opcode(), Some(motor));
        let transaction = read_transaction(self.address, byte, command.response_len());
        let outcome = self.run(&[transaction_step(&transaction)])?;
        if !outcome.success {
            return Ok(Reading::default());
        }
        let tokens = read_tokens(&outcome.trace);
        debug!("{:?} on {}: {:?}", command, motor.label(), tokens);
        Ok(Reading {
            success: true,
            tokens,
        })
    }

    pub fn set_intensity(&mut self, motor: MotorSelect, pwm: u8) -> Result<bool> {
        self.write(WriteCommand::SetIntensity, Some(motor), pwm)
    }

    pub fn set_direction(&mut self, motor: MotorSelect, status: MotorStatus) -> Result<bool> {
        self.write(WriteCommand::SetDirection, Some(motor), status.code())
    }

    /// Intensity first, then direction
    pub fn apply(&mut self, motor: MotorSelect, setting: MotorSetting) -> Result<bool> {
        info!(
            "Applying {} pwm={} to {}",
            setting.status,
            setting.pwm,
            motor.label()
        );
        let intensity = self.set_intensity(motor, setting.pwm)?;
        let direction = self.set_direction(motor, setting.status)?;
        Ok(intensity && direction)
    }

    /// Apply a list of settings in order; true when every write was acknowledged
    pub fn apply_plan(&mut self, plan: &[(MotorSelect, MotorSetting)]) -> Result<bool> {
        let mut all_ok = true;
        for &(motor, setting) in plan {
            all_ok &= self.apply(motor, setting)?;
        }
        Ok(all_ok)
    }

    /// Stop every motor: zero duty, idle direction
    pub fn halt(&mut self) -> Result<bool> {
        info!("Halting all motors");
        self.apply(MotorSelect::All, MotorSetting::default())
    }

    pub fn set_action(&mut self, action: DriveAction) -> Result<bool> {
        info!("Setting drive action {:?}", action);
        self.write(WriteCommand::SetAction, None, action as u8)
    }

    /// Start the firmware calibration run and read back the tacho registers
    pub fn calibrate(&mut self, telemetry: &mut Telemetry) -> Result<bool> {
        let started = self.set_action(DriveAction::Calibrate)?;
        self.acquire_tacho(telemetry)?;
        Ok(started)
    }

    pub fn reset_register(&mut self, command: WriteCommand, motor: MotorSelect) -> Result<bool> {
        match command {
            WriteCommand::ResetCalibPeriod
            | WriteCommand::ResetAvgPeriod
            | WriteCommand::ResetCount => self.write(command, Some(motor), 0),
            other => {
                warn!("{:?} is not a reset command", other);
                Ok(false)
            }
        }
    }

    /// Read direction and intensity of every corner
    pub fn acquire_raw(&mut self, telemetry: &mut Telemetry) -> Result<()> {
        for motor in MotorSelect::CORNERS {
            for command in ReadCommand::RAW {
                let reading = self.read(command, motor)?;
                if !reading.success {
                    continue;
                }
                let Some(corner) = telemetry.corner_mut(motor) else {
                    continue;
                };
                match command {
                    ReadCommand::GetDirection => {
                        if let Some(status) = decode_status(&reading.tokens) {
                            corner.direction = Some(status);
                        }
                    }
                    ReadCommand::GetIntensity => {
                        if let Some(pwm) = decode_byte(&reading.tokens) {
                            corner.intensity = Some(pwm);
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Read tachometer counters and calibration constants of every corner
    pub fn acquire_tacho(&mut self, telemetry: &mut Telemetry) -> Result<()> {
        for motor in MotorSelect::CORNERS {
            for command in ReadCommand::TACHO {
                let reading = self.read(command, motor)?;
                if !reading.success {
                    continue;
                }
                let Some(corner) = telemetry.corner_mut(motor) else {
                    continue;
                };
                let tokens = &reading.tokens;
                match command {
                    ReadCommand::GetCalibPeriod => {
                        corner.calib_period = decode_counter(tokens).or(corner.calib_period)
                    }
                    ReadCommand::GetAvgPeriod => {
                        corner.avg_period = decode_counter(tokens).or(corner.avg_period)
                    }
                    ReadCommand::GetCount => corner.count = decode_counter(tokens).or(corner.count),
                    ReadCommand::GetM => corner.m = decode_float(tokens).or(corner.m),
                    ReadCommand::GetQ => corner.q = decode_float(tokens).or(corner.q),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    pub fn acquire(&mut self, telemetry: &mut Telemetry) -> Result<()> {
        self.acquire_raw(telemetry)?;
        self.acquire_tacho(telemetry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::mock::MockTransport;
    use crate::bridge::SettleDrain;
    use std::time::Duration;

    fn controller(replies: &[&str]) -> MotorController<MockTransport> {
        let console = Console::with_reader(
            MockTransport::with_replies(replies),
            Box::new(SettleDrain::new(Duration::ZERO)),
        );
        MotorController::new(console, 0x10)
    }

    fn written(controller: &MotorController<MockTransport>) -> Vec<String> {
        controller.console().transport().written.clone()
    }

    fn read_reply(bytes: &[&str]) -> String {
        format!("WRITE: 0x20 ACK\r\nREAD: {} NACK\r\nI2C STOP BIT\r\nI2C>", bytes.join(" ACK "))
    }

    #[test]
    fn test_enter_i2c_mode() {
        let mut c = controller(&["1. HiZ\r\n(1)>", "x\r\n(1)>", "y\r\n(1)>", "Ready\r\nI2C>"]);
        assert!(c.enter_i2c_mode().unwrap());
        assert_eq!(c.take_journal().len(), 4);
        assert!(c.take_journal().is_empty());
    }

    #[test]
    fn test_enter_i2c_mode_aborts_on_wrong_prompt() {
        let mut c = controller(&["HiZ>", "(1)>", "(1)>", "I2C>"]);
        assert!(!c.enter_i2c_mode().unwrap());
        assert_eq!(written(&c).len(), 1);
    }

    #[test]
    fn test_apply_writes_intensity_then_direction() {
        let mut c = controller(&["I2C>", "I2C>"]);
        let setting = MotorSetting {
            status: MotorStatus::Forward,
            pwm: 0x80,
        };
        assert!(c.apply(MotorSelect::LeftFront, setting).unwrap());
        assert_eq!(
            written(&c),
            vec!["[ 0x20 0x13 0x80 ]\n", "[ 0x20 0x23 0x02 ]\n"]
        );
    }

    #[test]
    fn test_halt_targets_all_motors() {
        let mut c = controller(&["I2C>", "I2C>"]);
        assert!(c.halt().unwrap());
        assert_eq!(
            written(&c),
            vec!["[ 0x20 0x14 0x00 ]\n", "[ 0x20 0x24 0x00 ]\n"]
        );
    }

    #[test]
    fn test_set_action_ignores_motor_nibble() {
        let mut c = controller(&["I2C>"]);
        assert!(c.set_action(DriveAction::Calibrate).unwrap());
        assert_eq!(written(&c), vec!["[ 0x20 0x30 0x01 ]\n"]);
    }

    #[test]
    fn test_read_collects_tokens() {
        let reply = read_reply(&["0x01", "0x02"]);
        let mut c = controller(&[reply.as_str()]);
        let reading = c.read(ReadCommand::GetCount, MotorSelect::RightRear).unwrap();
        assert!(reading.success);
        assert_eq!(reading.tokens, vec!["0x01", "0x02"]);
        assert_eq!(written(&c), vec!["[ 0x20 0x61 [ 0x21 r r ]\n"]);
    }

    #[test]
    fn test_failed_read_yields_no_tokens() {
        let mut c = controller(&["READ: 0x01\r\nHiZ>"]);
        let reading = c.read(ReadCommand::GetIntensity, MotorSelect::LeftRear).unwrap();
        assert!(!reading.success);
        assert!(reading.tokens.is_empty());
    }

    #[test]
    fn test_acquire_raw_fills_telemetry() {
        // Direction then intensity for LF, LR, RF, RR
        let replies: Vec<String> = [
            "0x02", "0x40", "0x01", "0x10", "0x00", "0x00", "0x03", "0xff",
        ]
        .iter()
        .map(|b| read_reply(&[b]))
        .collect();
        let replies: Vec<&str> = replies.iter().map(String::as_str).collect();
        let mut c = controller(&replies);
        let mut telemetry = Telemetry::default();

        c.acquire_raw(&mut telemetry).unwrap();

        let lf = telemetry.corner(MotorSelect::LeftFront).unwrap();
        assert_eq!(lf.direction, Some(MotorStatus::Forward));
        assert_eq!(lf.intensity, Some(0x40));
        let rr = telemetry.corner(MotorSelect::RightRear).unwrap();
        assert_eq!(rr.direction, Some(MotorStatus::Locked));
        assert_eq!(rr.intensity, Some(0xff));
    }

    #[test]
    fn test_acquire_keeps_previous_value_when_read_fails() {
        let mut telemetry = Telemetry::default();
        telemetry.corners[0].intensity = Some(7);
        // Only the LF direction read answers; everything else is silent
        let first = read_reply(&["0x01"]);
        let mut c = controller(&[first.as_str()]);

        c.acquire_raw(&mut telemetry).unwrap();

        assert_eq!(telemetry.corners[0].direction, Some(MotorStatus::Backward));
        assert_eq!(telemetry.corners[0].intensity, Some(7));
    }

    #[test]
    fn test_acquire_tacho_decodes_counters_and_floats() {
        let mut replies = vec![
            read_reply(&["0x34", "0x12"]),
            read_reply(&["0x00", "0x01"]),
            read_reply(&["0x05", "0x00"]),
            read_reply(&["0x00", "0x00", "0xc0", "0x3f"]),
            read_reply(&["0x00", "0x00", "0x80", "0xbf"]),
        ];
        replies.extend(std::iter::repeat_n("I2C>".to_string(), 15));
        let replies: Vec<&str> = replies.iter().map(String::as_str).collect();
        let mut c = controller(&replies);
        let mut telemetry = Telemetry::default();

        c.acquire_tacho(&mut telemetry).unwrap();

        let lf = telemetry.corner(MotorSelect::LeftFront).unwrap();
        assert_eq!(lf.calib_period, Some(0x1234));
        assert_eq!(lf.avg_period, Some(0x0100));
        assert_eq!(lf.count, Some(5));
        assert_eq!(lf.m, Some(1.5));
        assert_eq!(lf.q, Some(-1.0));
        assert_eq!(telemetry.corners[1], Default::default());
    }

    #[test]
    fn test_reset_register_rejects_non_reset_commands() {
        let mut c = controller(&["I2C>"]);
        assert!(!c.reset_register(WriteCommand::SetIntensity, MotorSelect::All).unwrap());
        assert!(written(&c).is_empty());
        assert!(c.reset_register(WriteCommand::ResetCount, MotorSelect::LeftRear).unwrap());
        assert_eq!(written(&c), vec!["[ 0x20 0x60 0x00 ]\n"]);
    }
}
