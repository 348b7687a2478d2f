// Register map of the motor controller firmware
//
// Every I2C command byte packs an opcode in the high nibble and the motor
// sub-address in the low nibble: (opcode << 4) | sub_address.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Motors addressable on the controller
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorSelect {
    LeftRear = 0,
    RightRear = 1,
    RightFront = 2,
    LeftFront = 3,
    All = 4,
}

impl MotorSelect {
    /// Individual motors, in the order the panel scans them
    pub const CORNERS: [MotorSelect; 4] = [
        MotorSelect::LeftFront,
        MotorSelect::LeftRear,
        MotorSelect::RightFront,
        MotorSelect::RightRear,
    ];

    pub fn sub_address(self) -> u8 {
        self as u8
    }

    /// Position in `CORNERS`, None for `All`
    pub fn corner_index(self) -> Option<usize> {
        Self::CORNERS.iter().position(|&m| m == self)
    }

    pub fn label(self) -> &'static str {
        match self {
            MotorSelect::LeftRear => "left rear",
            MotorSelect::RightRear => "right rear",
            MotorSelect::RightFront => "right front",
            MotorSelect::LeftFront => "left front",
            MotorSelect::All => "all",
        }
    }
}

/// Direction state of a motor, as encoded by the firmware
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorStatus {
    #[default]
    Idle = 0,
    Backward = 1,
    Forward = 2,
    Locked = 3,
}

impl MotorStatus {
    pub const ALL: [MotorStatus; 4] = [
        MotorStatus::Idle,
        MotorStatus::Backward,
        MotorStatus::Forward,
        MotorStatus::Locked,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MotorStatus::Idle => "idle",
            MotorStatus::Backward => "backward",
            MotorStatus::Forward => "forward",
            MotorStatus::Locked => "locked",
        }
    }

    /// Next status, wrapping around
    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }

    /// Previous status, wrapping around
    pub fn prev(self) -> Self {
        Self::ALL[(self as usize + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for MotorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown motor status '{}'", s))
    }
}

/// Registers read back from the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCommand {
    GetIntensity,
    GetDirection,
    GetCalibPeriod,
    GetAvgPeriod,
    GetCount,
    GetM,
    GetQ,
}

impl ReadCommand {
    /// Registers polled by "acquire raw"
    pub const RAW: [ReadCommand; 2] = [ReadCommand::GetDirection, ReadCommand::GetIntensity];

    /// Registers polled by "acquire tacho"
    pub const TACHO: [ReadCommand; 5] = [
        ReadCommand::GetCalibPeriod,
        ReadCommand::GetAvgPeriod,
        ReadCommand::GetCount,
        ReadCommand::GetM,
        ReadCommand::GetQ,
    ];

    pub fn opcode(self) -> u8 {
        match self {
            ReadCommand::GetIntensity => 0x1,
            ReadCommand::GetDirection => 0x2,
            ReadCommand::GetCalibPeriod => 0x4,
            ReadCommand::GetAvgPeriod => 0x5,
            ReadCommand::GetCount => 0x6,
            ReadCommand::GetM => 0x7,
            ReadCommand::GetQ => 0x8,
        }
    }

    /// Number of bytes the firmware returns for this register
    pub fn response_len(self) -> usize {
        match self {
            ReadCommand::GetIntensity | ReadCommand::GetDirection => 1,
            ReadCommand::GetCalibPeriod | ReadCommand::GetAvgPeriod | ReadCommand::GetCount => 2,
            ReadCommand::GetM | ReadCommand::GetQ => 4,
        }
    }
}

/// Registers written to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCommand {
    SetIntensity,
    SetDirection,
    SetAction,
    ResetCalibPeriod,
    ResetAvgPeriod,
    ResetCount,
}

impl WriteCommand {
    pub fn opcode(self) -> u8 {
        match self {
            WriteCommand::SetIntensity => 0x1,
            WriteCommand::SetDirection => 0x2,
            WriteCommand::SetAction => 0x3,
            WriteCommand::ResetCalibPeriod => 0x4,
            WriteCommand::ResetAvgPeriod => 0x5,
            WriteCommand::ResetCount => 0x6,
        }
    }
}

/// Payload of `SetAction`: the drive mode the firmware should switch to
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveAction {
    Disabled = 0,
    Calibrate = 1,
}

/// Build the command byte for an opcode; `None` leaves the motor nibble at 0
pub fn command_byte(opcode: u8, motor: Option<MotorSelect>) -> u8 {
    (opcode << 4) | motor.map_or(0, MotorSelect::sub_address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sub_addresses_are_distinct() {
        let all = [
            MotorSelect::LeftRear,
            MotorSelect::RightRear,
            MotorSelect::RightFront,
            MotorSelect::LeftFront,
            MotorSelect::All,
        ];
        let unique: HashSet<u8> = all.iter().map(|m| m.sub_address()).collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_command_byte() {
        assert_eq!(
            command_byte(WriteCommand::SetIntensity.opcode(), Some(MotorSelect::LeftFront)),
            0x13
        );
        assert_eq!(command_byte(ReadCommand::GetQ.opcode(), Some(MotorSelect::All)), 0x84);
        assert_eq!(command_byte(WriteCommand::SetAction.opcode(), None), 0x30);
    }

    #[test]
    fn test_direction_round_trip() {
        let code = MotorStatus::Forward.code();
        assert_eq!(code, 2);
        assert_eq!(MotorStatus::from_code(code), Some(MotorStatus::Forward));

        for status in MotorStatus::ALL {
            assert_eq!(MotorStatus::from_code(status.code()), Some(status));
            assert_eq!(status.as_str().parse::<MotorStatus>(), Ok(status));
        }
        assert_eq!(MotorStatus::from_code(4), None);
    }

    #[test]
    fn test_status_cycling() {
        assert_eq!(MotorStatus::Idle.next(), MotorStatus::Backward);
        assert_eq!(MotorStatus::Locked.next(), MotorStatus::Idle);
        assert_eq!(MotorStatus::Idle.prev(), MotorStatus::Locked);
    }

    #[test]
    fn test_response_lengths() {
        assert_eq!(ReadCommand::GetDirection.response_len(), 1);
        assert_eq!(ReadCommand::GetCount.response_len(), 2);
        assert_eq!(ReadCommand::GetM.response_len(), 4);
    }
}
