// Records exchanged between the bridge, the motor controller and the panel

use serde::{Deserialize, Serialize};

use crate::motor::catalog::{MotorSelect, MotorStatus};

/// One command of a sequence together with the reply ending it must produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceStep {
    pub command: String,
    pub expect: String,
}

impl SequenceStep {
    pub fn new(command: impl Into<String>, expect: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            expect: expect.into(),
        }
    }
}

/// A command as written and everything drained back for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoRecord {
    pub command: String,
    pub output: String,
}

/// Result of running a command sequence
///
/// `success` is true only when every step ran and matched. The trace holds one
/// record per executed step, so on failure its last record is the mismatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceOutcome {
    pub success: bool,
    pub trace: Vec<IoRecord>,
}

/// Status and duty value requested for a motor or group of motors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MotorSetting {
    pub status: MotorStatus,
    pub pwm: u8,
}

/// Last values read back from one corner motor
// None means "never read" or "last read did not decode"
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CornerTelemetry {
    pub direction: Option<MotorStatus>,
    pub intensity: Option<u8>,
    pub calib_period: Option<u32>,
    pub avg_period: Option<u32>,
    pub count: Option<u32>,
    pub m: Option<f32>,
    pub q: Option<f32>,
}

/// Telemetry for the four corners, in `MotorSelect::CORNERS` order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub corners: [CornerTelemetry; 4],
}

impl Telemetry {
    pub fn corner(&self, motor: MotorSelect) -> Option<&CornerTelemetry> {
        motor.corner_index().map(|i| &self.corners[i])
    }

    pub fn corner_mut(&mut self, motor: MotorSelect) -> Option<&mut CornerTelemetry> {
        motor.corner_index().map(move |i| &mut self.corners[i])
    }
}
