// Command/response handshake over the Bus Pirate text console
//
// A command is written, the reader waits for the reply, and the reply is
// compared against the prompt the command is expected to end on.

use serialport::SerialPort;
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::transport::{open_port, Result, Transport, BUS_PIRATE};
use crate::config::SETTLE_PER_LINE;
use crate::messages::{IoRecord, SequenceOutcome, SequenceStep};

/// Strategy for collecting the reply to a command that was just written
pub trait ResponseReader {
    fn read_response(&mut self, transport: &mut dyn Transport, command: &str) -> Result<String>;
}

/// Sleep a fixed time per line sent, then drain whatever arrived.
///
/// The device gives no length or terminator, so a slow reply comes back
/// truncated or empty.
#[derive(Debug, Clone, Copy)]
pub struct SettleDrain {
    per_line: Duration,
}

impl SettleDrain {
    pub fn new(per_line: Duration) -> Self {
        Self { per_line }
    }

    pub fn settle_delay(&self, command: &str) -> Duration {
        self.per_line * command.matches('\n').count() as u32
    }
}

impl Default for SettleDrain {
    fn default() -> Self {
        Self::new(SETTLE_PER_LINE)
    }
}

impl ResponseReader for SettleDrain {
    fn read_response(&mut self, transport: &mut dyn Transport, command: &str) -> Result<String> {
        sleep(self.settle_delay(command));

        let mut bytes = Vec::new();
        loop {
            let available = transport.bytes_available()?;
            if available == 0 {
                break;
            }
            let mut buf = vec![0u8; available];
            let n = transport.read_available(&mut buf)?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&buf[..n]);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Text console on the adapter; owns the port for its whole lifetime
pub struct Console<T: Transport> {
    transport: T,
    reader: Box<dyn ResponseReader>,
}

impl Console<Box<dyn SerialPort>> {
    /// Open the Bus Pirate on `path` with its fixed line parameters
    pub fn open(path: &str) -> Result<Self> {
        let port = open_port(path, &BUS_PIRATE)?;
        Ok(Self::new(port))
    }
}

impl<T: Transport> Console<T> {
    pub fn new(transport: T) -> Self {
        Self::with_reader(transport, Box::new(SettleDrain::default()))
    }

    pub fn with_reader(transport: T, reader: Box<dyn ResponseReader>) -> Self {
        Self { transport, reader }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Write a command and return everything read back for it
    pub fn run_command(&mut self, command: &str) -> Result<String> {
        trace!("Sending '{}'", command.escape_default());
        self.transport.write_all(command.as_bytes())?;
        let output = self.reader.read_response(&mut self.transport, command)?;
        trace!("Received '{}'", output.escape_default());
        Ok(output)
    }

    /// Run steps in order, stopping at the first reply that does not end as expected
    pub fn run_sequence(&mut self, steps: &[SequenceStep]) -> Result<SequenceOutcome> {
        let mut trace = Vec::with_capacity(steps.len());

        for step in steps {
            let output = self.run_command(&step.command)?;
            let matched = reply_matches(&output, &step.expect);
            trace.push(IoRecord {
                command: step.command.clone(),
                output,
            });

            if !matched {
                warn!(
                    "Unexpected reply to '{}': received '{}', expected ending '{}'",
                    step.command.trim(),
                    trimmed(&trace[trace.len() - 1].output),
                    step.expect
                );
                return Ok(SequenceOutcome {
                    success: false,
                    trace,
                });
            }
        }

        debug!("Sequence of {} command(s) completed", steps.len());
        Ok(SequenceOutcome {
            success: true,
            trace,
        })
    }
}

fn trimmed(output: &str) -> &str {
    output.trim_matches([' ', '\r', '\n'])
}

/// A reply matches when, stripped of spaces and line breaks, it ends with `expect`
pub fn reply_matches(output: &str, expect: &str) -> bool {
    trimmed(output).ends_with(expect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::mock::MockTransport;

    fn console(replies: &[&str]) -> Console<MockTransport> {
        Console::with_reader(
            MockTransport::with_replies(replies),
            Box::new(SettleDrain::new(Duration::ZERO)),
        )
    }

    fn steps(n: usize) -> Vec<SequenceStep> {
        (0..n)
            .map(|i| SequenceStep::new(format!("cmd{}\n", i), "I2C>"))
            .collect()
    }

    #[test]
    fn test_settle_delay_scales_with_newlines() {
        let reader = SettleDrain::default();
        assert_eq!(reader.settle_delay("2\n"), Duration::from_millis(25));
        assert_eq!(reader.settle_delay("\nmenu\n"), Duration::from_millis(50));
        assert_eq!(reader.settle_delay("no newline"), Duration::ZERO);
    }

    #[test]
    fn test_run_command_drains_reply() {
        let mut console = console(&["ok\r\nI2C>"]);
        let output = console.run_command("[ 0x20 ]\n").unwrap();
        assert_eq!(output, "ok\r\nI2C>");
        assert_eq!(console.transport().written, vec!["[ 0x20 ]\n"]);
    }

    #[test]
    fn test_run_command_without_reply_is_empty() {
        let mut console = console(&[]);
        assert_eq!(console.run_command("x\n").unwrap(), "");
    }

    #[test]
    fn test_sequence_all_match() {
        let mut console = console(&["a\r\nI2C>", "b\r\nI2C> ", "I2C>\r\n"]);
        let outcome = console.run_sequence(&steps(3)).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.trace.len(), 3);
        let commands: Vec<_> = outcome.trace.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, vec!["cmd0\n", "cmd1\n", "cmd2\n"]);
    }

    #[test]
    fn test_sequence_stops_at_first_mismatch() {
        let mut console = console(&["I2C>", "Error\r\nHiZ>", "I2C>", "I2C>"]);
        let outcome = console.run_sequence(&steps(4)).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.trace.len(), 2);
        assert_eq!(outcome.trace[1].output, "Error\r\nHiZ>");
        // Steps after the mismatch never reach the port
        assert_eq!(console.transport().written.len(), 2);
    }

    #[test]
    fn test_empty_expectation_always_matches() {
        let mut console = console(&["anything"]);
        let outcome = console
            .run_sequence(&[SequenceStep::new("[ 0x20 ]\n", "")])
            .unwrap();
        assert!(outcome.success);
    }

    #[test]
    fn test_empty_sequence_succeeds() {
        let mut console = console(&[]);
        let outcome = console.run_sequence(&[]).unwrap();
        assert!(outcome.success);
        assert!(outcome.trace.is_empty());
    }

    #[test]
    fn test_reply_matches_strips_whitespace() {
        assert!(reply_matches("\r\nI2C> \r\n", "I2C>"));
        assert!(!reply_matches("I2C> x", "I2C>"));
    }
}
