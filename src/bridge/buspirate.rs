// Bus Pirate I2C text syntax
//
// Transactions are typed at the I2C> prompt:
//   [ 0x20 0x13 0x3f ]         start, address+W, command, data, stop
//   [ 0x20 0x21 [ 0x21 r r ]   start, address+W, command, restart, address+R, reads, stop
// Bytes read back are echoed on lines containing "READ".

use crate::config::{I2C_PROMPT, MENU_PROMPT};
use crate::messages::{IoRecord, SequenceStep};

fn hex(byte: u8) -> String {
    format!("0x{:02x}", byte)
}

/// Write transaction: address with the write bit clear, command, then data bytes
pub fn write_transaction(address: u8, command: u8, data: &[u8]) -> String {
    let mut parts = vec!["[".to_string(), hex(address << 1), hex(command)];
    parts.extend(data.iter().map(|&b| hex(b)));
    parts.push("]".to_string());
    parts.join(" ")
}

/// Command write followed by a restart and `count` byte reads
pub fn read_transaction(address: u8, command: u8, count: usize) -> String {
    let mut parts = vec![
        "[".to_string(),
        hex(address << 1),
        hex(command),
        "[".to_string(),
        hex((address << 1) | 1),
    ];
    parts.extend(std::iter::repeat_n("r".to_string(), count));
    parts.push("]".to_string());
    parts.join(" ")
}

/// Step for an I2C transaction typed at the prompt
pub fn transaction_step(transaction: &str) -> SequenceStep {
    SequenceStep::new(format!("{}\n", transaction), I2C_PROMPT)
}

/// Step for a free-form command whose reply is not checked
pub fn raw_step(command: &str) -> SequenceStep {
    SequenceStep::new(format!("{}\n", command), "")
}

/// Menu walk from power-up to the I2C prompt: mode menu, I2C, clock, pull-ups
pub fn enter_i2c_mode_sequence() -> Vec<SequenceStep> {
    vec![
        SequenceStep::new("\nmenu\n", MENU_PROMPT),
        SequenceStep::new("4\n", MENU_PROMPT),
        SequenceStep::new("2\n", MENU_PROMPT),
        SequenceStep::new("2\n", I2C_PROMPT),
    ]
}

/// Collect the hex tokens of every `READ` line in the trace, in order
pub fn read_tokens(trace: &[IoRecord]) -> Vec<String> {
    trace
        .iter()
        .flat_map(|record| record.output.lines())
        .filter(|line| line.contains("READ"))
        .flat_map(str::split_whitespace)
        .filter(|token| token.contains("0x"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_transaction() {
        assert_eq!(
            write_transaction(0x10, 0x11, &[0x01, 0x02]),
            "[ 0x20 0x11 0x01 0x02 ]"
        );
    }

    #[test]
    fn test_write_transaction_without_data() {
        assert_eq!(write_transaction(0x10, 0x30, &[]), "[ 0x20 0x30 ]");
    }

    #[test]
    fn test_read_transaction() {
        assert_eq!(read_transaction(0x10, 0x22, 2), "[ 0x20 0x22 [ 0x21 r r ]");
        assert_eq!(read_transaction(0x10, 0x84, 4), "[ 0x20 0x84 [ 0x21 r r r r ]");
    }

    #[test]
    fn test_transaction_step_expects_prompt() {
        let step = transaction_step("[ 0x20 0x14 0x00 ]");
        assert_eq!(step.command, "[ 0x20 0x14 0x00 ]\n");
        assert_eq!(step.expect, "I2C>");
    }

    #[test]
    fn test_enter_i2c_mode_sequence() {
        let seq = enter_i2c_mode_sequence();
        let commands: Vec<_> = seq.iter().map(|s| s.command.as_str()).collect();
        assert_eq!(commands, vec!["\nmenu\n", "4\n", "2\n", "2\n"]);
        assert_eq!(seq[3].expect, "I2C>");
    }

    #[test]
    fn test_read_tokens_from_read_lines_only() {
        let trace = vec![IoRecord {
            command: "[ 0x20 0x61 [ 0x21 r r ]\n".into(),
            output: "I2C START BIT\r\nWRITE: 0x20 ACK \r\nWRITE: 0x61 ACK \r\n\
                     I2C START BIT\r\nWRITE: 0x21 ACK \r\nREAD: 0x34  ACK 0x12 \r\n\
                     NACK\r\nI2C STOP BIT\r\nI2C>"
                .into(),
        }];
        assert_eq!(read_tokens(&trace), vec!["0x34", "0x12"]);
    }

    #[test]
    fn test_read_tokens_missing() {
        let trace = vec![IoRecord {
            command: "x\n".into(),
            output: "WRITE: 0x20 NACK\r\nI2C>".into(),
        }];
        assert!(read_tokens(&trace).is_empty());
    }
}
