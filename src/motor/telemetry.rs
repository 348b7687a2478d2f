// Reassembly of register values from the hex tokens echoed by the bridge
//
// The firmware sends multi-byte registers little-endian, so the tokens are
// reversed before concatenation. Anything that does not decode cleanly yields
// None and the caller keeps its previous value.

use super::catalog::MotorStatus;

/// Parse one `0x..` token into a byte
fn parse_token(token: &str) -> Option<u8> {
    let start = token.find("0x")? + 2;
    let digits = token[start..].trim_end_matches(|c: char| !c.is_ascii_hexdigit());
    u8::from_str_radix(digits, 16).ok()
}

/// Parse every token, failing if any of them is not a hex byte
pub fn parse_bytes(tokens: &[String]) -> Option<Vec<u8>> {
    if tokens.is_empty() {
        return None;
    }
    tokens.iter().map(|t| parse_token(t)).collect()
}

/// Single-byte register
pub fn decode_byte(tokens: &[String]) -> Option<u8> {
    match parse_bytes(tokens)?.as_slice() {
        [b] => Some(*b),
        _ => None,
    }
}

pub fn decode_status(tokens: &[String]) -> Option<MotorStatus> {
    decode_byte(tokens).and_then(MotorStatus::from_code)
}

/// Counter or period register of up to four bytes
pub fn decode_counter(tokens: &[String]) -> Option<u32> {
    let bytes = parse_bytes(tokens)?;
    if bytes.len() > 4 {
        return None;
    }
    Some(bytes.iter().rev().fold(0u32, |acc, &b| (acc << 8) | b as u32))
}

/// IEEE-754 single precision register (the M and Q calibration constants)
pub fn decode_float(tokens: &[String]) -> Option<f32> {
    let bytes: [u8; 4] = parse_bytes(tokens)?.try_into().ok()?;
    Some(f32::from_le_bytes(bytes))
}

/// Render a counter as `0x` followed by two hex digits per register byte
pub fn format_counter(value: u32, width_bytes: usize) -> String {
    format!("0x{:0width$x}", value, width = width_bytes * 2)
}
