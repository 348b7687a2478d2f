// Integer argument parsers shared by the command-line tools

/// Parse an integer in any base: `0x` hex, `0o` octal, `0b` binary, else decimal
pub fn parse_auto_int(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };
    u32::from_str_radix(&digits.replace('_', ""), radix)
        .map_err(|e| format!("invalid integer '{}': {}", s, e))
}

/// Parse a value that must fit in one byte
pub fn parse_byte(s: &str) -> Result<u8, String> {
    let value = parse_auto_int(s)?;
    u8::try_from(value).map_err(|_| format!("{} does not fit in a byte", s))
}

/// Parse a 7-bit I2C slave address
pub fn parse_address(s: &str) -> Result<u8, String> {
    let value = parse_auto_int(s)?;
    if value > 0x7f {
        return Err(format!("{} is not a 7-bit I2C address", s));
    }
    Ok(value as u8)
}
