// Screen layout of the control panel

use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

use super::state::{InputMode, PanelState};
use crate::messages::CornerTelemetry;
use crate::motor::telemetry::format_counter;
use crate::motor::MotorSelect;

const KEYS_HELP: &str =
    "i:I2C mode  p:port  Tab:scope  arrows:select/status  +/-/PgUp/PgDn:pwm  a:apply  g:acquire  h:halt  c:calibrate  d:disable  r:raw  j:json  q:quit";

fn or_dash<T>(value: Option<T>, render: impl Fn(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| "-".to_string())
}

fn telemetry_row(motor: MotorSelect, t: &CornerTelemetry) -> String {
    format!(
        "  {:<12} {:<9} {:>5} {:>8} {:>8} {:>8} {:>9} {:>9}",
        motor.label(),
        or_dash(t.direction, |s| s.to_string()),
        or_dash(t.intensity, |v| format!("0x{:02x}", v)),
        or_dash(t.calib_period, |v| format_counter(v, 2)),
        or_dash(t.avg_period, |v| format_counter(v, 2)),
        or_dash(t.count, |v| format_counter(v, 2)),
        or_dash(t.m, |v| format!("{:.2}", v)),
        or_dash(t.q, |v| format!("{:.2}", v)),
    )
}

/// Lines of the screen, top to bottom, for a terminal `height` rows tall
pub fn compose(state: &PanelState, height: usize) -> Vec<String> {
    let mut lines = Vec::new();

    let port_marker = if state.mode == InputMode::PortPath { "_" } else { "" };
    lines.push(format!(
        "Port: {}{}   Address: 0x{:02x}   Serial: {}   I2C: {}",
        state.port,
        port_marker,
        state.address,
        if state.port_open { "open" } else { "closed" },
        if state.i2c_ready { "ready" } else { "not ready" },
    ));
    lines.push(String::new());

    lines.push(format!("Motors [{}]", state.scope.label()));
    for (i, &row) in state.scope.rows().iter().enumerate() {
        let setting = state.setting(row);
        let marker = if i == state.cursor { '>' } else { ' ' };
        lines.push(format!(
            "{} {:<12} status: {:<9} pwm: {:>3}",
            marker,
            row.label(),
            setting.status.as_str(),
            setting.pwm
        ));
    }
    lines.push(String::new());

    lines.push(format!(
        "  {:<12} {:<9} {:>5} {:>8} {:>8} {:>8} {:>9} {:>9}",
        "Telemetry", "direction", "pwm", "calib", "avg", "count", "M", "Q"
    ));
    for (motor, corner) in MotorSelect::CORNERS.iter().zip(&state.telemetry.corners) {
        lines.push(telemetry_row(*motor, corner));
    }
    lines.push(String::new());

    let raw_marker = if state.mode == InputMode::RawCommand { "_" } else { "" };
    let transmit = if state.port_open { "" } else { " (open the port first)" };
    lines.push(format!("Raw command{}: {}{}", transmit, state.input, raw_marker));
    let recent: Vec<&str> = state.history().iter().rev().take(3).map(String::as_str).collect();
    if !recent.is_empty() {
        lines.push(format!("History: {}", recent.join("  |  ")));
    }
    lines.push(String::new());
    lines.push("Log".to_string());

    // Fill what is left with the newest log lines, keeping the help line
    let remaining = height.saturating_sub(lines.len() + 1);
    let skip = state.log_lines().len().saturating_sub(remaining);
    lines.extend(state.log_lines().skip(skip).map(|l| format!("  {}", l)));

    lines.push(KEYS_HELP.to_string());
    lines
}

/// Redraw the whole screen
pub fn render<W: Write>(out: &mut W, state: &PanelState, width: u16, height: u16) -> io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in compose(state, height as usize).iter().enumerate() {
        let clipped: String = line.chars().take(width as usize).collect();
        queue!(out, MoveTo(0, row as u16), Print(clipped))?;
    }
    out.flush()
}
