// Panel state: everything the screen shows and every key it accepts
//
// Kept free of I/O so key handling and apply planning can be tested without a
// terminal or an adapter.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;

use crate::config::{HISTORY_LEN, LOG_LINES};
use crate::messages::{MotorSetting, Telemetry};
use crate::motor::MotorSelect;

/// How motor settings are grouped when applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionScope {
    All,
    Sides,
    Individual,
}

impl SelectionScope {
    pub fn next(self) -> Self {
        match self {
            SelectionScope::All => SelectionScope::Sides,
            SelectionScope::Sides => SelectionScope::Individual,
            SelectionScope::Individual => SelectionScope::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SelectionScope::All => "All motors",
            SelectionScope::Sides => "Sides",
            SelectionScope::Individual => "Individual motors",
        }
    }

    /// Rows editable in this scope
    pub fn rows(self) -> &'static [SettingsRow] {
        match self {
            SelectionScope::All => &[SettingsRow::All],
            SelectionScope::Sides => &[SettingsRow::LeftSide, SettingsRow::RightSide],
            SelectionScope::Individual => &[
                SettingsRow::LeftFront,
                SettingsRow::LeftRear,
                SettingsRow::RightFront,
                SettingsRow::RightRear,
            ],
        }
    }
}

/// One editable status/PWM pair on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    All,
    LeftSide,
    RightSide,
    LeftFront,
    LeftRear,
    RightFront,
    RightRear,
}

impl SettingsRow {
    const COUNT: usize = 7;

    fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            SettingsRow::All => "All",
            SettingsRow::LeftSide => "Left side",
            SettingsRow::RightSide => "Right side",
            SettingsRow::LeftFront => "Left front",
            SettingsRow::LeftRear => "Left rear",
            SettingsRow::RightFront => "Right front",
            SettingsRow::RightRear => "Right rear",
        }
    }
}

/// Which text field, if any, has the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    RawCommand,
    PortPath,
}

/// Work the panel asks the adapter side to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    EnterI2cMode,
    Apply,
    Acquire,
    Halt,
    Calibrate,
    DisableDrive,
    Transmit(String),
    DumpTelemetry,
    Quit,
}

pub struct PanelState {
    pub port: String,
    pub address: u8,
    pub port_open: bool,
    pub i2c_ready: bool,
    pub scope: SelectionScope,
    pub cursor: usize,
    settings: [MotorSetting; SettingsRow::COUNT],
    pub telemetry: Telemetry,
    pub mode: InputMode,
    pub input: String,
    history: Vec<String>,
    history_cursor: Option<usize>,
    log: VecDeque<String>,
}

impl PanelState {
    pub fn new(port: impl Into<String>, address: u8) -> Self {
        let mut state = Self {
            port: port.into(),
            address,
            port_open: false,
            i2c_ready: false,
            scope: SelectionScope::All,
            cursor: 0,
            settings: [MotorSetting::default(); SettingsRow::COUNT],
            telemetry: Telemetry::default(),
            mode: InputMode::Normal,
            input: String::new(),
            history: Vec::new(),
            history_cursor: None,
            log: VecDeque::new(),
        };
        state.reset_raw_command();
        state
    }

    pub fn setting(&self, row: SettingsRow) -> MotorSetting {
        self.settings[row.index()]
    }

    pub fn setting_mut(&mut self, row: SettingsRow) -> &mut MotorSetting {
        &mut self.settings[row.index()]
    }

    pub fn focused_row(&self) -> SettingsRow {
        let rows = self.scope.rows();
        rows[self.cursor.min(rows.len() - 1)]
    }

    pub fn cycle_scope(&mut self) {
        self.scope = self.scope.next();
        self.cursor = 0;
    }

    pub fn move_cursor(&mut self, down: bool) {
        let len = self.scope.rows().len();
        self.cursor = if down {
            (self.cursor + 1) % len
        } else {
            (self.cursor + len - 1) % len
        };
    }

    pub fn cycle_status(&mut self, forward: bool) {
        let row = self.focused_row();
        let setting = self.setting_mut(row);
        setting.status = if forward {
            setting.status.next()
        } else {
            setting.status.prev()
        };
    }

    pub fn adjust_pwm(&mut self, delta: i16) {
        let row = self.focused_row();
        let setting = self.setting_mut(row);
        setting.pwm = (setting.pwm as i16 + delta).clamp(0, u8::MAX as i16) as u8;
    }

    /// Targets and settings written by "apply" for the current scope
    pub fn apply_plan(&self) -> Vec<(MotorSelect, MotorSetting)> {
        match self.scope {
            SelectionScope::All => vec![(MotorSelect::All, self.setting(SettingsRow::All))],
            SelectionScope::Sides => {
                let left = self.setting(SettingsRow::LeftSide);
                let right = self.setting(SettingsRow::RightSide);
                vec![
                    (MotorSelect::LeftFront, left),
                    (MotorSelect::LeftRear, left),
                    (MotorSelect::RightFront, right),
                    (MotorSelect::RightRear, right),
                ]
            }
            SelectionScope::Individual => vec![
                (MotorSelect::LeftFront, self.setting(SettingsRow::LeftFront)),
                (MotorSelect::LeftRear, self.setting(SettingsRow::LeftRear)),
                (MotorSelect::RightFront, self.setting(SettingsRow::RightFront)),
                (MotorSelect::RightRear, self.setting(SettingsRow::RightRear)),
            ],
        }
    }

    /// Halt leaves every row at idle/0 so the screen matches the motors
    pub fn reset_settings(&mut self) {
        self.settings = [MotorSetting::default(); SettingsRow::COUNT];
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn add_to_history(&mut self, command: &str) {
        if command.is_empty() || self.history.iter().any(|c| c == command) {
            return;
        }
        if self.history.len() == HISTORY_LEN {
            self.history.remove(0);
        }
        self.history.push(command.to_string());
    }

    fn recall_history(&mut self, older: bool) {
        if self.history.is_empty() {
            return;
        }
        let last = self.history.len() - 1;
        let next = match (self.history_cursor, older) {
            (None, true) => last,
            (None, false) => return,
            (Some(i), true) => i.saturating_sub(1),
            (Some(i), false) if i >= last => {
                self.history_cursor = None;
                self.reset_raw_command();
                return;
            }
            (Some(i), false) => i + 1,
        };
        self.history_cursor = Some(next);
        self.input = self.history[next].clone();
    }

    /// Start the raw command over from an empty transaction to the slave
    pub fn reset_raw_command(&mut self) {
        self.input = format!("[ 0x{:02x} ]", self.address << 1);
    }

    pub fn log_lines(&self) -> impl DoubleEndedIterator<Item = &String> + ExactSizeIterator {
        self.log.iter()
    }

    /// Append text to the log pane, one entry per line
    pub fn log(&mut self, text: &str) {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            if self.log.len() == LOG_LINES {
                self.log.pop_front();
            }
            self.log.push_back(line.trim_end().to_string());
        }
    }

    /// Translate a key press into a state change and maybe an action
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::RawCommand => self.handle_raw_key(key),
            InputMode::PortPath => {
                self.handle_port_key(key);
                None
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(Action::Quit),
            KeyCode::Char('i') => return Some(Action::EnterI2cMode),
            KeyCode::Char('a') => return Some(Action::Apply),
            KeyCode::Char('g') => return Some(Action::Acquire),
            KeyCode::Char('h') => return Some(Action::Halt),
            KeyCode::Char('c') => return Some(Action::Calibrate),
            KeyCode::Char('d') => return Some(Action::DisableDrive),
            KeyCode::Char('j') => return Some(Action::DumpTelemetry),
            KeyCode::Char('r') => {
                self.mode = InputMode::RawCommand;
                self.history_cursor = None;
            }
            KeyCode::Char('p') => {
                self.mode = InputMode::PortPath;
            }
            KeyCode::Tab => self.cycle_scope(),
            KeyCode::Up => self.move_cursor(false),
            KeyCode::Down => self.move_cursor(true),
            KeyCode::Left => self.cycle_status(false),
            KeyCode::Right => self.cycle_status(true),
            KeyCode::Char('+') => self.adjust_pwm(1),
            KeyCode::Char('-') => self.adjust_pwm(-1),
            KeyCode::PageUp => self.adjust_pwm(16),
            KeyCode::PageDown => self.adjust_pwm(-16),
            _ => {}
        }
        None
    }

    fn handle_raw_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                let command = self.input.trim().to_string();
                if command.is_empty() {
                    return None;
                }
                self.add_to_history(&command);
                self.history_cursor = None;
                return Some(Action::Transmit(command));
            }
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Up => self.recall_history(true),
            KeyCode::Down => self.recall_history(false),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_raw_command()
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        None
    }

    fn handle_port_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.port.pop();
            }
            KeyCode::Char(c) => self.port.push(c),
            _ => {}
        }
    }
}
