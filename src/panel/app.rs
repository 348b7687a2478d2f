// Terminal event loop of the control panel
//
// Runs on one thread: every action talks to the adapter synchronously, so a
// slow device freezes the screen until its settle delays have elapsed.

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use serialport::SerialPort;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{error, info, warn};

use super::state::{Action, PanelState};
use super::view::render;
use crate::bridge::{BridgeError, Console, Transport};
use crate::motor::{DriveAction, MotorController};

/// Opens a console on the port path typed into the panel
pub type Opener<T> = fn(&str) -> Result<Console<T>, BridgeError>;

/// Panel plus the adapter session it drives
pub struct Panel<T: Transport = Box<dyn SerialPort>> {
    state: PanelState,
    controller: Option<MotorController<T>>,
    session_port: Option<String>,
    open: Opener<T>,
}

impl Panel {
    pub fn new(port: &str, address: u8) -> Self {
        Self::with_opener(port, address, Console::open)
    }
}

impl<T: Transport> Panel<T> {
    pub fn with_opener(port: &str, address: u8, open: Opener<T>) -> Self {
        Self {
            state: PanelState::new(port, address),
            controller: None,
            session_port: None,
            open,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Path of the port the current session was opened on
    pub fn session_port(&self) -> Option<&str> {
        self.session_port.as_deref()
    }

    /// Open the port shown in the panel, replacing a session on another path
    fn open_session(&mut self) -> bool {
        let same_port = self.session_port.as_deref() == Some(self.state.port.as_str());
        if same_port && self.controller.is_some() {
            return true;
        }
        if let Some(previous) = self.session_port.take() {
            info!("Closing {}", previous);
            self.controller = None;
            self.state.port_open = false;
            self.state.i2c_ready = false;
        }

        match (self.open)(&self.state.port) {
            Ok(console) => {
                info!("Opened {}", self.state.port);
                self.state.port_open = true;
                self.session_port = Some(self.state.port.clone());
                self.controller = Some(MotorController::new(console, self.state.address));
                true
            }
            Err(e) => {
                error!("Could not open {}: {}", self.state.port, e);
                self.state.log(&format!("Could not open {}: {}", self.state.port, e));
                false
            }
        }
    }

    /// Run one action, then mirror everything it sent and received to the log pane
    fn perform(&mut self, action: Action) -> Result<(), BridgeError> {
        let result = self.dispatch(action);
        if let Some(controller) = self.controller.as_mut() {
            for record in controller.take_journal() {
                self.state.log(&record.output);
            }
        }
        result
    }

    fn dispatch(&mut self, action: Action) -> Result<(), BridgeError> {
        if action == Action::EnterI2cMode {
            if !self.open_session() {
                return Ok(());
            }
            if let Some(controller) = self.controller.as_mut() {
                self.state.i2c_ready = controller.enter_i2c_mode()?;
            }
            return Ok(());
        }
        if action == Action::DumpTelemetry {
            match serde_json::to_string(&self.state.telemetry) {
                Ok(json) => {
                    info!("Telemetry: {}", json);
                    self.state.log(&json);
                }
                Err(e) => warn!("Failed to serialize telemetry: {}", e),
            }
            return Ok(());
        }

        let Some(controller) = self.controller.as_mut() else {
            self.state.log("Serial port not open, press 'i' first");
            return Ok(());
        };
        let state = &mut self.state;

        match action {
            Action::Apply => {
                let plan = state.apply_plan();
                if !controller.apply_plan(&plan)? {
                    warn!("Some motor writes were not acknowledged");
                }
            }
            Action::Acquire => controller.acquire(&mut state.telemetry)?,
            Action::Halt => {
                if controller.halt()? {
                    state.reset_settings();
                } else {
                    warn!("Halt was not acknowledged, keeping motor settings");
                    state.log("Halt was not acknowledged");
                }
            }
            Action::Calibrate => {
                controller.calibrate(&mut state.telemetry)?;
            }
            Action::DisableDrive => {
                controller.set_action(DriveAction::Disabled)?;
            }
            Action::Transmit(command) => {
                controller.raw(&command)?;
            }
            Action::EnterI2cMode | Action::DumpTelemetry | Action::Quit => {}
        }
        Ok(())
    }

    fn event_loop<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        loop {
            let (width, height) = terminal::size()?;
            render(out, &self.state, width, height)?;

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(action) = self.state.handle_key(key) else {
                continue;
            };
            if action == Action::Quit {
                info!("Quit requested");
                return Ok(());
            }
            if let Err(e) = self.perform(action) {
                error!("Adapter I/O failed: {}", e);
                self.state.log(&format!("Adapter I/O failed: {}", e));
            }
        }
    }
}

/// Run the panel until the user quits, restoring the terminal afterwards
pub fn run(port: &str, address: u8) -> io::Result<()> {
    let mut panel = Panel::new(port, address);
    let mut stdout = io::stdout();

    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide)?;
    let result = panel.event_loop(&mut stdout);
    execute!(stdout, Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;

    result
}
