// Terminal control panel for the Bus Pirate motor setup
//
// Provides:
// - Panel state model and key bindings
// - Screen layout
// - Event loop that drives the motor controller

mod app;
pub mod state;
pub mod view;

pub use app::{run, Opener, Panel};
pub use state::{Action, InputMode, PanelState, SelectionScope, SettingsRow};
