pub mod args;
pub mod bridge;
pub mod config;
pub mod messages;
pub mod motor;
pub mod panel;
pub mod usbi2c;
