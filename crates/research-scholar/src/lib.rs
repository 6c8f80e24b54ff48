pub mod config;
pub mod error;
pub mod registry;
pub mod roster;
pub mod supervision;
pub mod telemetry;
