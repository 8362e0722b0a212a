//! Command implementations for the CLI.

mod config;
mod history;
mod import;
mod record;
mod sensors;
mod species;
mod start;
mod status;

pub use config::cmd_config;
pub use history::cmd_history;
pub use import::cmd_import;
pub use record::{cmd_fertility, cmd_hatch};
pub use sensors::{SensorsArgs, cmd_sensors};
pub use species::cmd_species;
pub use start::{cmd_push, cmd_start};
pub use status::cmd_status;
