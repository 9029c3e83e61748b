//! Port traits for the collaborators the core talks to.

pub mod config_port;
pub mod export_port;
pub mod market_data_port;
pub mod notes_port;
pub mod run_log_port;
