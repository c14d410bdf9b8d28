//! Process-wide infrastructure shared by the broker crates: command line / environment
//! configuration and console logging.

pub mod config;
pub mod logging;
