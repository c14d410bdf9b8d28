use crate::config::Config;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Log targets that are silenced unless the broker runs at TRACE.
/// Each upgraded socket and every HTTP request makes these chatty at DEBUG.
const FILTERED_MODULES: &[&str] = &[
    "tower",
    "hyper",
    "axum",
    "tungstenite",
    "tokio_tungstenite",
    "reqwest",
    "mio",
];

pub struct Logger {}

impl Logger {
    /// Installs the process-wide terminal logger at the configured level.
    pub fn init_logger(config: &Config) {
        let level = config.log_level_filter;
        let log_config = Self::build_log_config(Self::should_filter_dependencies(level));

        if let Err(e) = TermLogger::init(level, log_config, TerminalMode::Mixed, ColorChoice::Auto)
        {
            eprintln!("Failed to start simplelog: {e}");
        }
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level < LevelFilter::Trace
    }

    fn build_log_config(filter_dependencies: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if filter_dependencies {
            FILTERED_MODULES.iter().for_each(|module| {
                builder.add_filter_ignore_str(module);
            });
        }

        builder.build()
    }
}
