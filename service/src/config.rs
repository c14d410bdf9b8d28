use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::time::Duration;

/// Capability a publisher's bearer credential must carry unless overridden.
pub const DEFAULT_PUBLISH_SCOPE: &str = "topic-broker-publish";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "0.0.0.0")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 80)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// The scope a bearer token must carry to be allowed to publish.
    #[arg(long, env, default_value = DEFAULT_PUBLISH_SCOPE)]
    publish_scope: String,

    /// Check publisher tokens against the introspection endpoint before the scope check.
    #[arg(long, env, default_value_t = false)]
    pub introspection_enabled: bool,

    /// The OAuth token introspection endpoint used when introspection is enabled.
    #[arg(long, env)]
    introspection_url: Option<String>,

    /// The resource name presented (HTTP Basic user) to the introspection endpoint.
    #[arg(long, env)]
    resource_name: Option<String>,

    /// The resource secret presented (HTTP Basic password) to the introspection endpoint.
    #[arg(long, env)]
    resource_secret: Option<String>,

    /// Number of messages buffered for a subscriber before it is evicted as unresponsive.
    #[arg(
        long,
        env,
        default_value_t = 256,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub outbound_queue_capacity: usize,

    /// Maximum size in bytes of a frame read from a subscriber.
    #[arg(
        long,
        env,
        default_value_t = 512,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_message_size: usize,

    /// Seconds allowed for a subscriber to answer a ping before the connection is dropped.
    /// Pings are sent every 9/10 of this period.
    #[arg(long, env, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub pong_wait_secs: u64,

    /// Seconds allowed for a single write to a subscriber.
    #[arg(long, env, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub write_wait_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("0.0.0.0")
    }

    pub fn publish_scope(&self) -> &str {
        &self.publish_scope
    }

    pub fn introspection_url(&self) -> Option<String> {
        self.introspection_url.clone()
    }

    pub fn resource_name(&self) -> Option<String> {
        self.resource_name.clone()
    }

    pub fn resource_secret(&self) -> Option<String> {
        self.resource_secret.clone()
    }

    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_secs)
    }

    pub fn write_wait(&self) -> Duration {
        Duration::from_secs(self.write_wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["topic_broker"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_defaults_match_connection_conventions() {
        let config = parse(&[]);

        assert_eq!(config.outbound_queue_capacity, 256);
        assert_eq!(config.max_message_size, 512);
        assert_eq!(config.pong_wait(), Duration::from_secs(60));
        assert_eq!(config.write_wait(), Duration::from_secs(10));
        assert!(!config.introspection_enabled);
    }

    #[test]
    fn test_publish_scope_can_be_overridden() {
        let config = parse(&["--publish-scope", "orders-publish"]);
        assert_eq!(config.publish_scope(), "orders-publish");
    }

    #[test]
    fn test_introspection_credentials_are_optional() {
        let config = parse(&[
            "--introspection-enabled",
            "--introspection-url",
            "http://localhost:9000/introspect",
            "--resource-name",
            "broker",
        ]);

        assert!(config.introspection_enabled);
        assert_eq!(
            config.introspection_url().as_deref(),
            Some("http://localhost:9000/introspect")
        );
        assert_eq!(config.resource_name().as_deref(), Some("broker"));
        assert_eq!(config.resource_secret(), None);
    }

    #[test]
    fn test_zero_connection_limits_are_rejected() {
        for flag in [
            "--outbound-queue-capacity",
            "--max-message-size",
            "--pong-wait-secs",
            "--write-wait-secs",
        ] {
            let result = Config::try_parse_from(["topic_broker", flag, "0"]);
            assert!(result.is_err(), "{flag} 0 should be rejected");
        }
    }

    #[test]
    fn test_smallest_connection_limits_are_accepted() {
        let config = parse(&[
            "--outbound-queue-capacity",
            "1",
            "--pong-wait-secs",
            "1",
            "--write-wait-secs",
            "1",
        ]);

        assert_eq!(config.outbound_queue_capacity, 1);
        assert_eq!(config.pong_wait(), Duration::from_secs(1));
        assert_eq!(config.write_wait(), Duration::from_secs(1));
    }

    #[test]
    fn test_log_level_filter_parses_uppercase_names() {
        let config = parse(&["--log-level-filter", "DEBUG"]);
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
    }
}
