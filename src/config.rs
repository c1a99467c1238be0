//! Settings read once when the server starts.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

use crate::{notification::DEFAULT_CAPACITY, security::DEFAULT_ALLOWED_ORIGIN};

/// The REST API server for fraud_catch.
///
/// Every option can also be set with the environment variable named in its help text.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    pub db_path: String,

    /// The address to serve the API from.
    #[arg(long, env = "FRAUD_CATCH_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "FRAUD_CATCH_PORT", default_value_t = 5000)]
    pub port: u16,

    /// The only browser origin allowed to make cross-origin requests.
    #[arg(long, env = "FRAUD_CATCH_ALLOWED_ORIGIN", default_value = DEFAULT_ALLOWED_ORIGIN)]
    pub allowed_origin: String,

    /// The number of requests each client may make per minute, zero disables the limit.
    #[arg(long, env = "FRAUD_CATCH_RATE_LIMIT", default_value_t = 100)]
    pub rate_limit: u32,

    /// How many events a slow websocket subscriber may fall behind before missing events.
    #[arg(long, env = "FRAUD_CATCH_BROADCAST_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub broadcast_capacity: usize,

    /// File path for the debug log.
    #[arg(long, env = "FRAUD_CATCH_LOG_PATH", default_value = "debug.log")]
    pub log_path: String,
}

impl Config {
    /// The socket address the server should listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use clap::{CommandFactory, Parser};

    use super::Config;

    #[test]
    fn command_is_well_formed() {
        Config::command().debug_assert();
    }

    #[test]
    fn uses_defaults() {
        let config = Config::try_parse_from(["server", "--db-path", "test.db"]).unwrap();

        assert_eq!(config.db_path, "test.db");
        assert_eq!(
            config.socket_addr(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000)
        );
        assert_eq!(config.allowed_origin, "http://localhost:8080");
        assert_eq!(config.rate_limit, 100);
        assert_eq!(config.broadcast_capacity, 100);
    }

    #[test]
    fn reads_arguments() {
        let config = Config::try_parse_from([
            "server",
            "--db-path",
            "fraud.db",
            "--host",
            "0.0.0.0",
            "--port",
            "8000",
            "--allowed-origin",
            "https://example.com",
            "--rate-limit",
            "0",
        ])
        .unwrap();

        assert_eq!(
            config.socket_addr(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8000)
        );
        assert_eq!(config.allowed_origin, "https://example.com");
        assert_eq!(config.rate_limit, 0);
    }
}
