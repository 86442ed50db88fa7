// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, DatabaseConfig};

/// Environment variable prefix, e.g. `EDGE_SERVER__PORT=9000`
const ENV_PREFIX: &str = "EDGE";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is allowed; defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "edge-gate")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("assets.dir", "dist")?
            .set_default("assets.cache_max_age", 3600)?
            .set_default("database.max_connections", 5)?
            .set_default("api.expose_error_details", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    use types::{
        ApiConfig, AssetsConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    };

    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            access_log: false,
            access_log_format: "combined".to_string(),
        },
        performance: PerformanceConfig {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        },
        http: HttpConfig {
            server_name: "edge-gate-test".to_string(),
            max_body_size: 1024,
        },
        assets: AssetsConfig {
            dir: "dist".to_string(),
            cache_max_age: 3600,
        },
        database: DatabaseConfig::default(),
        api: ApiConfig {
            expose_error_details: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-missing-edge-gate-config").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.assets.dir, "dist");
        assert!(cfg.database.url.is_none());
        assert!(cfg.api.expose_error_details);
        assert_eq!(cfg.http.max_body_size, 1_048_576);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = test_config();
        cfg.server.port = 9000;
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 9000);

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
