use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub manifest: ManifestConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address for the HTTP server to listen on
    pub http_addr: SocketAddr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    Sqlite { path: PathBuf },
}

impl StoreConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::Sqlite { .. } => "sqlite",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ManifestConfig {
    /// CSV file listing every device of the fleet
    pub path: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                http_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 6733)),
            },
            store: StoreConfig::Sqlite {
                path: PathBuf::from("fleet_monitoring.db"),
            },
            manifest: ManifestConfig {
                path: PathBuf::from("devices.csv"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, StoreConfig};

    #[test]
    fn test_parse_sqlite_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            http_addr = "0.0.0.0:8080"

            [store]
            type = "sqlite"
            path = "/var/lib/fleet/fleet.db"

            [manifest]
            path = "/etc/fleet/devices.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.http_addr.port(), 8080);
        assert!(
            matches!(&config.store, StoreConfig::Sqlite { path } if path.ends_with("fleet.db"))
        );
        assert!(config.manifest.path.ends_with("devices.csv"));
    }

    #[test]
    fn test_parse_memory_store() {
        let config: Config = toml::from_str(
            r#"
            [server]
            http_addr = "127.0.0.1:6733"

            [store]
            type = "memory"

            [manifest]
            path = "devices.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.kind(), "memory");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.server.http_addr.to_string(), "127.0.0.1:6733");
        assert_eq!(config.store.kind(), "sqlite");
    }
}
