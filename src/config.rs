use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use crate::seating::COLS;

/// Environment variable holding the cookie signing key.
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";
pub const DEFAULT_SECRET_KEY: &str = "dev-key";

#[derive(Parser, Debug)]
#[command(name = "seatline", about = "A small seat reservation server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub pricing: PricingConfig,
    pub admins: Vec<AdminSeed>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
    pub secret_key: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PricingConfig {
    /// Price of a seat in each column, applied to every row.
    pub column_prices: [u32; COLS],
}

/// An admin account created at startup if the username is not taken yet.
#[derive(Deserialize, Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "seatline_admin".to_string(),
            session_hours: 12,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            column_prices: [100, 75, 50, 100],
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }

        // Environment beats the file for the signing key
        if let Ok(secret) = std::env::var(SECRET_KEY_ENV) {
            if !secret.is_empty() {
                config.auth.secret_key = secret;
            }
        }

        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("seatline.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".seatline")
        })
    }

    /// Database file location. Falls back to the working directory when the
    /// config was built by hand rather than through [`Config::load`].
    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("seatline.db"))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.auth.secret_key == DEFAULT_SECRET_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_for(data_dir: &std::path::Path) -> Cli {
        Cli {
            config: None,
            host: None,
            port: None,
            data_dir: Some(data_dir.to_path_buf()),
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.cookie_name, "seatline_admin");
        assert_eq!(config.auth.session_hours, 12);
        assert_eq!(config.pricing.column_prices, [100, 75, 50, 100]);
        assert!(config.admins.is_empty());
        assert!(config.database.path.is_none());
        assert!(config.uses_default_secret());
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli_for(std::path::Path::new("/tmp/test-seatline"));
        assert_eq!(Config::data_dir(&cli), PathBuf::from("/tmp/test-seatline"));
    }

    #[test]
    fn data_dir_defaults_to_dot_seatline() {
        let cli = Cli {
            config: None,
            host: None,
            port: None,
            data_dir: None,
        };
        assert!(Config::data_dir(&cli).ends_with(".seatline"));
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli_for(tmp.path())).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.db_path(), tmp.path().join("seatline.db"));
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "127.0.0.1"
port = 9000

[auth]
cookie_name = "box_office"
session_hours = 2

[pricing]
column_prices = [120, 80, 80, 120]

[[admins]]
username = "boss"
password = "hunter2"
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            host: None,
            port: None,
            data_dir: Some(tmp.path().to_path_buf()),
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.cookie_name, "box_office");
        assert_eq!(config.auth.session_hours, 2);
        assert_eq!(config.pricing.column_prices, [120, 80, 80, 120]);
        assert_eq!(config.admins.len(), 1);
        assert_eq!(config.admins[0].username, "boss");
    }

    #[test]
    fn cli_overrides_beat_toml_values() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            host: Some("10.0.0.1".to_string()),
            port: Some(4000),
            data_dir: Some(tmp.path().to_path_buf()),
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 4000);
    }
}
