use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WORKER_THREADS: usize = 4;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: DEFAULT_HOST.into(), port: DEFAULT_PORT, worker_threads: Some(DEFAULT_WORKER_THREADS) }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Load the demo cars into the repository at startup.
    #[serde(default = "default_seed")]
    pub seed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self { Self { seed: default_seed() } }
}

fn default_seed() -> bool { true }

/// Config file location: `CONFIG_PATH`, else `config.toml`.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file at `config_path()` when present, otherwise defaults
    /// overlaid with `SERVER_HOST` / `SERVER_PORT`.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_at(&config_path())
    }

    /// Only a missing file falls back to the environment; an unreadable or
    /// malformed file is an error.
    pub fn load_or_env_at(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => {
                let mut cfg = AppConfig::default();
                cfg.server.apply_env();
                cfg
            }
            Err(e) => return Err(e.context(format!("config file {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl ServerConfig {
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = DEFAULT_HOST.to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(DEFAULT_WORKER_THREADS),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cars-config-{}-{name}.toml", std::process::id()))
    }

    #[test]
    fn defaults_listen_on_8080_and_seed() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.logging.format, LogFormat::Compact);
        assert!(cfg.store.seed);
    }

    #[test]
    fn parse_full_file() {
        let cfg = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9090
            worker_threads = 2

            [logging]
            format = "json"

            [store]
            seed = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.bind_addr(), "127.0.0.1:9090");
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert!(!cfg.store.seed);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg = parse("[server]\nhost = \"localhost\"\nport = 3000\n").unwrap();
        assert_eq!(cfg.logging.format, LogFormat::Compact);
        assert!(cfg.store.seed);
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(parse("[logging]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn normalize_fills_blank_host_and_worker_threads() {
        let mut cfg = parse("[server]\nhost = \"  \"\nport = 8080\nworker_threads = 0\n").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, DEFAULT_HOST);
        assert_eq!(cfg.server.worker_threads, Some(4));
    }

    #[test]
    fn normalize_rejects_port_zero() {
        let mut cfg = parse("[server]\nhost = \"127.0.0.1\"\nport = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_env() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);
        std::env::set_var("SERVER_PORT", "9191");
        let cfg = AppConfig::load_or_env_at(path.to_str().unwrap());
        std::env::remove_var("SERVER_PORT");
        let cfg = cfg.unwrap();
        assert_eq!(cfg.server.port, 9191);
        assert!(cfg.store.seed);
    }

    #[test]
    fn malformed_file_is_an_error_not_a_fallback() {
        let path = temp_path("malformed");
        std::fs::write(&path, "[server]\nhost = \"127.0.0.1\"\nport = 9999\n[logging]\nformat = \"xml\"\n[store]\nseed = false\n").unwrap();
        let res = AppConfig::load_or_env_at(path.to_str().unwrap());
        std::fs::remove_file(&path).unwrap();
        let err = res.unwrap_err();
        assert!(err.to_string().contains("config file"), "{err:#}");
    }

    #[test]
    fn valid_file_is_loaded_and_normalized() {
        let path = temp_path("valid");
        std::fs::write(&path, "[server]\nhost = \"127.0.0.1\"\nport = 9999\n[store]\nseed = false\n").unwrap();
        let res = AppConfig::load_or_env_at(path.to_str().unwrap());
        std::fs::remove_file(&path).unwrap();
        let cfg = res.unwrap();
        assert_eq!(cfg.server.bind_addr(), "127.0.0.1:9999");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert!(!cfg.store.seed);
    }
}
