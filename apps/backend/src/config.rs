use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Server configuration (from environment, after `.env.defaults` / `.env`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup, so tests don't touch process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "8000")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let max_connections = var("DB_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .context("DB_MAX_CONNECTIONS must be a positive integer")?;

        // DATABASE_URL wins over the individual DB_* parts
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                var("DB_USER", "postgres"),
                var("DB_PASSWORD", "postgres"),
                var("DB_HOST", "localhost"),
                var("DB_PORT", "5432"),
                var("DB_NAME", "dish_management"),
            ),
        };

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            database_url,
            max_connections,
            cors_origins,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load `.env` then `.env.defaults` from `dir` into the process environment.
///
/// dotenvy never overwrites a variable that is already set, so the first file
/// loaded wins: real env beats `.env`, which beats `.env.defaults`.
/// Missing files are skipped.
pub fn load_env_files(dir: &Path) {
    for name in [".env", ".env.defaults"] {
        let path = dir.join(name);
        if let Err(e) = dotenvy::from_path(&path) {
            if !e.not_found() {
                log::warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }
}

/// Sample data configuration (from apps/backend/config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub dishes: Vec<SeedDish>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDish {
    pub name: String,
    pub image_url: String,
    #[serde(default)]
    pub is_published: bool,
}

impl SeedConfig {
    pub fn load() -> Result<Self> {
        // Try local config first (when running from apps/backend)
        let config_path = if std::path::Path::new("config.toml").exists() {
            "config.toml"
        } else if std::path::Path::new("apps/backend/config.toml").exists() {
            // When running from project root
            "apps/backend/config.toml"
        } else {
            anyhow::bail!("Could not find config.toml")
        };

        let contents = std::fs::read_to_string(config_path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: SeedConfig = toml::from_str(contents)?;
        Ok(config)
    }
}
