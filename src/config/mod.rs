use serde::{Deserialize, Serialize};
use std::env;

/// Fixed page size of the item collection.
pub const PAGE_SIZE: u32 = 20;

const DEFAULT_SECRET_KEY: &str = "insecure-dev-key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub debug: bool,
    pub secret_key: String,
    pub allowed_hosts: Vec<String>,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub docs: DocsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub access_token_lifetime_minutes: i64,
    pub refresh_token_lifetime_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub page_size: u32,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    pub title: String,
    pub description: String,
    pub version: String,
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(&lookup)
    }

    /// True when tokens would be signed with the built-in development key.
    pub fn uses_insecure_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("APP_SECRET_KEY") {
            if !v.is_empty() {
                self.secret_key = v;
            }
        }
        if let Some(v) = lookup("APP_DEBUG") {
            self.debug = parse_bool(&v).unwrap_or(self.debug);
        }
        if let Some(v) = lookup("APP_ALLOWED_HOSTS") {
            self.allowed_hosts = split_list(&v);
        }

        // Server overrides
        if let Some(v) = lookup("APP_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("APP_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            if !v.is_empty() {
                self.database.url = v;
            }
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // JWT overrides
        if let Some(v) = lookup("JWT_ACCESS_TOKEN_LIFETIME_MINUTES") {
            self.jwt.access_token_lifetime_minutes =
                v.parse().unwrap_or(self.jwt.access_token_lifetime_minutes);
        }
        if let Some(v) = lookup("JWT_REFRESH_TOKEN_LIFETIME_DAYS") {
            self.jwt.refresh_token_lifetime_days =
                v.parse().unwrap_or(self.jwt.refresh_token_lifetime_days);
        }

        // API overrides
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse_bool(&v).unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Host patterns actually enforced. In debug mode an empty list admits
    /// the loopback names.
    pub fn effective_allowed_hosts(&self) -> Vec<String> {
        if self.allowed_hosts.is_empty() && self.debug {
            return vec![
                ".localhost".to_string(),
                "127.0.0.1".to_string(),
                "[::1]".to_string(),
            ];
        }
        self.allowed_hosts.clone()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            allowed_hosts: vec!["127.0.0.1".to_string(), "localhost".to_string()],
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "sqlite://db.sqlite3".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            jwt: JwtConfig {
                access_token_lifetime_minutes: 30,
                refresh_token_lifetime_days: 7,
            },
            api: ApiConfig {
                page_size: PAGE_SIZE,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: vec![],
            },
            docs: DocsConfig {
                title: "Item API".to_string(),
                description: "Item catalogue API with JWT authentication".to_string(),
                version: "1.0.0".to_string(),
            },
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_with(&[]);
        assert!(!config.debug);
        assert_eq!(config.secret_key, "insecure-dev-key");
        assert_eq!(config.allowed_hosts, vec!["127.0.0.1", "localhost"]);
        assert_eq!(config.database.url, "sqlite://db.sqlite3");
        assert_eq!(config.jwt.access_token_lifetime_minutes, 30);
        assert_eq!(config.jwt.refresh_token_lifetime_days, 7);
        assert_eq!(config.api.page_size, 20);
        assert!(config.uses_insecure_secret());
    }

    #[test]
    fn test_environment_overrides() {
        let config = config_with(&[
            ("APP_SECRET_KEY", "s3cret"),
            ("APP_DEBUG", "True"),
            ("APP_ALLOWED_HOSTS", "api.example.com, .example.org"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "9000"),
        ]);
        assert!(config.debug);
        assert_eq!(config.secret_key, "s3cret");
        assert_eq!(config.allowed_hosts, vec!["api.example.com", ".example.org"]);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.default_log_filter(), "debug");
    }

    #[test]
    fn test_unparseable_values_keep_defaults() {
        let config = config_with(&[
            ("APP_DEBUG", "maybe"),
            ("APP_PORT", "not-a-port"),
            ("JWT_ACCESS_TOKEN_LIFETIME_MINUTES", "soon"),
        ]);
        assert!(!config.debug);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.jwt.access_token_lifetime_minutes, 30);
    }

    #[test]
    fn test_debug_falls_back_to_loopback_hosts() {
        let config = config_with(&[("APP_DEBUG", "1"), ("APP_ALLOWED_HOSTS", "")]);
        assert!(config.allowed_hosts.is_empty());
        assert!(config.effective_allowed_hosts().contains(&"127.0.0.1".to_string()));

        let config = config_with(&[("APP_ALLOWED_HOSTS", "")]);
        assert!(config.effective_allowed_hosts().is_empty());
    }
}
