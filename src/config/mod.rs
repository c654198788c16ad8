use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub query: QueryConfig,
    pub database: DatabaseConfig,
    pub storage_broker: StorageBrokerConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub query_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageBrokerConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
}

const DEFAULT_STORAGE_BROKER_URL: &str = "http://storage-broker-processor:8000/archive/url";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Query overrides
        if let Ok(v) = env::var("QUERY_DEFAULT_PAGE_SIZE") {
            self.query.default_page_size = v.parse().unwrap_or(self.query.default_page_size);
        }
        if let Ok(v) = env::var("QUERY_MAX_PAGE_SIZE") {
            self.query.max_page_size = v.parse().unwrap_or(self.query.max_page_size);
        }
        if let Ok(v) = env::var("QUERY_DEBUG_LOGGING") {
            self.query.debug_logging = v.parse().unwrap_or(self.query.debug_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_QUERY_TIMEOUT_SECS") {
            self.database.query_timeout_secs = v.parse().unwrap_or(self.database.query_timeout_secs);
        }

        // Storage broker overrides
        if let Ok(v) = env::var("STORAGE_BROKER_URL") {
            self.storage_broker.url = v;
        }
        if let Ok(v) = env::var("STORAGE_BROKER_TIMEOUT_SECS") {
            self.storage_broker.timeout_secs = v.parse().unwrap_or(self.storage_broker.timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("PAYLOAD_TRACKER_API_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            query: QueryConfig {
                default_page_size: 10,
                max_page_size: 1000,
                debug_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                query_timeout_secs: 30,
            },
            storage_broker: StorageBrokerConfig {
                url: DEFAULT_STORAGE_BROKER_URL.to_string(),
                timeout_secs: 30,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            query: QueryConfig {
                default_page_size: 10,
                max_page_size: 500,
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                query_timeout_secs: 15,
            },
            storage_broker: StorageBrokerConfig {
                url: DEFAULT_STORAGE_BROKER_URL.to_string(),
                timeout_secs: 15,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            query: QueryConfig {
                default_page_size: 10,
                max_page_size: 100,
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                query_timeout_secs: 10,
            },
            storage_broker: StorageBrokerConfig {
                url: DEFAULT_STORAGE_BROKER_URL.to_string(),
                timeout_secs: 10,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                enable_cors: false,
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
