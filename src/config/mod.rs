use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Largest accepted request body; bigger bodies answer 413.
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. The in-memory store is used when unset.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// HS256 signing secret. Authenticated routes answer 500 while unset.
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    /// Admin account `serve` ensures on startup.
    #[serde(skip)]
    pub admin_seed: Option<AdminSeed>,
}

/// From `ADMIN_USER_NAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`; all three or none.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    pub api_url: String,
    pub thumbnail_size: u32,
    pub user_agent: String,
}

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
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("MAX_BODY_BYTES") {
            self.server.max_body_bytes = v.parse().unwrap_or(self.server.max_body_bytes);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        let admin = ["ADMIN_USER_NAME", "ADMIN_EMAIL", "ADMIN_PASSWORD"]
            .map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()));
        if let [Some(user_name), Some(email), Some(password)] = admin {
            self.security.admin_seed = Some(AdminSeed {
                user_name,
                email,
                password,
            });
        }

        // Enrichment overrides
        if let Ok(v) = env::var("IMAGE_API_URL") {
            self.enrichment.api_url = v;
        }
        if let Ok(v) = env::var("IMAGE_THUMBNAIL_SIZE") {
            self.enrichment.thumbnail_size = v.parse().unwrap_or(self.enrichment.thumbnail_size);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                cors_origins: vec![],
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: None,
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 4,
                admin_seed: None,
            },
            enrichment: EnrichmentConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                cors_origins: vec!["https://staging.example.com".to_string()],
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: None,
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                admin_seed: None,
            },
            enrichment: EnrichmentConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                cors_origins: vec!["https://app.example.com".to_string()],
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: None,
                jwt_expiry_hours: 4,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                admin_seed: None,
            },
            enrichment: EnrichmentConfig::default(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            thumbnail_size: 640,
            user_agent: concat!("zoo-api/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.is_production());
        assert!(config.database.url.is_none());
        assert!(config.security.jwt_secret.is_none());
        assert_eq!(config.enrichment.thumbnail_size, 640);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.is_production());
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert_eq!(config.security.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn test_secret_is_never_serialized() {
        let mut config = AppConfig::development();
        config.security.jwt_secret = Some("hunter2".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
