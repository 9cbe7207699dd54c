use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
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
pub struct SecurityConfig {
    /// HMAC key for session tokens. Never serialized back out.
    #[serde(skip_serializing)]
    pub token_secret: String,
    /// Lifetime of both the token `exp` claim and the session cookie.
    pub token_ttl_hours: u64,
    /// Cookie `Domain` attribute; omitted when `None`.
    pub api_domain: Option<String>,
    /// Front-end origins allowed by CORS.
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
    pub password: PasswordPolicy,
}

/// Argon2id cost parameters applied to every new password hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET") {
            self.security.token_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_TTL_HOURS") {
            self.security.token_ttl_hours = parse_var("SECURITY_TOKEN_TTL_HOURS", &v)?;
        }
        if let Ok(v) = env::var("API_DOMAIN") {
            let v = v.trim().to_string();
            self.security.api_domain = if v.is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("FE_URL") {
            self.security.cors_origins = split_origins(&v);
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = parse_var("SECURITY_COOKIE_SECURE", &v)?;
        }
        if let Ok(v) = env::var("PASSWORD_MEMORY_KIB") {
            self.security.password.memory_kib = parse_var("PASSWORD_MEMORY_KIB", &v)?;
        }
        if let Ok(v) = env::var("PASSWORD_ITERATIONS") {
            self.security.password.iterations = parse_var("PASSWORD_ITERATIONS", &v)?;
        }
        if let Ok(v) = env::var("PASSWORD_PARALLELISM") {
            self.security.password.parallelism = parse_var("PASSWORD_PARALLELISM", &v)?;
        }

        Ok(self)
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.security.token_secret.is_empty() {
            return Err(ConfigError::Missing("SECRET"));
        }
        if self.security.token_ttl_hours == 0 {
            return Err(ConfigError::Invalid {
                name: "SECURITY_TOKEN_TTL_HOURS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_ttl_hours: 12,
                api_domain: None,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                cookie_secure: false,
                password: PasswordPolicy::default(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_ttl_hours: 12,
                api_domain: None,
                cors_origins: vec![],
                cookie_secure: true,
                password: PasswordPolicy::default(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_ttl_hours: 12,
                api_domain: None,
                cors_origins: vec![],
                cookie_secure: true,
                password: PasswordPolicy::default(),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.token_ttl_hours, 12);
        assert!(!config.security.cookie_secure);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.cookie_secure);
        assert!(config.security.cors_origins.is_empty());
        assert_eq!(config.database.max_connections, 50);
    }

    #[test]
    fn validate_requires_secret_and_database_url() {
        let mut config = AppConfig::development();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("DATABASE_URL"))));

        config.database.url = "postgres://localhost/tasks".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("SECRET"))));

        config.security.token_secret = "s3cret".to_string();
        assert!(config.validate().is_ok());

        config.security.token_ttl_hours = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn splits_front_end_origins() {
        let origins = split_origins("https://app.example.com/, http://localhost:5173 ,,");
        assert_eq!(origins, vec!["https://app.example.com", "http://localhost:5173"]);
    }

    #[test]
    fn parse_var_reports_name() {
        let err = parse_var::<u16>("PORT", "eighty").unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT: eighty");
    }

    #[test]
    fn secret_is_not_serialized() {
        let mut config = AppConfig::development();
        config.security.token_secret = "hunter2".to_string();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
