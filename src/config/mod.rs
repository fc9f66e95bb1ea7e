use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub security: SecurityConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    pub minimum_length: usize,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_number: bool,
    pub require_symbol: bool,
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
        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Password policy overrides
        if let Ok(v) = env::var("PASSWORD_MINIMUM_LENGTH") {
            self.password.minimum_length = v.parse().unwrap_or(self.password.minimum_length);
        }
        if let Ok(v) = env::var("PASSWORD_REQUIRE_LOWERCASE") {
            self.password.require_lowercase = v.parse().unwrap_or(self.password.require_lowercase);
        }
        if let Ok(v) = env::var("PASSWORD_REQUIRE_UPPERCASE") {
            self.password.require_uppercase = v.parse().unwrap_or(self.password.require_uppercase);
        }
        if let Ok(v) = env::var("PASSWORD_REQUIRE_NUMBER") {
            self.password.require_number = v.parse().unwrap_or(self.password.require_number);
        }
        if let Ok(v) = env::var("PASSWORD_REQUIRE_SYMBOL") {
            self.password.require_symbol = v.parse().unwrap_or(self.password.require_symbol);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            security: SecurityConfig {
                jwt_secret: "beacon-dev-secret".to_string(),
                jwt_expiry_hours: 24,
            },
            password: PasswordConfig {
                minimum_length: 5,
                require_lowercase: false,
                require_uppercase: false,
                require_number: false,
                require_symbol: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 12,
            },
            password: PasswordConfig {
                minimum_length: 8,
                require_lowercase: true,
                require_uppercase: true,
                require_number: true,
                require_symbol: false,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 8,
            },
            password: PasswordConfig {
                minimum_length: 10,
                require_lowercase: true,
                require_uppercase: true,
                require_number: true,
                require_symbol: true,
            },
        }
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Global configuration singleton, loaded once from the environment
pub fn config() -> &'static AppConfig {
    &CONFIG
}
