use std::env;
use std::time::Duration;

/// Environment-driven configuration. `DATABASE_URL` is the only required
/// variable; everything else has a development default.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    /// Absent or empty selects the in-process rate limit backend.
    pub redis_url: Option<String>,
    pub environment: String,
    pub disable_rate_limit: bool,
    pub rate_limit_window_secs: u64,
    /// Quota for mutating endpoints per window.
    pub rate_limit_max: u32,
    /// Quota for read endpoints per window.
    pub rate_limit_read_max: u32,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            disable_rate_limit: env::var("DISABLE_RATE_LIMIT")
                .map(|raw| raw == "true")
                .unwrap_or(false),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(60),
            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(10),
            rate_limit_read_max: env::var("RATE_LIMIT_READ_MAX")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(50),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(10),
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// Rate limiting is only bypassed when explicitly disabled in a
    /// development environment.
    pub fn rate_limit_bypassed(&self) -> bool {
        self.environment == "development" && self.disable_rate_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            database_url: "postgres://localhost/items".into(),
            redis_url: None,
            environment: "development".into(),
            disable_rate_limit: false,
            rate_limit_window_secs: 60,
            rate_limit_max: 10,
            rate_limit_read_max: 50,
            db_max_connections: 10,
        }
    }

    #[test]
    fn test_bypass_requires_development_and_flag() {
        let mut config = base_config();
        assert!(!config.rate_limit_bypassed());

        config.disable_rate_limit = true;
        assert!(config.rate_limit_bypassed());

        config.environment = "production".into();
        assert!(!config.rate_limit_bypassed());
    }

    #[test]
    fn test_window_duration() {
        let config = base_config();
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
    }
}
