use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub mysql_host: String,
    pub mysql_user: String,
    pub mysql_password: String,
    pub mysql_database: String,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Seeding
    pub seed_data_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            // Database
            mysql_host: env::var("MYSQL_HOST").unwrap_or_else(|_| "localhost".to_string()),
            mysql_user: env::var("MYSQL_USER").map_err(|_| ConfigError::Missing("MYSQL_USER"))?,
            mysql_password: env::var("MYSQL_PASSWORD")
                .map_err(|_| ConfigError::Missing("MYSQL_PASSWORD"))?,
            mysql_database: env::var("MYSQL_DATABASE")
                .map_err(|_| ConfigError::Missing("MYSQL_DATABASE"))?,

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "6543".to_string())
                .parse()
                .unwrap_or(6543),

            // Seeding
            seed_data_dir: env::var("SEED_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
        })
    }

    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "mysql://{}:{}@{}/{}",
            self.mysql_user, self.mysql_password, self.mysql_host, self.mysql_database
        )
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
