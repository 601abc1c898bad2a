use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

const DEFAULT_TABLE: &str = "scraped_jobs";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jobs_table: String,
    pub scraper_url: Option<String>,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let server_address = match env::var("SERVER_ADDRESS") {
            Ok(addr) => addr,
            Err(_) => {
                let port: u16 = get_env_parse_or("PORT", 5000)?;
                format!("0.0.0.0:{}", port)
            }
        };

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "postgres://{}:{}@{}:{}/{}",
                get_env_or("DB_USER", "postgres"),
                get_env_or("DB_PASSWORD", "1234"),
                get_env_or("DB_HOST", "localhost"),
                get_env_or("DB_PORT", "5432"),
                get_env_or("DB_NAME", "scraper"),
            ),
        };

        let jobs_table = get_env_or("JOBS_TABLE", DEFAULT_TABLE);
        validate_identifier(&jobs_table)?;

        Ok(Self {
            server_address,
            database_url,
            jobs_table,
            scraper_url: env::var("SCRAPER_URL").ok().filter(|v| !v.trim().is_empty()),
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 5)?,
        })
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

/// Table names are spliced into SQL, so only plain identifiers are accepted.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && name.len() <= 63 {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid table name: {:?}", name)))
    }
}
