use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    // Populated from the .env file
    pub database_path: String,
    pub media_path: String,
    pub public_base_url: String,
    pub allowed_origins: String,
    pub log_level: String,
    pub admin_accept_ip: String,
    pub trusted_proxies: String,
}

fn required_var(name: &str) -> Result<String, config::ConfigError> {
    env::var(name).map_err(|_| {
        config::ConfigError::Message(format!(
            "FATAL: Environment variable '{}' is not set in your .env file.",
            name
        ))
    })
}

/// Checks that a directory setting is absolute so the server and the CLI
/// resolve the same location regardless of their working directory.
fn ensure_absolute(name: &str, value: &str) -> Result<(), config::ConfigError> {
    if Path::new(value).is_relative() {
        return Err(config::ConfigError::Message(format!(
            "FATAL: The '{}' in your .env file is a relative path ('{}'). It MUST be an absolute path.",
            name, value
        )));
    }
    Ok(())
}

/// Parses `PUBLIC_BASE_URL` and returns it without a trailing slash.
pub fn normalize_base_url(raw: &str) -> Result<String, config::ConfigError> {
    let parsed = Url::parse(raw.trim()).map_err(|e| {
        config::ConfigError::Message(format!(
            "FATAL: 'PUBLIC_BASE_URL' is not a valid URL ('{}'): {}",
            raw, e
        ))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(config::ConfigError::Message(
            "FATAL: 'PUBLIC_BASE_URL' must use http or https.".to_string(),
        ));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

impl Config {
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        dotenvy::from_path(env_path).map_err(|e| {
            config::ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}",
                env_path.display(),
                e
            ))
        })?;

        let database_path = required_var("DATABASE_PATH")?;
        let media_path = required_var("MEDIA_PATH")?;
        ensure_absolute("DATABASE_PATH", &database_path)?;
        ensure_absolute("MEDIA_PATH", &media_path)?;

        let public_base_url = normalize_base_url(&required_var("PUBLIC_BASE_URL")?)?;

        let allowed_origins = env::var("ALLOWED_ORIGINS").unwrap_or_default();
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        // Empty means every admin route is refused.
        let admin_accept_ip = env::var("ADMIN_ACCEPT_IP").unwrap_or_default();
        // Peers allowed to set X-Forwarded-For. Empty means the header is ignored.
        let trusted_proxies = env::var("TRUSTED_PROXIES").unwrap_or_default();

        let builder = config::Config::builder()
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml))
            .set_override("database_path", database_path)?
            .set_override("media_path", media_path)?
            .set_override("public_base_url", public_base_url)?
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .set_override("admin_accept_ip", admin_accept_ip)?
            .set_override("trusted_proxies", trusted_proxies)?
            .build()?;

        builder.try_deserialize()
    }

    /// Returns the full path to the society database file inside its own folder.
    pub fn society_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
            .join("society")
            .join("society.db")
    }

    pub fn media_root(&self) -> PathBuf {
        PathBuf::from(&self.media_path)
    }
}
