use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use crate::error::{AppError, Result};

pub const DEFAULT_CHAT_URL: &str = "https://api.cohere.com/v2/chat";
pub const DEFAULT_MODEL: &str = "command-r-plus";
pub const DEFAULT_GDELT_URL: &str = "https://api.gdeltproject.org/api/v2/doc/doc";
pub const DEFAULT_SUMMARY_LANGUAGE: &str = "English";
pub const DEFAULT_FONT_DIR: &str = "/usr/share/fonts/truetype/liberation";
pub const DEFAULT_FONT_NAME: &str = "LiberationSans";

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub cohere_api_key: String,
    pub chat_url: String,
    pub model: String,
    pub gdelt_url: String,
    pub summary_language: String,
    pub font_dir: PathBuf,
    pub font_name: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let cohere_api_key = env::var("COHERE_API_KEY")?;
        if cohere_api_key.trim().is_empty() {
            return Err(AppError::Config("COHERE_API_KEY is empty".to_string()));
        }

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            cohere_api_key,
            chat_url: var_or("COHERE_CHAT_URL", DEFAULT_CHAT_URL),
            model: var_or("COHERE_MODEL", DEFAULT_MODEL),
            gdelt_url: var_or("GDELT_DOC_URL", DEFAULT_GDELT_URL),
            summary_language: var_or("SUMMARY_LANGUAGE", DEFAULT_SUMMARY_LANGUAGE),
            font_dir: PathBuf::from(var_or("REPORT_FONT_DIR", DEFAULT_FONT_DIR)),
            font_name: var_or("REPORT_FONT_NAME", DEFAULT_FONT_NAME),
        })
    }

    /// Defaults for everything except the credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Config {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cohere_api_key: api_key.into(),
            chat_url: DEFAULT_CHAT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            gdelt_url: DEFAULT_GDELT_URL.to_string(),
            summary_language: DEFAULT_SUMMARY_LANGUAGE.to_string(),
            font_dir: PathBuf::from(DEFAULT_FONT_DIR),
            font_name: DEFAULT_FONT_NAME.to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("cohere_api_key", &"<redacted>")
            .field("chat_url", &self.chat_url)
            .field("model", &self.model)
            .field("gdelt_url", &self.gdelt_url)
            .field("summary_language", &self.summary_language)
            .field("font_dir", &self.font_dir)
            .field("font_name", &self.font_name)
            .finish()
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_key() {
        let config = Config::with_api_key("secret-key");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn defaults_point_at_public_services() {
        let config = Config::with_api_key("k");
        assert_eq!(config.model, "command-r-plus");
        assert_eq!(config.gdelt_url, DEFAULT_GDELT_URL);
        assert_eq!(config.summary_language, "English");
        assert_eq!(config.server_addr.port(), 3000);
    }
}
