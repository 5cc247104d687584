use crate::error::{MediaError, Result};
use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// Public API host
pub const DEFAULT_HOST: &str = "api.brightcove.com";

const READ_PATH: &str = "/services/library";
const WRITE_PATH: &str = "/services/post";

/// Create the HTTP client for read requests
/// with settings for connection pooling and timeouts
pub fn create_read_client() -> Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(300)) // 5 minutes
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| MediaError::read_failed("could not create HTTP client", Some(Box::new(e))))
}

/// Create the HTTP client for write requests, which may carry large uploads
pub fn create_upload_client() -> Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(3600)) // 1 hour
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| MediaError::write_failed("could not create upload HTTP client", Some(Box::new(e))))
}

/// Configuration for the media API client
#[derive(Debug, Clone)]
pub struct Config {
    /// Use https instead of http
    pub secure: bool,
    /// API host
    pub host: String,
    /// Log catalog errors and notices through the `log` facade
    pub show_notices: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            secure: false,
            host: DEFAULT_HOST.to_string(),
            show_notices: false,
        }
    }
}

impl Config {
    /// Create a new configuration with the given transport security and host
    pub fn new(secure: bool, host: impl Into<String>) -> Self {
        Config {
            secure,
            host: host.into(),
            show_notices: false,
        }
    }

    /// Set https
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set notice display
    pub fn with_notices(mut self, show: bool) -> Self {
        self.show_notices = show;
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// Base URL for GET calls
    pub fn read_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}://{}{}", self.scheme(), self.host, READ_PATH))?)
    }

    /// Endpoint for POST calls
    pub fn write_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}://{}{}", self.scheme(), self.host, WRITE_PATH))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.secure);
        assert_eq!(
            config.read_url().unwrap().as_str(),
            "http://api.brightcove.com/services/library"
        );
    }

    #[test]
    fn test_secure_config() {
        let config = Config::new(true, "localhost:8080").with_notices(true);
        assert_eq!(config.write_url().unwrap().as_str(), "https://localhost:8080/services/post");
        assert!(config.show_notices);
    }

    #[test]
    fn test_bad_host() {
        let config = Config::new(false, "bad host");
        assert!(matches!(config.read_url(), Err(MediaError::UrlParse(_))));
    }
}
