//! Endpoint settings and their environment defaults.

use std::time::Duration;

use crate::endpoint::Credential;

/// mDNS name every web workflow device answers to
pub const DEFAULT_HOST: &str = "circuitpython.local";

/// Environment variable holding the web workflow password
pub const PASSWORD_ENV_VAR: &str = "CIRCUP_WEBWORKFLOW_PASSWORD";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings needed to build a [`DeviceEndpoint`](crate::DeviceEndpoint).
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub host: String,
    pub password: Option<Credential>,
    pub timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            password: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        if let Some(password) = password {
            self.password = Some(Credential::new(password));
        }
        self
    }

    /// Fill a missing password using `lookup(PASSWORD_ENV_VAR)`.
    ///
    /// An explicitly supplied password always wins.
    pub fn with_password_from<F>(mut self, lookup: F) -> Self
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if self.password.is_none() {
            self.password = lookup(PASSWORD_ENV_VAR).map(Credential::new);
        }
        self
    }

    /// Fill a missing password from the process environment.
    pub fn with_env_password(self) -> Self {
        self.with_password_from(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EndpointConfig::default();
        assert_eq!(config.host, "circuitpython.local");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.password.is_none());
    }

    #[test]
    fn env_fills_missing_password() {
        let config = EndpointConfig::new("cpy.local").with_password_from(|key| {
            assert_eq!(key, PASSWORD_ENV_VAR);
            Some("from-env".to_string())
        });
        assert_eq!(config.password.unwrap().expose(), "from-env");
    }

    #[test]
    fn explicit_password_wins_over_env() {
        let config = EndpointConfig::new("cpy.local")
            .with_password(Some("explicit".to_string()))
            .with_password_from(|_| Some("from-env".to_string()));
        assert_eq!(config.password.unwrap().expose(), "explicit");
    }

    #[test]
    fn debug_output_hides_password() {
        let config = EndpointConfig::new("cpy.local").with_password(Some("hunter2".to_string()));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
    }
}
