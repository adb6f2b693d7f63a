use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Placeholder secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ACCESS_TOKEN_SECRET is unset or still a placeholder")]
    MissingSecret,

    #[error("invalid {name} '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// Only this origin may call the API from a browser. `None` allows any.
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("ACCESS_TOKEN_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 8000,
        };

        Ok(Self {
            db_path: lookup("JOTTER_DB_PATH")
                .unwrap_or_else(|| "jotter.db".into())
                .into(),
            jwt_secret,
            host: lookup("JOTTER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            cors_origin: lookup("JOTTER_CORS_ORIGIN").filter(|origin| !origin.is_empty()),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| ConfigError::Invalid {
            name: "JOTTER_HOST",
            value: self.host.clone(),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("ACCESS_TOKEN_SECRET", "s3cr3t-value")]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.db_path, PathBuf::from("jotter.db"));
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.cors_origin.is_none());
        assert_eq!(config.bind_addr().unwrap().port(), 8000);
    }

    #[test]
    fn secret_is_required() {
        assert!(matches!(config(&[]), Err(ConfigError::MissingSecret)));
        assert!(matches!(
            config(&[("ACCESS_TOKEN_SECRET", "dev-secret-change-me")]),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("ACCESS_TOKEN_SECRET", "s3cr3t-value"),
            ("PORT", "9100"),
            ("JOTTER_HOST", "127.0.0.1"),
            ("JOTTER_DB_PATH", ":memory:"),
            ("JOTTER_CORS_ORIGIN", "https://notes.example.com"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9100");
        assert_eq!(config.db_path, PathBuf::from(":memory:"));
        assert_eq!(config.cors_origin.as_deref(), Some("https://notes.example.com"));
    }

    #[test]
    fn ipv6_host_binds() {
        let any = config(&[("ACCESS_TOKEN_SECRET", "s3cr3t-value"), ("JOTTER_HOST", "::")]).unwrap();
        let addr = any.bind_addr().unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.to_string(), "[::]:8000");

        let named =
            config(&[("ACCESS_TOKEN_SECRET", "s3cr3t-value"), ("JOTTER_HOST", "localhost")]).unwrap();
        assert!(matches!(
            named.bind_addr(),
            Err(ConfigError::Invalid { name: "JOTTER_HOST", .. })
        ));
    }

    #[test]
    fn bad_port_is_reported() {
        let result = config(&[("ACCESS_TOKEN_SECRET", "s3cr3t-value"), ("PORT", "eighty")]);
        assert!(matches!(result, Err(ConfigError::Invalid { name: "PORT", .. })));
    }
}
