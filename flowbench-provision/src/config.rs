//! Configuration for the flowbench provisioner.
//!
//! Configuration can be loaded from multiple sources with the following precedence (highest to
//! lowest):
//!
//! 1. The service variables `LANGFLOW_URL`, `LANGFLOW_SUPERUSER` and
//!    `LANGFLOW_SUPERUSER_PASSWORD`
//! 2. Environment variables prefixed with `FLOWBENCH__`
//! 3. YAML configuration file (specified via `-c` or `--config` flag)
//! 4. Defaults
//!
//! # Environment Variables
//!
//! `FLOWBENCH__` variables use double underscores (`__`) to denote nested configuration
//! structures. For example:
//!
//! - `FLOWBENCH__TIMEOUT=10s` sets the per-request timeout
//! - `FLOWBENCH__LOGGING__LEVEL=debug` sets the log level
//!
//! # YAML Configuration File
//!
//! ```yaml
//! url: http://langflow:7860
//! timeout: 10s
//!
//! logging:
//!   level: debug
//!   format: json
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use figment::providers::{Env, Format, Serialized, Yaml};
use secrecy::{CloneableSecret, ExposeSecret, SecretBox, SerializableSecret, zeroize::Zeroize};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::auth::Superuser;
use crate::error::ProvisionError;

/// Environment variable prefix for all configuration options.
const ENV_PREFIX: &str = "FLOWBENCH__";

/// Configuration keys that are never read through the typed `FLOWBENCH__` layer.
const VERBATIM_KEYS: &[&str] = &["url", "username", "password"];

/// Variables taken verbatim as strings, mapped to their configuration keys.
///
/// Later entries take precedence, so the service variables shared with the deployment override
/// their `FLOWBENCH__` counterparts.
const VERBATIM_ENV: &[(&str, &str)] = &[
    ("FLOWBENCH__URL", "url"),
    ("FLOWBENCH__USERNAME", "username"),
    ("FLOWBENCH__PASSWORD", "password"),
    ("LANGFLOW_URL", "url"),
    ("LANGFLOW_SUPERUSER", "username"),
    ("LANGFLOW_SUPERUSER_PASSWORD", "password"),
];

/// A secret configuration value, such as the superuser password.
///
/// Wrapped in [`secrecy::SecretBox`] so that it never shows up in `Debug` output or logs.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigSecret(String);

impl ConfigSecret {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ConfigSecret {
    fn from(str: &str) -> Self {
        ConfigSecret(str.to_string())
    }
}

impl fmt::Debug for ConfigSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "[redacted]")
    }
}

impl CloneableSecret for ConfigSecret {}
impl SerializableSecret for ConfigSecret {}
impl Zeroize for ConfigSecret {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Log output format.
///
/// Controls how log messages are formatted. Logs always go to stderr, so that standard output
/// only carries the marker lines.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect the best format.
    ///
    /// This chooses [`LogFormat::Pretty`] for TTY, otherwise [`LogFormat::Simplified`].
    Auto,

    /// Pretty printing with colors.
    Pretty,

    /// Simplified plain text output.
    ///
    /// ```text
    /// 2025-01-04T12:10:32Z  INFO flowbench_provision::fixture: created benchmark flow
    /// ```
    Simplified,

    /// Dump out JSON lines.
    Json,
}

mod display_fromstr {
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: std::fmt::Display,
    {
        serializer.collect_str(&value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: std::str::FromStr,
        <T as std::str::FromStr>::Err: std::fmt::Display,
    {
        use serde::Deserialize;
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Logging configuration.
///
/// Used in: [`Config::logging`]
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Logging {
    /// Minimum log level to output.
    ///
    /// The `RUST_LOG` environment variable overrides this if set.
    ///
    /// # Default
    ///
    /// `INFO`
    ///
    /// # Environment Variable
    ///
    /// `FLOWBENCH__LOGGING__LEVEL`
    #[serde(with = "display_fromstr")]
    pub level: LevelFilter,

    /// Log output format.
    ///
    /// # Default
    ///
    /// `Auto` (pretty for TTY, simplified otherwise)
    ///
    /// # Environment Variable
    ///
    /// `FLOWBENCH__LOGGING__FORMAT`
    pub format: LogFormat,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Auto,
        }
    }
}

/// [Sentry](https://sentry.io/) error reporting.
///
/// Used in: [`Config::sentry`]
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Sentry {
    /// Sentry DSN. Reporting is disabled when unset.
    ///
    /// # Environment Variable
    ///
    /// `FLOWBENCH__SENTRY__DSN`
    pub dsn: Option<SecretBox<ConfigSecret>>,

    /// Environment tag attached to reported events, such as `ci`.
    ///
    /// # Environment Variable
    ///
    /// `FLOWBENCH__SENTRY__ENVIRONMENT`
    pub environment: Option<String>,
}

impl Sentry {
    /// Returns whether Sentry reporting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.dsn
            .as_ref()
            .is_some_and(|dsn| !dsn.expose_secret().as_str().is_empty())
    }
}

/// Main configuration struct for the provisioner.
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Root URL of the Langflow instance.
    ///
    /// # Default
    ///
    /// `http://localhost:7860`
    ///
    /// # Environment Variable
    ///
    /// `LANGFLOW_URL`
    pub url: String,

    /// Path prefix of the versioned API.
    ///
    /// # Default
    ///
    /// `/api/v1`
    pub api_prefix: String,

    /// Name of the superuser to log in as. Required.
    ///
    /// # Environment Variable
    ///
    /// `LANGFLOW_SUPERUSER`
    pub username: Option<String>,

    /// Password of the superuser. Required.
    ///
    /// # Environment Variable
    ///
    /// `LANGFLOW_SUPERUSER_PASSWORD`
    pub password: Option<SecretBox<ConfigSecret>>,

    /// Timeout of every single request. A request exceeding it fails the run.
    ///
    /// # Default
    ///
    /// `30s`
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Name of the API key that is reused or created.
    ///
    /// # Default
    ///
    /// `benchmark_key`
    pub credential_name: String,

    /// Prefix of the benchmark flow name. A timestamp and a random suffix are appended.
    ///
    /// # Default
    ///
    /// `Benchmark Flow`
    pub flow_name_prefix: String,

    /// Logging configuration.
    pub logging: Logging,

    /// Error reporting configuration.
    pub sentry: Sentry,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "http://localhost:7860".to_owned(),
            api_prefix: flowbench_client::DEFAULT_API_PREFIX.to_owned(),
            username: None,
            password: None,
            timeout: flowbench_client::DEFAULT_TIMEOUT,
            credential_name: "benchmark_key".to_owned(),
            flow_name_prefix: "Benchmark Flow".to_owned(),
            logging: Logging::default(),
            sentry: Sentry::default(),
        }
    }
}

impl Config {
    /// Loads the configuration, optionally layering the YAML file at `path` over the defaults.
    ///
    /// Variables prefixed with `FLOWBENCH__` override the file, and the `LANGFLOW_*` service
    /// variables override everything else. Missing superuser credentials are not an error at
    /// this point, see [`superuser`](Self::superuser).
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or if a variable holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = figment::Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .ignore(VERBATIM_KEYS),
        );

        // Taken as plain strings, never parsed as numbers, booleans or lists.
        for &(name, key) in VERBATIM_ENV {
            if let Ok(value) = std::env::var(name) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }

        let config = figment.extract()?;

        Ok(config)
    }

    /// Returns the superuser credentials.
    ///
    /// Fails with [`ProvisionError::MissingCredentials`] if the name or the password is unset or
    /// empty.
    pub fn superuser(&self) -> Result<Superuser<'_>, ProvisionError> {
        let username = self.username.as_deref().filter(|u| !u.is_empty());
        let password = self
            .password
            .as_ref()
            .map(|p| p.expose_secret().as_str())
            .filter(|p| !p.is_empty());

        match (username, password) {
            (Some(username), Some(password)) => Ok(Superuser { username, password }),
            _ => Err(ProvisionError::MissingCredentials),
        }
    }

    /// Builds a client for the configured service.
    pub fn client(&self) -> Result<flowbench_client::Client, ProvisionError> {
        flowbench_client::Client::builder(self.url.as_str())
            .api_prefix(self.api_prefix.as_str())
            .timeout(self.timeout)
            .build()
            .map_err(ProvisionError::InvalidConfig)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_target_local_service() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load(None).unwrap();

            assert_eq!(config.url, "http://localhost:7860");
            assert_eq!(config.api_prefix, "/api/v1");
            assert_eq!(config.timeout, Duration::from_secs(30));
            assert_eq!(config.credential_name, "benchmark_key");
            assert!(config.username.is_none());
            assert!(!config.sentry.is_enabled());

            Ok(())
        });
    }

    #[test]
    fn reads_service_variables() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LANGFLOW_URL", "http://langflow:7860");
            jail.set_env("LANGFLOW_SUPERUSER", "admin");
            jail.set_env("LANGFLOW_SUPERUSER_PASSWORD", "secret");

            let config = Config::load(None).unwrap();
            assert_eq!(config.url, "http://langflow:7860");

            let superuser = config.superuser().unwrap();
            assert_eq!(superuser.username, "admin");
            assert_eq!(superuser.password, "secret");

            Ok(())
        });
    }

    #[test]
    fn configurable_via_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FLOWBENCH__TIMEOUT", "5s");
            jail.set_env("FLOWBENCH__API_PREFIX", "/langflow/api/v1");
            jail.set_env("FLOWBENCH__LOGGING__LEVEL", "debug");
            jail.set_env("FLOWBENCH__LOGGING__FORMAT", "json");
            jail.set_env("FLOWBENCH__SENTRY__DSN", "https://key@sentry.invalid/1");

            let config = Config::load(None).unwrap();
            assert_eq!(config.timeout, Duration::from_secs(5));
            assert_eq!(config.api_prefix, "/langflow/api/v1");
            assert_eq!(config.logging.level, LevelFilter::DEBUG);
            assert_eq!(config.logging.format, LogFormat::Json);
            assert!(config.sentry.is_enabled());

            Ok(())
        });
    }

    #[test]
    fn service_variables_override_yaml() {
        let mut tempfile = tempfile::NamedTempFile::new().unwrap();
        tempfile
            .write_all(
                br#"
                url: http://from-yaml:7860
                username: yaml-user
                flow_name_prefix: Nightly
                timeout: 1m
                "#,
            )
            .unwrap();

        figment::Jail::expect_with(|jail| {
            jail.set_env("LANGFLOW_URL", "http://from-env:7860");

            let config = Config::load(Some(tempfile.path())).unwrap();
            assert_eq!(config.url, "http://from-env:7860");
            assert_eq!(config.username.as_deref(), Some("yaml-user"));
            assert_eq!(config.flow_name_prefix, "Nightly");
            assert_eq!(config.timeout, Duration::from_secs(60));

            Ok(())
        });
    }

    #[test]
    fn credentials_are_read_verbatim() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LANGFLOW_SUPERUSER", "1000");

            for password in ["123456", "007", "true", "[s3cr3t]", "{a: b}", "1.5"] {
                jail.set_env("LANGFLOW_SUPERUSER_PASSWORD", password);

                let config = Config::load(None).unwrap();
                let superuser = config.superuser().unwrap();
                assert_eq!(superuser.username, "1000");
                assert_eq!(superuser.password, password);
            }

            Ok(())
        });
    }

    #[test]
    fn prefixed_credentials_yield_to_service_variables() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FLOWBENCH__USERNAME", "42");
            jail.set_env("FLOWBENCH__PASSWORD", "[1, 2]");

            let config = Config::load(None).unwrap();
            let superuser = config.superuser().unwrap();
            assert_eq!(superuser.username, "42");
            assert_eq!(superuser.password, "[1, 2]");

            jail.set_env("LANGFLOW_SUPERUSER_PASSWORD", "0");
            let config = Config::load(None).unwrap();
            assert_eq!(config.superuser().unwrap().password, "0");

            Ok(())
        });
    }

    #[test]
    fn missing_or_empty_credentials() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LANGFLOW_SUPERUSER", "admin");
            let config = Config::load(None).unwrap();
            assert!(matches!(
                config.superuser(),
                Err(ProvisionError::MissingCredentials)
            ));

            jail.set_env("LANGFLOW_SUPERUSER_PASSWORD", "");
            let config = Config::load(None).unwrap();
            assert!(matches!(
                config.superuser(),
                Err(ProvisionError::MissingCredentials)
            ));

            Ok(())
        });
    }

    #[test]
    fn password_is_redacted() {
        let config = Config {
            username: Some("admin".into()),
            password: Some(SecretBox::new(Box::new(ConfigSecret::from("hunter2")))),
            ..Default::default()
        };

        let debug = format!("{config:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }
}
