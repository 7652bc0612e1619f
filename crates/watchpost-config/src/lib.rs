//! Configuration for the watchpost client.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to the connection settings `watchpost_api::NvrClient`
//! is built from.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use watchpost_api::{TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' names a username but no password source")]
    NoPassword { profile: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by explicit name or fall back to the configured
    /// default profile.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named server profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "https://nvr.example.com").
    pub server: String,

    /// Username to log in as. Absent means anonymous access.
    pub username: Option<String>,

    /// Password (plaintext — prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "watchpost", "watchpost").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("watchpost");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WATCHPOST_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Login credentials for a profile that names a username.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Resolve credentials from the chain: env var named by `password_env`,
/// then the system keyring, then plaintext in the config file.
///
/// `Ok(None)` when the profile has no username — the client connects
/// anonymously and the user may log in interactively.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(username) = profile.username.clone() else {
        return Ok(None);
    };

    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok(Some(Credentials {
                username,
                password: SecretString::from(pw),
            }));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("watchpost", &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(Some(Credentials {
                username,
                password: SecretString::from(pw),
            }));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(Some(Credentials {
            username,
            password: SecretString::from(pw.clone()),
        }));
    }

    Err(ConfigError::NoPassword {
        profile: profile_name.into(),
    })
}

// ── Client settings ─────────────────────────────────────────────────

/// Everything needed to build and authenticate an `NvrClient`.
#[derive(Debug)]
pub struct ClientConfig {
    pub url: Url,
    pub credentials: Option<Credentials>,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }
}

/// Build a `ClientConfig` from a profile, applying global defaults.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let url: Url = profile.server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", profile.server),
    })?;

    let credentials = resolve_credentials(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ClientConfig {
        url,
        credentials,
        tls,
        timeout,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile(server: &str) -> Profile {
        Profile {
            server: server.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
default_profile = "home"

[defaults]
timeout = 10

[profiles.home]
server = "https://nvr.example.com"
username = "admin"
password = "hunter2"

[profiles.lab]
server = "http://10.0.0.5:8080"
insecure = true
"#
        )
        .unwrap();

        let cfg = load_config_from(file.path()).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("home"));
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.profiles.len(), 2);

        let (name, profile) = cfg.profile(None).unwrap();
        assert_eq!(name, "home");
        assert_eq!(profile.server, "https://nvr.example.com");

        let (name, _) = cfg.profile(Some("lab")).unwrap();
        assert_eq!(name, "lab");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_config_from(std::path::Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(!cfg.defaults.insecure);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        let err = cfg.profile(Some("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { profile } if profile == "nope"));
    }

    #[test]
    fn anonymous_profile_resolves_no_credentials() {
        let p = profile("https://nvr.example.com");
        assert!(resolve_credentials(&p, "default").unwrap().is_none());
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let mut p = profile("https://nvr.example.com");
        p.username = Some("admin".into());
        p.password = Some("hunter2".into());

        let creds = resolve_credentials(&p, "default").unwrap().unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password.expose_secret(), "hunter2");
    }

    #[test]
    fn username_without_password_source_is_an_error() {
        let mut p = profile("https://nvr.example.com");
        p.username = Some("admin".into());

        let err = resolve_credentials(&p, "home").unwrap_err();
        assert!(matches!(err, ConfigError::NoPassword { profile } if profile == "home"));
    }

    #[test]
    fn client_config_from_profile() {
        let mut p = profile("https://nvr.example.com");
        p.timeout = Some(5);

        let cc = profile_to_client_config(&p, "default", &Defaults::default()).unwrap();
        assert_eq!(cc.url.as_str(), "https://nvr.example.com/");
        assert!(cc.credentials.is_none());
        assert!(matches!(cc.tls, TlsMode::System));
        assert_eq!(cc.timeout, Duration::from_secs(5));
    }

    #[test]
    fn insecure_profile_overrides_tls() {
        let mut p = profile("https://10.0.0.5");
        p.insecure = Some(true);
        p.ca_cert = Some(PathBuf::from("/tmp/ca.pem"));

        let cc = profile_to_client_config(&p, "default", &Defaults::default()).unwrap();
        assert!(matches!(cc.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        let p = profile("not a url");
        let err = profile_to_client_config(&p, "default", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "server"));
    }
}
