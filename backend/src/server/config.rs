//! Server configuration parsing and validation.
//!
//! This module centralises the environment-driven settings so they are
//! validated consistently and can be tested in isolation. Debug builds
//! tolerate missing toggles with warnings; release builds fail closed.

use mockable::Env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;
use zeroize::Zeroizing;

const APP_ENV: &str = "APP_ENV";
const SECRET_FILE_ENV: &str = "ACCESS_TOKEN_FILE";
const SECRET_ENV: &str = "ACCESS_TOKEN";
const BIND_ADDR_ENV: &str = "BIND_ADDR";
const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

const DEFAULT_SECRET_PATH: &str = "/var/run/secrets/access_token";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEV_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";
const SECRET_MIN_LEN: usize = 32;
const APP_ENV_EXPECTED: &str = "development|production";

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid settings.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Deployment environment driving cookie and CORS posture.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuntimeMode {
    /// Local development: lax cookie policy, localhost origins.
    Development,
    /// Production: secure cross-site cookies, explicit origins only.
    Production,
}

/// Settings derived from configuration toggles.
#[derive(Debug)]
pub struct ServerConfig {
    /// Deployment environment.
    pub runtime_mode: RuntimeMode,
    /// Token signing secret; wiped from memory on drop.
    pub secret: Zeroizing<Vec<u8>>,
    /// Socket address the listener binds.
    pub bind_addr: SocketAddr,
    /// Origins granted credentialed cross-origin access.
    pub allowed_origins: Vec<String>,
}

/// Errors raised while validating server configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the token secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret exists but is too short for release builds.
    #[error("token secret too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
}

/// Build server settings from environment variables and build mode.
///
/// # Errors
/// Returns [`ConfigError`] when a release build is missing or misconfiguring
/// a required variable. Debug builds substitute defaults with warnings.
pub fn server_config_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<ServerConfig, ConfigError> {
    let runtime_mode = runtime_mode_from_env(env, mode)?;
    let secret = secret_from_env(env, mode)?;
    let bind_addr = bind_addr_from_env(env, mode)?;
    let allowed_origins = allowed_origins_from_env(env, mode, runtime_mode)?;

    Ok(ServerConfig {
        runtime_mode,
        secret,
        bind_addr,
        allowed_origins,
    })
}

fn runtime_mode_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<RuntimeMode, ConfigError> {
    let value = match env.string(APP_ENV) {
        Some(value) => value,
        None => {
            if mode.is_debug() {
                warn!("APP_ENV not set; defaulting to development");
                return Ok(RuntimeMode::Development);
            }
            return Err(ConfigError::MissingEnv { name: APP_ENV });
        }
    };

    match value.to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(RuntimeMode::Development),
        "production" | "prod" => Ok(RuntimeMode::Production),
        _ => {
            if mode.is_debug() {
                warn!(value = %value, "invalid APP_ENV; defaulting to development");
                Ok(RuntimeMode::Development)
            } else {
                Err(ConfigError::InvalidEnv {
                    name: APP_ENV,
                    value,
                    expected: APP_ENV_EXPECTED,
                })
            }
        }
    }
}

fn secret_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Zeroizing<Vec<u8>>, ConfigError> {
    if let Some(path) = env.string(SECRET_FILE_ENV) {
        // An explicitly configured file must be readable.
        let path = PathBuf::from(path);
        let bytes = std::fs::read(&path)
            .map_err(|source| ConfigError::SecretRead { path, source })?;
        return check_secret_length(Zeroizing::new(bytes), mode);
    }

    // The conventional mount point is consulted before the env fallback.
    if let Ok(bytes) = std::fs::read(DEFAULT_SECRET_PATH) {
        return check_secret_length(Zeroizing::new(bytes), mode);
    }

    if let Some(value) = env.string(SECRET_ENV) {
        return check_secret_length(Zeroizing::new(value.into_bytes()), mode);
    }

    if mode.is_debug() {
        warn!("no token secret configured; generating an ephemeral one (dev only)");
        return Ok(Zeroizing::new(ephemeral_secret()));
    }
    Err(ConfigError::MissingEnv { name: SECRET_ENV })
}

fn check_secret_length(
    secret: Zeroizing<Vec<u8>>,
    mode: BuildMode,
) -> Result<Zeroizing<Vec<u8>>, ConfigError> {
    if secret.len() >= SECRET_MIN_LEN {
        return Ok(secret);
    }
    if mode.is_debug() {
        warn!(length = secret.len(), "token secret shorter than recommended");
        Ok(secret)
    } else {
        Err(ConfigError::SecretTooShort {
            length: secret.len(),
            min_len: SECRET_MIN_LEN,
        })
    }
}

fn ephemeral_secret() -> Vec<u8> {
    use rand::RngCore;

    let mut bytes = vec![0u8; SECRET_MIN_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

fn bind_addr_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<SocketAddr, ConfigError> {
    let value = env
        .string(BIND_ADDR_ENV)
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
    match value.parse() {
        Ok(addr) => Ok(addr),
        Err(_) => {
            if mode.is_debug() {
                warn!(value = %value, "invalid BIND_ADDR; using default");
                Ok(SocketAddr::from(([0, 0, 0, 0], 5000)))
            } else {
                Err(ConfigError::InvalidEnv {
                    name: BIND_ADDR_ENV,
                    value,
                    expected: "host:port",
                })
            }
        }
    }
}

fn allowed_origins_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    runtime_mode: RuntimeMode,
) -> Result<Vec<String>, ConfigError> {
    let value = match env.string(ALLOWED_ORIGINS_ENV) {
        Some(value) => value,
        None => {
            if runtime_mode == RuntimeMode::Development {
                return Ok(split_origins(DEV_ORIGINS));
            }
            if mode.is_debug() {
                warn!("ALLOWED_ORIGINS not set; defaulting to localhost origins");
                return Ok(split_origins(DEV_ORIGINS));
            }
            return Err(ConfigError::MissingEnv {
                name: ALLOWED_ORIGINS_ENV,
            });
        }
    };

    let origins = split_origins(&value);
    if origins.is_empty() {
        return Err(ConfigError::InvalidEnv {
            name: ALLOWED_ORIGINS_ENV,
            value,
            expected: "comma-separated origin list",
        });
    }
    Ok(origins)
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;

    fn env_with(vars: Vec<(&'static str, String)>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string().returning(move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.clone())
        });
        env
    }

    #[test]
    fn debug_builds_default_everything() {
        let env = env_with(vec![]);
        let config = server_config_from_env(&env, BuildMode::Debug).expect("defaults apply");
        assert_eq!(config.runtime_mode, RuntimeMode::Development);
        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse().expect("addr"));
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:5173", "http://localhost:5174"]
        );
        assert!(config.secret.len() >= SECRET_MIN_LEN);
    }

    #[test]
    fn release_builds_require_explicit_settings() {
        let env = env_with(vec![]);
        let err = server_config_from_env(&env, BuildMode::Release).expect_err("fails closed");
        assert!(matches!(err, ConfigError::MissingEnv { name: APP_ENV }));
    }

    #[test]
    fn release_builds_accept_a_complete_environment() {
        let env = env_with(vec![
            (APP_ENV, "production".into()),
            (SECRET_ENV, "s".repeat(SECRET_MIN_LEN)),
            (BIND_ADDR_ENV, "127.0.0.1:8443".into()),
            (ALLOWED_ORIGINS_ENV, "https://app.example.com".into()),
        ]);
        let config = server_config_from_env(&env, BuildMode::Release).expect("valid settings");
        assert_eq!(config.runtime_mode, RuntimeMode::Production);
        assert_eq!(config.bind_addr, "127.0.0.1:8443".parse().expect("addr"));
        assert_eq!(config.allowed_origins, vec!["https://app.example.com"]);
    }

    #[test]
    fn release_builds_reject_short_secrets() {
        let env = env_with(vec![
            (APP_ENV, "production".into()),
            (SECRET_ENV, "short".into()),
            (ALLOWED_ORIGINS_ENV, "https://app.example.com".into()),
        ]);
        let err = server_config_from_env(&env, BuildMode::Release).expect_err("short secret");
        assert!(matches!(err, ConfigError::SecretTooShort { length: 5, .. }));
    }

    #[test]
    fn secret_file_takes_precedence() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("token_secret");
        std::fs::write(&path, vec![b'k'; SECRET_MIN_LEN]).expect("write secret");

        let env = env_with(vec![
            (APP_ENV, "production".into()),
            (
                SECRET_FILE_ENV,
                path.to_str().expect("utf-8 path").to_owned(),
            ),
            (SECRET_ENV, "ignored-in-favour-of-the-file!!".into()),
            (ALLOWED_ORIGINS_ENV, "https://app.example.com".into()),
        ]);
        let config = server_config_from_env(&env, BuildMode::Release).expect("file secret");
        assert_eq!(config.secret.as_slice(), &[b'k'; SECRET_MIN_LEN][..]);
    }

    #[rstest]
    #[case("development", RuntimeMode::Development)]
    #[case("dev", RuntimeMode::Development)]
    #[case("PRODUCTION", RuntimeMode::Production)]
    fn runtime_mode_parsing(#[case] raw: &str, #[case] expected: RuntimeMode) {
        let env = env_with(vec![
            (APP_ENV, raw.into()),
            (SECRET_ENV, "s".repeat(SECRET_MIN_LEN)),
            (ALLOWED_ORIGINS_ENV, "https://app.example.com".into()),
        ]);
        let config = server_config_from_env(&env, BuildMode::Release).expect("valid mode");
        assert_eq!(config.runtime_mode, expected);
    }

    #[test]
    fn origin_lists_are_trimmed() {
        assert_eq!(
            split_origins(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
    }
}
