//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Env var naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";
/// Env var holding the blog store address.
pub const BLOG_DB_ENV: &str = "BLOG_DB";
/// Env var overriding the listener bind address.
pub const BIND_ADDR_ENV: &str = "GATEWAY_BIND_ADDR";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let config = read_config_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the process configuration.
///
/// Reads the file named by `GATEWAY_CONFIG` when set (defaults otherwise),
/// applies `BLOG_DB` and `GATEWAY_BIND_ADDR` on top, then validates.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => read_config_file(Path::new(&path))?,
        _ => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Read and deserialize a TOML file without validating it.
fn read_config_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Ok(blog_db) = std::env::var(BLOG_DB_ENV) {
        config.upstream.blog_db = blog_db;
    }
    if let Ok(bind) = std::env::var(BIND_ADDR_ENV) {
        config.listener.bind_address = bind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    /// Serializes tests that touch process env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[CONFIG_PATH_ENV, BLOG_DB_ENV, BIND_ADDR_ENV];

    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap();

        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
        for (k, v) in vars {
            std::env::set_var(k, v);
        }

        f();

        for (k, v) in &saved {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }
    }

    fn temp_config(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "blog-gateway-{}-{}.toml",
            name,
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_config_file() {
        let path = temp_config(
            "file",
            r#"
            [listener]
            bind_address = "127.0.0.1:4000"

            [upstream]
            blog_db = "db:8000"
            request_timeout_secs = 3
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.upstream.blog_db, "db:8000");
        assert_eq!(config.upstream.request_timeout_secs, 3);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let path = temp_config(
            "invalid",
            r#"
            [upstream]
            request_timeout_secs = 0
            "#,
        );
        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors[0].field, "upstream.request_timeout_secs")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_env_defaults() {
        with_env_vars(&[], || {
            let config = load_from_env().unwrap();
            assert_eq!(config.upstream.blog_db, "localhost:8000");
            assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        });
    }

    #[test]
    fn test_env_overrides_file() {
        let path = temp_config(
            "env",
            r#"
            [upstream]
            blog_db = "from-file:8000"
            "#,
        );
        let path_str = path.to_string_lossy().to_string();
        with_env_vars(
            &[
                (CONFIG_PATH_ENV, &path_str),
                (BLOG_DB_ENV, "from-env:9000"),
                (BIND_ADDR_ENV, "127.0.0.1:5555"),
            ],
            || {
                let config = load_from_env().unwrap();
                assert_eq!(config.upstream.blog_db, "from-env:9000");
                assert_eq!(config.listener.bind_address, "127.0.0.1:5555");
            },
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_env_config_file_errors_surface() {
        let path = temp_config("garbage", "[upstream\nblog_db = ");
        let path_str = path.to_string_lossy().to_string();
        with_env_vars(&[(CONFIG_PATH_ENV, &path_str)], || {
            assert!(matches!(load_from_env(), Err(ConfigError::Parse(_))));
        });
        with_env_vars(&[(CONFIG_PATH_ENV, "/definitely/not/here.toml")], || {
            assert!(matches!(load_from_env(), Err(ConfigError::Io(_))));
        });
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_env_empty_blog_db_fails_validation() {
        with_env_vars(&[(BLOG_DB_ENV, "")], || {
            let err = load_from_env().unwrap_err();
            assert!(err.to_string().contains("upstream.blog_db"));
        });
    }
}
