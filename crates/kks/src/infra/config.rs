//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = include_str!("../../assets/default-config.toml");

/// Layered configuration loaded from defaults, the user config file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub kak: KakConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session used when neither the environment nor flags name one.
    #[serde(default = "SessionConfig::default_name")]
    pub default: String,
    /// Derive the session name from the enclosing git repository.
    #[serde(default)]
    pub use_gitdir: bool,
}

impl SessionConfig {
    fn default_name() -> String {
        "kks".into()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default: Self::default_name(),
            use_gitdir: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KakConfig {
    #[serde(default = "KakConfig::default_binary")]
    pub binary: String,
    #[serde(default = "KakConfig::default_start_timeout_ms")]
    pub start_timeout_ms: u64,
}

impl KakConfig {
    fn default_binary() -> String {
        "kak".into()
    }

    fn default_start_timeout_ms() -> u64 {
        10_000
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }
}

impl Default for KakConfig {
    fn default() -> Self {
        Self {
            binary: Self::default_binary(),
            start_timeout_ms: Self::default_start_timeout_ms(),
        }
    }
}

/// Environment overrides, matching the variables kks has always honored.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    default_session: Option<String>,
    use_gitdir: Option<bool>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            default_session: lookup("KKS_DEFAULT_SESSION").filter(|value| !value.is_empty()),
            use_gitdir: lookup("KKS_USE_GITDIR_SESSIONS")
                .filter(|value| !value.is_empty())
                .map(|value| parse_flag(&value)),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

impl Config {
    /// Load configuration from defaults, the user config file, and env overrides.
    pub fn load() -> Result<Self> {
        Self::load_with_layers(global_config_path(), EnvOverrides::from_env())
    }

    fn load_with_layers(global: Option<PathBuf>, env_overrides: EnvOverrides) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading user config");
            layers.push(Self::from_file(&global_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            session: merge_session(self.session, other.session),
            kak: merge_kak(self.kak, other.kak),
        }
    }
}

fn merge_session(base: SessionConfig, overlay: SessionConfig) -> SessionConfig {
    SessionConfig {
        default: if overlay.default != SessionConfig::default_name() {
            overlay.default
        } else {
            base.default
        },
        use_gitdir: overlay.use_gitdir || base.use_gitdir,
    }
}

fn merge_kak(base: KakConfig, overlay: KakConfig) -> KakConfig {
    KakConfig {
        binary: if overlay.binary != KakConfig::default_binary() {
            overlay.binary
        } else {
            base.binary
        },
        start_timeout_ms: if overlay.start_timeout_ms != KakConfig::default_start_timeout_ms() {
            overlay.start_timeout_ms
        } else {
            base.start_timeout_ms
        },
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("kks/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(default_session) = env.default_session {
        config.session.default = default_session;
    }
    if let Some(use_gitdir) = env.use_gitdir {
        config.session.use_gitdir = use_gitdir;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config =
            Config::load_with_layers(None, EnvOverrides::default()).expect("load default config");
        assert_eq!(config, Config::default());
        assert_eq!(config.session.default, "kks");
        assert!(!config.session.use_gitdir);
        assert_eq!(config.kak.start_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn user_config_overrides_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[session]
default = "main"
use_gitdir = true

[kak]
binary = "/opt/kak/bin/kak"
"#,
        )?;

        let config = Config::load_with_layers(Some(global), EnvOverrides::default())?;

        assert_eq!(config.session.default, "main");
        assert!(config.session.use_gitdir);
        assert_eq!(config.kak.binary, "/opt/kak/bin/kak");
        assert_eq!(config.kak.start_timeout_ms, 10_000);
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::from_lookup(|key| match key {
            "KKS_DEFAULT_SESSION" => Some("scratch".into()),
            "KKS_USE_GITDIR_SESSIONS" => Some("1".into()),
            _ => None,
        });
        let config = Config::load_with_layers(None, overrides)?;
        assert_eq!(config.session.default, "scratch");
        assert!(config.session.use_gitdir);
        Ok(())
    }

    #[test]
    fn gitdir_flag_can_be_switched_off_from_env() {
        let overrides = EnvOverrides::from_lookup(|key| {
            (key == "KKS_USE_GITDIR_SESSIONS").then(|| "false".to_owned())
        });
        let mut config = Config::default();
        config.session.use_gitdir = true;
        let config = apply_env_overrides(config, overrides);
        assert!(!config.session.use_gitdir);
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }
}
