//! Loader for the client configuration: optional YAML file, then `GHOSTPILOT__`
//! environment overrides, then `${VAR}` expansion of every string value.
//!
//! Every field has a default matching the stock local server, so an empty
//! source set yields a usable configuration.
use config::{Config, ConfigError, Environment, File};
use ghostpilot_common::observability::LogFormat;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "GHOSTPILOT";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GhostpilotConfig {
    pub target: TargetConfig,
    pub payload: PayloadConfig,
    pub logging: LoggingConfig,
}

/// Where the tweets API lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub base_url: String,
    pub create_path: String,
    pub emojis_path: String,
    pub health_path: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://0.0.0.0:8080".into(),
            create_path: "/tweets/create".into(),
            emojis_path: "/tweets/emojis".into(),
            health_path: "/_healthcheck".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    /// Body attached to the emojis GET.
    pub get_body: String,
    /// JSON tweet record to post instead of the built-in sample.
    pub tweet_file: Option<PathBuf>,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            get_body: "Test".into(),
            tweet_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    #[serde(deserialize_with = "lenient_bool")]
    pub stderr: bool,
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            stderr: false,
            filter: "info".into(),
            dir: None,
        }
    }
}

/// Environment overrides arrive as strings; accept `"true"`/`"1"` as well as YAML booleans.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => Ok(b),
        Raw::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, got {other:?}"
            ))),
        },
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (files + env overrides).
pub struct GhostpilotConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GhostpilotConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GhostpilotConfigLoader {
    /// Start with no file sources; `GHOSTPILOT__` env overrides are applied in [`load`](Self::load).
    ///
    /// ```
    /// use ghostpilot_config::GhostpilotConfigLoader;
    ///
    /// let config = GhostpilotConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(config.target.base_url, "http://0.0.0.0:8080");
    /// assert_eq!(config.payload.get_body, "Test");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use ghostpilot_config::GhostpilotConfigLoader;
    ///
    /// let cfg = GhostpilotConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// target:
    ///   base_url: "http://localhost:9090"
    /// payload:
    ///   get_body: "ping"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.target.base_url, "http://localhost:9090");
    /// assert_eq!(cfg.target.create_path, "/tweets/create");
    /// assert_eq!(cfg.payload.get_body, "ping");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// Environment variables are added last so they win over files, e.g.
    /// `GHOSTPILOT__TARGET__BASE_URL=http://api:8080`. `${VAR}` placeholders in
    /// any string are then expanded, recursively up to a fixed depth.
    pub fn load(self) -> Result<GhostpilotConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
