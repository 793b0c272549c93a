//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Every API credential and model knob lives here. The struct is loaded once
//! at process start and handed to constructors by reference; nothing reads
//! keys from globals at call time.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level configuration for a TruthSense process.
#[derive(Debug, Clone, Deserialize)]
pub struct TruthSenseConfig {
    pub version: Option<String>,
    pub model: ModelConfig,
    pub news: NewsConfig,
    pub search: SearchConfig,
    pub video: VideoConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

/// Generative-model client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub api_key: String,
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,
}

/// News-article search API (query-parameter key auth).
#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    pub api_key: String,
    #[serde(default = "default_news_endpoint")]
    pub endpoint: String,
}

/// Web-search API (query-parameter key auth).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub api_key: String,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
}

/// Video-platform metadata API (query-parameter key auth).
#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    pub api_key: String,
    #[serde(default = "default_video_endpoint")]
    pub endpoint: String,
}

/// How much per-conversation context is retained before old entries drop.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_query_retention")]
    pub queries: usize,
    #[serde(default = "default_media_retention")]
    pub videos: usize,
    #[serde(default = "default_media_retention")]
    pub documents: usize,
    #[serde(default = "default_media_retention")]
    pub images: usize,
    #[serde(default = "default_history_retention")]
    pub sources: usize,
    #[serde(default = "default_history_retention")]
    pub verdicts: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            queries: default_query_retention(),
            videos: default_media_retention(),
            documents: default_media_retention(),
            images: default_media_retention(),
            sources: default_history_retention(),
            verdicts: default_history_retention(),
        }
    }
}

fn default_model_name() -> String {
    "gemini-2.0-flash-exp".into()
}
fn default_model_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/".into()
}
fn default_news_endpoint() -> String {
    "https://api.mediastack.com/".into()
}
fn default_search_endpoint() -> String {
    "https://serpapi.com/".into()
}
fn default_video_endpoint() -> String {
    "https://www.googleapis.com/youtube/v3/".into()
}
fn default_query_retention() -> usize {
    20
}
fn default_media_retention() -> usize {
    10
}
fn default_history_retention() -> usize {
    50
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

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct TruthSenseConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TruthSenseConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TruthSenseConfigLoader {
    /// Start with sensible defaults: YAML file + `TRUTHSENSE_` env overrides.
    ///
    /// ```
    /// use truthsense_config::TruthSenseConfigLoader;
    ///
    /// let cfg = TruthSenseConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "1"
    /// model:
    ///   api_key: "k1"
    /// news:
    ///   api_key: "k2"
    /// search:
    ///   api_key: "k3"
    /// video:
    ///   api_key: "k4"
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.version.as_deref(), Some("1"));
    /// assert_eq!(cfg.model.name, "gemini-2.0-flash-exp");
    /// assert_eq!(cfg.retention.queries, 20);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("TRUTHSENSE").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// The loader combines YAML snippets with `TRUTHSENSE_`-prefixed environment
    /// variables and expands `${VAR}` placeholders before materialising
    /// strongly typed structs.
    ///
    /// ```
    /// use truthsense_config::TruthSenseConfigLoader;
    ///
    /// unsafe { std::env::set_var("MODEL_KEY", "injected-from-env"); }
    ///
    /// let cfg = TruthSenseConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// model:
    ///   api_key: "${MODEL_KEY}"
    /// news:
    ///   api_key: "n"
    /// search:
    ///   api_key: "s"
    /// video:
    ///   api_key: "v"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(cfg.model.api_key, "injected-from-env");
    ///
    /// unsafe { std::env::remove_var("MODEL_KEY"); }
    /// ```
    pub fn load(self) -> Result<TruthSenseConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first, expand ${VAR} recursively,
        // then deserialize into the typed config.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: TruthSenseConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    const MINIMAL_YAML: &str = r#"
model:
  api_key: "${GEN_KEY}"
news:
  api_key: "news-key"
search:
  api_key: "search-key"
video:
  api_key: "video-key"
retention:
  queries: 4
"#;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Winston")), ("STATE", Some("NC"))], || {
            let mut v = json!([
                "hello-$CITY",
                { "loc": "${CITY}-${STATE}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles_and_leaves_value_reasonable() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // Depth cap guarantees termination; unresolved ${...} remains.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn loads_typed_config_with_env_injected_key() {
        temp_env::with_var("GEN_KEY", Some("abc123"), || {
            let cfg = TruthSenseConfigLoader::new()
                .with_yaml_str(MINIMAL_YAML)
                .load()
                .expect("valid config");
            assert_eq!(cfg.model.api_key, "abc123");
            assert_eq!(cfg.news.api_key, "news-key");
            assert_eq!(cfg.retention.queries, 4);
            // Unset retention fields fall back to defaults.
            assert_eq!(cfg.retention.verdicts, 50);
            assert_eq!(cfg.video.endpoint, "https://www.googleapis.com/youtube/v3/");
        });
    }
}
