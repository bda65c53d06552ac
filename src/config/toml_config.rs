use crate::adapters::{HttpSource, LocalSource, SnapshotSource};
use crate::core::snapshot::SnapshotPolicy;
use crate::utils::error::{AtlasError, Result};
use crate::utils::logger::init_logger;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_MANIFEST_PATH: &str = "index.json";
pub const DEFAULT_COUNTRIES_DIR: &str = "countries";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_NODE_LIMIT: usize = 18;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Http,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: SourceKind,
    pub base_url: Option<String>,
    pub data_dir: Option<String>,
    pub manifest_path: Option<String>,
    pub countries_dir: Option<String>,
    /// Web root for rooted manifest paths such as `/data/v1/countries/...`.
    pub root_dir: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphConfig {
    pub node_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub small_group_max: Option<usize>,
    pub small_group_min_coverage: Option<usize>,
    pub min_coverage: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Installs the global tracing subscriber from this section.
    pub fn init(&self) -> Result<()> {
        init_logger(&self.level, self.json)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Loads and validates a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML text after env substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let config: Self = toml::from_str(&processed_content).map_err(|e| AtlasError::Config {
            message: format!("TOML parsing error: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static pattern compiles")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn manifest_path(&self) -> &str {
        self.source
            .manifest_path
            .as_deref()
            .unwrap_or(DEFAULT_MANIFEST_PATH)
    }

    pub fn countries_dir(&self) -> &str {
        self.source
            .countries_dir
            .as_deref()
            .unwrap_or(DEFAULT_COUNTRIES_DIR)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn node_limit(&self) -> usize {
        self.graph.node_limit.unwrap_or(DEFAULT_NODE_LIMIT)
    }

    pub fn snapshot_policy(&self) -> SnapshotPolicy {
        let defaults = SnapshotPolicy::default();
        SnapshotPolicy {
            small_group_max: self
                .snapshot
                .small_group_max
                .unwrap_or(defaults.small_group_max),
            small_group_min_coverage: self
                .snapshot
                .small_group_min_coverage
                .unwrap_or(defaults.small_group_min_coverage),
            min_coverage: self.snapshot.min_coverage.unwrap_or(defaults.min_coverage),
        }
    }

    /// The document source selected by `[source] type`.
    pub fn build_source(&self) -> Result<SnapshotSource> {
        match self.source.r#type {
            SourceKind::Http => {
                let base_url = validate_required_field("source.base_url", &self.source.base_url)?;
                Ok(SnapshotSource::Http(HttpSource::new(base_url, self.timeout())?))
            }
            SourceKind::Local => {
                let data_dir = validate_required_field("source.data_dir", &self.source.data_dir)?;
                let mut source = LocalSource::new(data_dir);
                if let Some(root_dir) = &self.source.root_dir {
                    source = source.with_root_dir(root_dir);
                }
                Ok(SnapshotSource::Local(source))
            }
        }
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        match self.source.r#type {
            SourceKind::Http => {
                let base_url = validate_required_field("source.base_url", &self.source.base_url)?;
                validate_url("source.base_url", base_url)?;
            }
            SourceKind::Local => {
                let data_dir = validate_required_field("source.data_dir", &self.source.data_dir)?;
                validate_path("source.data_dir", data_dir)?;
                if let Some(root_dir) = &self.source.root_dir {
                    validate_path("source.root_dir", root_dir)?;
                }
            }
        }

        validate_path("source.manifest_path", self.manifest_path())?;
        validate_path("source.countries_dir", self.countries_dir())?;

        if let Some(timeout) = self.source.timeout_seconds {
            validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }

        validate_positive_number("graph.node_limit", self.node_limit(), 1)?;

        let policy = self.snapshot_policy();
        validate_positive_number("snapshot.small_group_max", policy.small_group_max, 1)?;
        validate_positive_number(
            "snapshot.small_group_min_coverage",
            policy.small_group_min_coverage,
            1,
        )?;
        validate_positive_number("snapshot.min_coverage", policy.min_coverage, 1)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_http_config_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
[source]
type = "http"
base_url = "https://example.org/data/v1/"
"#,
        )
        .unwrap();

        assert_eq!(config.manifest_path(), "index.json");
        assert_eq!(config.countries_dir(), "countries");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.node_limit(), 18);
        assert_eq!(config.snapshot_policy(), SnapshotPolicy::default());
        assert_eq!(config.logging.level, "info");
        assert!(matches!(config.build_source().unwrap(), SnapshotSource::Http(_)));
    }

    #[test]
    fn test_full_local_config() {
        let config = EngineConfig::from_toml_str(
            r#"
[source]
type = "local"
data_dir = "./public"
manifest_path = "data/v1/index.json"
countries_dir = "data/v1/countries"

[graph]
node_limit = 12

[snapshot]
small_group_max = 4
small_group_min_coverage = 2
min_coverage = 4

[logging]
level = "debug"
json = true
"#,
        )
        .unwrap();

        assert_eq!(config.manifest_path(), "data/v1/index.json");
        assert_eq!(config.node_limit(), 12);
        assert_eq!(config.snapshot_policy().min_coverage, 4);
        assert!(config.logging.json);
        assert!(matches!(config.build_source().unwrap(), SnapshotSource::Local(_)));
    }

    #[test]
    fn test_http_without_base_url_fails() {
        let err = EngineConfig::from_toml_str(
            r#"
[source]
type = "http"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, AtlasError::MissingConfig { .. }));
    }

    #[test]
    fn test_zero_node_limit_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
[source]
type = "local"
data_dir = "./public"

[graph]
node_limit = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, AtlasError::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ECO_ATLAS_TEST_BASE_URL", "https://snapshots.example.org/v1/");
        let config = EngineConfig::from_toml_str(
            r#"
[source]
type = "http"
base_url = "${ECO_ATLAS_TEST_BASE_URL}"
"#,
        )
        .unwrap();
        assert_eq!(
            config.source.base_url.as_deref(),
            Some("https://snapshots.example.org/v1/")
        );
    }

    #[test]
    fn test_unset_env_var_left_in_place() {
        let out = EngineConfig::substitute_env_vars("x = \"${ECO_ATLAS_SURELY_UNSET_VAR}\"");
        assert_eq!(out, "x = \"${ECO_ATLAS_SURELY_UNSET_VAR}\"");
    }
}
