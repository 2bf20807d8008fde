use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SETTINGS_FILE: &str = "review.toml";
const DEFAULT_SERVER_URL: &str = "http://localhost:8181";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("difficulty labels '{first}' and '{second}' share the value {value}")]
    DuplicateDifficultyValue {
        first: String,
        second: String,
        value: f64,
    },
    #[error("difficulty label '{0}' is listed twice")]
    DuplicateDifficultyLabel(String),
    #[error("difficulty '{label}' has non-finite value {value}")]
    NonFiniteDifficulty { label: String, value: f64 },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Label to numeric skill difficulty. Values must be unique so the
/// mapping can be inverted; construction rejects collisions.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyScale {
    levels: Vec<(String, f64)>,
}

impl DifficultyScale {
    pub fn new<L: Into<String>>(
        levels: impl IntoIterator<Item = (L, f64)>,
    ) -> Result<Self, ConfigError> {
        let mut checked: Vec<(String, f64)> = Vec::new();
        for (label, value) in levels {
            let label = label.into();
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteDifficulty { label, value });
            }
            if checked.iter().any(|(existing, _)| *existing == label) {
                return Err(ConfigError::DuplicateDifficultyLabel(label));
            }
            if let Some((first, _)) = checked.iter().find(|(_, existing)| *existing == value) {
                return Err(ConfigError::DuplicateDifficultyValue {
                    first: first.clone(),
                    second: label,
                    value,
                });
            }
            checked.push((label, value));
        }
        Ok(Self { levels: checked })
    }

    /// Inverse lookup: the label whose value equals `difficulty`.
    pub fn label_for(&self, difficulty: f64) -> Option<&str> {
        self.levels
            .iter()
            .find(|(_, value)| *value == difficulty)
            .map(|(label, _)| label.as_str())
    }

    pub fn value_of(&self, label: &str) -> Option<f64> {
        self.levels
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, value)| *value)
    }
}

impl Default for DifficultyScale {
    fn default() -> Self {
        Self {
            levels: vec![
                ("Easy".to_string(), 0.3),
                ("Medium".to_string(), 0.6),
                ("Hard".to_string(), 0.9),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub server_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub skill_difficulties: DifficultyScale,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            user_agent: format!("contribution-review/{}", env!("CARGO_PKG_VERSION")),
            skill_difficulties: DifficultyScale::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    server_url: Option<String>,
    request_timeout_seconds: Option<u64>,
    user_agent: Option<String>,
    skill_difficulties: Option<BTreeMap<String, f64>>,
}

/// Loads settings from `path` (or `review.toml` in the working directory
/// when it exists), then applies environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<PanelConfig, ConfigError> {
    load_settings_with_env(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PanelConfig, ConfigError> {
    let mut settings = PanelConfig::default();

    let file = match path {
        Some(path) => Some(read_settings_file(path)?),
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                Some(read_settings_file(default_path)?)
            } else {
                None
            }
        }
    };

    if let Some(file) = file {
        if let Some(v) = file.server_url {
            settings.server_url = v;
        }
        if let Some(v) = file.request_timeout_seconds {
            settings.request_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.user_agent {
            settings.user_agent = v;
        }
        if let Some(levels) = file.skill_difficulties {
            settings.skill_difficulties = DifficultyScale::new(levels)?;
        }
    }

    if let Some(v) = env("REVIEW_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        let seconds = v.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            key: "APP__REQUEST_TIMEOUT_SECONDS",
            value: v.clone(),
        })?;
        settings.request_timeout = Duration::from_secs(seconds);
    }

    settings.server_url = normalize_server_url(&settings.server_url);
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<SettingsFile, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn normalize_server_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return DEFAULT_SERVER_URL.to_string();
    }
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn temp_settings(contents: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("review_settings_test_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("review.toml");
        fs::write(&path, contents).expect("write settings");
        path
    }

    #[test]
    fn inverts_default_scale() {
        let scale = DifficultyScale::default();
        assert_eq!(scale.label_for(0.6), Some("Medium"));
        assert_eq!(scale.label_for(0.45), None);
        assert_eq!(scale.value_of("Hard"), Some(0.9));
    }

    #[test]
    fn rejects_colliding_difficulty_values() {
        let err = DifficultyScale::new([("Easy", 0.3), ("Simple", 0.3)]).expect_err("collision");
        assert!(matches!(
            err,
            ConfigError::DuplicateDifficultyValue { ref first, ref second, .. }
                if first == "Easy" && second == "Simple"
        ));
    }

    #[test]
    fn rejects_non_finite_difficulty() {
        assert!(DifficultyScale::new([("Easy", f64::NAN)]).is_err());
    }

    #[test]
    fn normalizes_bare_host_to_http_url() {
        assert_eq!(normalize_server_url("localhost:8181/"), "http://localhost:8181");
        assert_eq!(
            normalize_server_url("https://example.org/"),
            "https://example.org"
        );
        assert_eq!(normalize_server_url("  "), DEFAULT_SERVER_URL);
    }

    #[test]
    fn reads_file_then_applies_env_overrides() {
        let path = temp_settings(
            r#"
server_url = "http://review.internal:9000/"
request_timeout_seconds = 5

[skill_difficulties]
Easy = 0.25
Hard = 0.75
"#,
        );

        let from_file = load_settings_with_env(Some(&path), no_env).expect("settings");
        assert_eq!(from_file.server_url, "http://review.internal:9000");
        assert_eq!(from_file.request_timeout, Duration::from_secs(5));
        assert_eq!(from_file.skill_difficulties.label_for(0.75), Some("Hard"));
        assert_eq!(from_file.skill_difficulties.value_of("Medium"), None);

        let overrides: HashMap<&str, &str> = [
            ("APP__SERVER_URL", "http://override:1234"),
            ("APP__REQUEST_TIMEOUT_SECONDS", "12"),
        ]
        .into_iter()
        .collect();
        let overridden = load_settings_with_env(Some(&path), |key| {
            overrides.get(key).map(|v| v.to_string())
        })
        .expect("settings");
        assert_eq!(overridden.server_url, "http://override:1234");
        assert_eq!(overridden.request_timeout, Duration::from_secs(12));

        fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn rejects_bad_timeout_override() {
        let err = load_settings_with_env(None, |key| {
            (key == "APP__REQUEST_TIMEOUT_SECONDS").then(|| "soon".to_string())
        })
        .expect_err("bad timeout");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_settings_with_env(Some(Path::new("/nonexistent/review.toml")), no_env)
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
