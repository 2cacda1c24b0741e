//! mockexam configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the project-local config file.
pub const CONFIG_FILE: &str = "mockexam.toml";

/// Top-level mockexam configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockexamConfig {
    /// Directory holding the JSON record files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Test-session settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Settings for a single timed test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Countdown length in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u32,
    /// Upper bound on questions drawn from the pool.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    /// Placeholder questions generated when the pool is empty.
    #[serde(default = "default_placeholder_count")]
    pub placeholder_count: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./mockexam-data")
}
fn default_time_limit() -> u32 {
    7200
}
fn default_max_questions() -> usize {
    100
}
fn default_placeholder_count() -> usize {
    50
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit(),
            max_questions: default_max_questions(),
            placeholder_count: default_placeholder_count(),
        }
    }
}

impl Default for MockexamConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            session: SessionConfig::default(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `mockexam.toml` in the current directory
/// 2. `~/.config/mockexam/config.toml`
///
/// `MOCKEXAM_DATA_DIR` overrides `data_dir` regardless of where the file came from.
pub fn load_config_from(path: Option<&Path>) -> Result<MockexamConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            global_config_path().filter(|p| p.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MockexamConfig::default(),
    };

    if let Ok(dir) = std::env::var("MOCKEXAM_DATA_DIR") {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

/// Parse a config document.
pub fn parse_config(content: &str) -> Result<MockexamConfig> {
    let config: MockexamConfig = toml::from_str(content)?;
    anyhow::ensure!(
        config.session.time_limit_secs > 0,
        "session.time_limit_secs must be at least 1"
    );
    anyhow::ensure!(
        config.session.max_questions > 0,
        "session.max_questions must be at least 1"
    );
    Ok(config)
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("mockexam")
            .join("config.toml")
    })
}

/// Starter config written by `mockexam init`.
pub const SAMPLE_CONFIG: &str = r#"# mockexam configuration

data_dir = "./mockexam-data"

[session]
time_limit_secs = 7200
max_questions = 100
placeholder_count = 50
"#;
