//! scorecard configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Subject;

/// What to do with exam rows when no id column resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingIdPolicy {
    /// Derive a stable id from subject, row position and name.
    #[default]
    Derive,
    /// Fail validation with `MissingIdColumn`.
    Reject,
}

impl fmt::Display for MissingIdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingIdPolicy::Derive => write!(f, "derive"),
            MissingIdPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for MissingIdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "derive" => Ok(MissingIdPolicy::Derive),
            "reject" => Ok(MissingIdPolicy::Reject),
            other => Err(format!("unknown missing id policy: {other}")),
        }
    }
}

/// Top-level scorecard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardConfig {
    /// Questions per exam subject when the totals row gives none.
    #[serde(default)]
    pub default_total_questions: u32,
    /// Per-subject overrides of `default_total_questions`.
    #[serde(default)]
    pub total_questions: BTreeMap<Subject, u32>,
    #[serde(default)]
    pub missing_id_policy: MissingIdPolicy,
    /// Uploads above this size are logged but still processed.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for ScorecardConfig {
    fn default() -> Self {
        Self {
            default_total_questions: 0,
            total_questions: BTreeMap::new(),
            missing_id_policy: MissingIdPolicy::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ScorecardConfig {
    /// Total questions to assume for `subject` before scanning the file.
    pub fn total_questions_for(&self, subject: Subject) -> u32 {
        self.total_questions
            .get(&subject)
            .copied()
            .unwrap_or(self.default_total_questions)
    }
}

/// Load config from an explicit path, or search the well-known paths.
///
/// Search order without a path:
/// 1. `scorecard.toml` in the current directory
/// 2. `~/.config/scorecard/config.toml`
///
/// Environment variable overrides: `SCORECARD_DEFAULT_TOTAL_QUESTIONS`,
/// `SCORECARD_MISSING_ID_POLICY`.
pub fn load_config_from(path: Option<&Path>) -> Result<ScorecardConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("scorecard.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<ScorecardConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => ScorecardConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut ScorecardConfig) -> Result<()> {
    if let Ok(total) = std::env::var("SCORECARD_DEFAULT_TOTAL_QUESTIONS") {
        config.default_total_questions = total
            .trim()
            .parse()
            .with_context(|| format!("invalid SCORECARD_DEFAULT_TOTAL_QUESTIONS: {total}"))?;
    }
    if let Ok(policy) = std::env::var("SCORECARD_MISSING_ID_POLICY") {
        config.missing_id_policy = policy.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("scorecard"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ScorecardConfig::default();
        assert_eq!(config.default_total_questions, 0);
        assert_eq!(config.missing_id_policy, MissingIdPolicy::Derive);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn parse_config_with_subject_overrides() {
        let toml_str = r#"
default_total_questions = 40
missing_id_policy = "reject"

[total_questions]
maths = 60
reading = 35
"#;
        let config: ScorecardConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.missing_id_policy, MissingIdPolicy::Reject);
        assert_eq!(config.total_questions_for(Subject::Maths), 60);
        assert_eq!(config.total_questions_for(Subject::Verbal), 40);
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scorecard.toml");
        std::fs::write(&path, "default_total_questions = 25\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_total_questions, 25);
    }

    #[test]
    fn policy_parse() {
        assert_eq!("Reject".parse::<MissingIdPolicy>().unwrap(), MissingIdPolicy::Reject);
        assert!("maybe".parse::<MissingIdPolicy>().is_err());
    }
}
