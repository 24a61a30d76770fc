use crate::error::{Result, WarmupError};
use crate::paths;
use crate::types::WarmupStage;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// LimitsConfig
// ---------------------------------------------------------------------------

const DEFAULT_DAILY_CAPS: [u32; 6] = [0, 5, 10, 15, 20, 25];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum actions per calendar day, indexed by warmup stage.
    #[serde(default = "default_daily_caps")]
    pub daily_caps: Vec<u32>,
    /// Platform API calls per account per minute.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

fn default_daily_caps() -> Vec<u32> {
    DEFAULT_DAILY_CAPS.to_vec()
}

fn default_requests_per_minute() -> u32 {
    60
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            daily_caps: default_daily_caps(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

impl LimitsConfig {
    /// Cap for `stage`; a short list falls back to the built-in default.
    pub fn daily_cap(&self, stage: WarmupStage) -> u32 {
        self.daily_caps
            .get(stage.index())
            .copied()
            .unwrap_or(DEFAULT_DAILY_CAPS[stage.index()])
    }
}

// ---------------------------------------------------------------------------
// SweepConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Low-risk communities warmup actions are aimed at.
    #[serde(default = "default_safe_communities")]
    pub safe_communities: Vec<String>,
}

fn default_safe_communities() -> Vec<String> {
    [
        "AskReddit",
        "todayilearned",
        "mildlyinteresting",
        "Showerthoughts",
        "explainlikeimfive",
        "LifeProTips",
        "NoStupidQuestions",
        "CasualConversation",
        "books",
        "movies",
        "music",
        "food",
        "travel",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            safe_communities: default_safe_communities(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            limits: LimitsConfig::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(WarmupError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = self.to_yaml()?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let caps = &self.limits.daily_caps;

        if caps.len() != WarmupStage::all().len() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "limits.daily_caps has {} entries, expected one per stage ({})",
                    caps.len(),
                    WarmupStage::all().len()
                ),
            });
        }

        if caps.windows(2).any(|w| w[1] < w[0]) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "limits.daily_caps decreases with stage".to_string(),
            });
        }

        if caps.first().copied().unwrap_or(0) > 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "stage 'new' permits no actions; its daily cap has no effect"
                    .to_string(),
            });
        }

        if self.limits.requests_per_minute == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "limits.requests_per_minute is 0; no API call could ever be made"
                    .to_string(),
            });
        }

        if self.sweep.safe_communities.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "sweep.safe_communities is empty".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
