use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DqError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub vocab: VocabularyConfig,
}

impl Config {
    /// Load configuration with layered precedence: defaults, then the global
    /// config file, then the project file under `dq_root`, then env overrides.
    /// An explicit path (flag or `DQ_CONFIG`) replaces the file layers.
    pub fn load(explicit_path: Option<&Path>, dq_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("DQ_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&dq_root.join("config.toml"))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let path = dirs::config_dir()
            .ok_or_else(|| DqError::MissingConfig("config directory not found".to_string()))?
            .join("dq/config.toml");
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| DqError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| DqError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.engine {
            self.engine.merge(patch);
        }
        if let Some(vocab) = patch.vocab {
            self.vocab = vocab;
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_f64("DQ_EXPLORATION_WEIGHT")? {
            self.engine.exploration_weight = value;
        }
        if let Some(value) = env_f64("DQ_NOVELTY_WEIGHT")? {
            self.engine.novelty_weight = value;
        }
        Ok(())
    }
}

fn env_f64(name: &str) -> Result<Option<f64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|err| DqError::Config(format!("{name}: {err}"))),
        Err(_) => Ok(None),
    }
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Weight on the uncertainty bonus (alpha).
    pub exploration_weight: f64,
    /// Weight on the novelty bonus (beta).
    pub novelty_weight: f64,
    /// Hard cap on the candidate set per invocation.
    pub max_candidates: usize,
    /// How many recent executions feed the novelty comparison.
    pub history_window: usize,
    /// How many proven patterns are replayed per invocation.
    pub pattern_limit: usize,
    /// How many top effective terms are spliced per invocation.
    pub term_limit: usize,
    /// How many values of each controlled vocabulary a template expands to.
    pub vocab_expansion_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exploration_weight: 0.3,
            novelty_weight: 0.5,
            max_candidates: 50,
            history_window: 20,
            pattern_limit: 5,
            term_limit: 5,
            vocab_expansion_cap: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    engine: Option<EnginePatch>,
    vocab: Option<VocabularyConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EnginePatch {
    exploration_weight: Option<f64>,
    novelty_weight: Option<f64>,
    max_candidates: Option<usize>,
    history_window: Option<usize>,
    pattern_limit: Option<usize>,
    term_limit: Option<usize>,
    vocab_expansion_cap: Option<usize>,
}

impl EngineConfig {
    fn merge(&mut self, patch: EnginePatch) {
        if let Some(value) = patch.exploration_weight {
            self.exploration_weight = value;
        }
        if let Some(value) = patch.novelty_weight {
            self.novelty_weight = value;
        }
        if let Some(value) = patch.max_candidates {
            self.max_candidates = value;
        }
        if let Some(value) = patch.history_window {
            self.history_window = value;
        }
        if let Some(value) = patch.pattern_limit {
            self.pattern_limit = value;
        }
        if let Some(value) = patch.term_limit {
            self.term_limit = value;
        }
        if let Some(value) = patch.vocab_expansion_cap {
            self.vocab_expansion_cap = value;
        }
    }
}

/// Controlled vocabularies and query templates, kept as data so deployments
/// can extend them without touching scoring logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    pub vehicle_types: Vec<String>,
    pub event_types: Vec<String>,
    pub service_types: Vec<String>,
    pub technology_types: Vec<String>,
    pub policy_types: Vec<String>,
    pub challenge_types: Vec<String>,
    pub temporal_keywords: Vec<String>,
    pub templates: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            vehicle_types: strings(&[
                "bus",
                "electric bus",
                "light rail",
                "commuter rail",
                "ferry",
                "paratransit van",
            ]),
            event_types: strings(&[
                "contract award",
                "RFP",
                "procurement",
                "bid",
                "tender",
                "agreement",
            ]),
            service_types: strings(&[
                "fare collection",
                "route expansion",
                "maintenance",
                "operations",
                "scheduling",
            ]),
            technology_types: strings(&[
                "fare payment system",
                "real-time tracking",
                "electric charging infrastructure",
                "CAD AVL",
                "signal priority",
            ]),
            policy_types: strings(&[
                "funding",
                "federal grant",
                "zero-emission mandate",
                "budget",
                "regulation",
            ]),
            challenge_types: strings(&[
                "driver shortage",
                "ridership decline",
                "budget deficit",
                "service cuts",
            ]),
            temporal_keywords: strings(&["recent", "upcoming", "new", "latest"]),
            templates: strings(&[
                "[agency] [vehicle] [event]",
                "[agency] [event] news",
                "[agency] [technology] deployment",
                "[agency] [policy] announcement",
                "[agency] [service] [event]",
                "[agency] [challenge]",
                "[location] transit [vehicle] [event]",
                "[location] public transit [policy]",
                "[topic] transit agency [event]",
                "[topic] [technology]",
                "transit agency [vehicle] [event]",
                "public transit [challenge] news",
            ]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
