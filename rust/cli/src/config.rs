//! Layered CLI configuration: defaults, then the TOML file named by
//! `KALOOKI_CONFIG`, then `KALOOKI_*` environment variables. Command-line
//! flags override all three at the call site.

use kalooki_engine::config::RuleConfig;
use kalooki_engine::seat::Difficulty;
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_ENV: &str = "KALOOKI_CONFIG";
pub const SEED_ENV: &str = "KALOOKI_SEED";
pub const DIFFICULTY_ENV: &str = "KALOOKI_DIFFICULTY";
pub const THRESHOLD_ENV: &str = "KALOOKI_OPENING_THRESHOLD";
pub const BOTS_EXEMPT_ENV: &str = "KALOOKI_BOTS_EXEMPT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub difficulty: Difficulty,
    pub opening_threshold: u32,
    pub bots_exempt: bool,
}

impl Default for Config {
    fn default() -> Self {
        let rules = RuleConfig::default();
        Self {
            seed: None,
            difficulty: Difficulty::default(),
            opening_threshold: rules.opening_threshold,
            bots_exempt: rules.bots_exempt_from_elimination,
        }
    }
}

impl Config {
    /// Table rules with this configuration's overrides applied.
    pub fn rules(&self) -> RuleConfig {
        RuleConfig {
            opening_threshold: self.opening_threshold,
            bots_exempt_from_elimination: self.bots_exempt,
            ..RuleConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub difficulty: ValueSource,
    pub opening_threshold: ValueSource,
    pub bots_exempt: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            difficulty: ValueSource::Default,
            opening_threshold: ValueSource::Default,
            bots_exempt: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.difficulty {
            cfg.difficulty = v
                .parse()
                .map_err(|e: String| ConfigError::Invalid(format!("Invalid difficulty: {}", e)))?;
            sources.difficulty = ValueSource::File;
        }
        if let Some(v) = f.opening_threshold {
            cfg.opening_threshold = v;
            sources.opening_threshold = ValueSource::File;
        }
        if let Some(v) = f.bots_exempt {
            cfg.bots_exempt = v;
            sources.bots_exempt = ValueSource::File;
        }
    }

    if let Ok(seed) = std::env::var(SEED_ENV)
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid("Invalid seed".into()))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(diff) = std::env::var(DIFFICULTY_ENV)
        && !diff.is_empty()
    {
        cfg.difficulty = diff
            .parse()
            .map_err(|e: String| ConfigError::Invalid(format!("Invalid difficulty: {}", e)))?;
        sources.difficulty = ValueSource::Env;
    }
    if let Ok(th) = std::env::var(THRESHOLD_ENV)
        && !th.is_empty()
    {
        cfg.opening_threshold = th
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid opening threshold".into()))?;
        sources.opening_threshold = ValueSource::Env;
    }
    if let Ok(ex) = std::env::var(BOTS_EXEMPT_ENV)
        && !ex.is_empty()
    {
        cfg.bots_exempt =
            parse_bool(&ex).ok_or_else(|| ConfigError::Invalid("Invalid bots_exempt".into()))?;
        sources.bots_exempt = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    opening_threshold: Option<u32>,
    #[serde(default)]
    bots_exempt: Option<bool>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.opening_threshold == 0 {
        return Err(ConfigError::Invalid("opening_threshold must be >0".into()));
    }
    cfg.rules()
        .validate()
        .map_err(|e| ConfigError::Invalid(format!("invalid rules: {}", e)))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
