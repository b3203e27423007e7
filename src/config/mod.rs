//! Configuration management.
//!
//! [`ProposalConfig`] is owned by callers and passed to every engine call;
//! the engine never falls back to a default of its own. The defaults defined
//! here are the values the CLI and config file start from.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default weight of keyword similarity in the relevance score.
pub const DEFAULT_MATCH_WEIGHT: f64 = 0.7;
/// Default weight of recency in the relevance score.
pub const DEFAULT_RECENCY_WEIGHT: f64 = 0.3;
/// Default recency window: 30 days in milliseconds.
pub const DEFAULT_RECENCY_WINDOW_MS: i64 = 30 * 24 * 60 * 60 * 1000;
/// Default minimum Jaccard similarity for a proposal.
pub const DEFAULT_MIN_JACCARD: f64 = 0.2;
/// Default maximum number of proposals returned.
pub const DEFAULT_MAX_PROPOSALS: usize = 10;
/// Default proposal cache capacity.
pub const DEFAULT_CACHE_MAX_SIZE: usize = 50;
/// Default proposal cache TTL in milliseconds.
pub const DEFAULT_CACHE_TTL_MS: u64 = 60_000;

/// Tuning for proposal scoring and ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProposalConfig {
    /// Weight applied to the Jaccard similarity.
    pub match_weight: f64,
    /// Weight applied to the recency boost.
    pub recency_weight: f64,
    /// Age (milliseconds) at which the recency boost reaches zero.
    pub recency_window_ms: i64,
    /// Pairs below this Jaccard similarity are discarded.
    pub min_jaccard: f64,
    /// Maximum number of proposals returned by ranked operations.
    pub max_proposals: usize,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            match_weight: DEFAULT_MATCH_WEIGHT,
            recency_weight: DEFAULT_RECENCY_WEIGHT,
            recency_window_ms: DEFAULT_RECENCY_WINDOW_MS,
            min_jaccard: DEFAULT_MIN_JACCARD,
            max_proposals: DEFAULT_MAX_PROPOSALS,
        }
    }
}

impl ProposalConfig {
    /// Sets the minimum Jaccard similarity.
    #[must_use]
    pub const fn with_min_jaccard(mut self, min_jaccard: f64) -> Self {
        self.min_jaccard = min_jaccard;
        self
    }

    /// Sets the maximum number of proposals.
    #[must_use]
    pub const fn with_max_proposals(mut self, max_proposals: usize) -> Self {
        self.max_proposals = max_proposals;
        self
    }

    /// Sets the match and recency weights.
    #[must_use]
    pub const fn with_weights(mut self, match_weight: f64, recency_weight: f64) -> Self {
        self.match_weight = match_weight;
        self.recency_weight = recency_weight;
        self
    }

    /// Sets the recency window.
    #[must_use]
    pub const fn with_recency_window_ms(mut self, recency_window_ms: i64) -> Self {
        self.recency_window_ms = recency_window_ms;
        self
    }

    /// Upper bound of any relevance score under this config.
    #[must_use]
    pub fn max_score(&self) -> f64 {
        self.match_weight + self.recency_weight
    }

    /// Validates value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for negative weights, a
    /// non-positive recency window, or `min_jaccard` outside `[0, 1]`.
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.match_weight >= 0.0 && self.recency_weight >= 0.0) {
            return Err(crate::Error::InvalidInput(format!(
                "weights must be non-negative (match={}, recency={})",
                self.match_weight, self.recency_weight
            )));
        }
        if self.recency_window_ms <= 0 {
            return Err(crate::Error::InvalidInput(format!(
                "recency window must be positive, got {}ms",
                self.recency_window_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.min_jaccard) {
            return Err(crate::Error::InvalidInput(format!(
                "min_jaccard must be within [0, 1], got {}",
                self.min_jaccard
            )));
        }
        Ok(())
    }
}

/// Proposal cache sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached proposal lists.
    pub max_size: usize,
    /// How long a cached list stays valid.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CACHE_MAX_SIZE,
            ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
        }
    }
}

impl CacheConfig {
    /// Validates value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if `max_size` is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_size == 0 {
            return Err(crate::Error::InvalidInput(
                "cache max_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format string. Unknown values fall back to pretty output.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format.
    pub format: LogFormat,
    /// Default filter directive when `REMINISCE_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "warn".to_string(),
        }
    }
}

/// Main configuration for reminisce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminisceConfig {
    /// Proposal scoring defaults handed to the engine by callers.
    pub proposals: ProposalConfig,
    /// Proposal cache sizing.
    pub cache: CacheConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Proposal section.
    pub proposals: Option<ConfigFileProposals>,
    /// Cache section.
    pub cache: Option<ConfigFileCache>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Proposals section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileProposals {
    /// Match weight.
    pub match_weight: Option<f64>,
    /// Recency weight.
    pub recency_weight: Option<f64>,
    /// Recency window in milliseconds.
    pub recency_window_ms: Option<i64>,
    /// Minimum Jaccard similarity.
    pub min_jaccard: Option<f64>,
    /// Maximum proposals.
    pub max_proposals: Option<usize>,
}

/// Cache section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileCache {
    /// Maximum entries.
    pub max_size: Option<usize>,
    /// TTL in milliseconds.
    pub ttl_ms: Option<u64>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Format: "pretty" or "json".
    pub format: Option<String>,
    /// Default filter directive.
    pub level: Option<String>,
}

impl ReminisceConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// is out of range.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Self::parse_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for [`ConfigFile`] or
    /// if a value is out of range.
    pub fn parse_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let config = Self::from_config_file(file);
        config.proposals.validate()?;
        config.cache.validate()?;
        Ok(config)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/reminisce/` on macOS)
    /// 2. XDG config dir (`~/.config/reminisce/`)
    ///
    /// Returns default configuration if no usable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("reminisce").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("reminisce")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `ReminisceConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(p) = file.proposals {
            if let Some(v) = p.match_weight {
                config.proposals.match_weight = v;
            }
            if let Some(v) = p.recency_weight {
                config.proposals.recency_weight = v;
            }
            if let Some(v) = p.recency_window_ms {
                config.proposals.recency_window_ms = v;
            }
            if let Some(v) = p.min_jaccard {
                config.proposals.min_jaccard = v;
            }
            if let Some(v) = p.max_proposals {
                config.proposals.max_proposals = v;
            }
        }
        if let Some(c) = file.cache {
            if let Some(v) = c.max_size {
                config.cache.max_size = v;
            }
            if let Some(v) = c.ttl_ms {
                config.cache.ttl = Duration::from_millis(v);
            }
        }
        if let Some(l) = file.logging {
            if let Some(format) = l.format {
                config.logging.format = LogFormat::parse(&format);
            }
            if let Some(level) = l.level {
                config.logging.level = level;
            }
        }

        config
    }
}
