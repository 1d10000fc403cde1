//! Reel bank configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};
use crate::scheduler::Easing;
use crate::symbols::SymbolCatalog;

/// Symbol id range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub min_id: u32,
    pub max_id: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { min_id: 1, max_id: 8 }
    }
}

impl CatalogConfig {
    pub fn catalog(&self) -> ReelResult<SymbolCatalog> {
        SymbolCatalog::new(self.min_id, self.max_id)
    }
}

/// Per-reel strip and layout settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Filler symbols stacked between the resting and landing symbol.
    /// Large enough that the strip reads as a blur, not discrete jumps.
    pub filler_pool_size: usize,
    /// Column pitch as a multiple of symbol width
    pub reel_spacing: f32,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            filler_pool_size: 14,
            reel_spacing: 1.02,
        }
    }
}

/// Spin timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTiming {
    /// Duration of one reel's translation (s)
    pub spin_duration_secs: f64,
    /// Start offset between consecutive reels (s)
    pub stagger_secs: f64,
    /// Easing of the translation
    pub easing: Easing,
    /// Extra time after the last reel should have landed before the
    /// watchdog force-lands the cycle. `None` disables the watchdog.
    pub watchdog_grace_secs: Option<f64>,
}

impl SpinTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            spin_duration_secs: 4.0,
            stagger_secs: 0.1,
            easing: Easing::Power1InOut,
            watchdog_grace_secs: Some(2.0),
        }
    }

    /// Fast spins
    pub fn turbo() -> Self {
        Self {
            spin_duration_secs: 1.2,
            stagger_secs: 0.05,
            easing: Easing::Power1Out,
            watchdog_grace_secs: Some(1.0),
        }
    }

    /// Near-instant spins for tests and batch runs
    pub fn instant() -> Self {
        Self {
            spin_duration_secs: 0.01,
            stagger_secs: 0.001,
            easing: Easing::Linear,
            watchdog_grace_secs: Some(0.5),
        }
    }

    /// When the last of `reel_count` reels is due to land, measured from spin start
    pub fn total_spin_duration(&self, reel_count: usize) -> f64 {
        self.spin_duration_secs + reel_count.saturating_sub(1) as f64 * self.stagger_secs
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}

/// Win highlight pulse settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Peak scale of a pulsing symbol
    pub scale: f32,
    /// Duration of each half of a pulse (up, then down)
    pub pulse_secs: f64,
    /// Pause between two symbols within a cycle
    pub gap_secs: f64,
    /// Pause after every winning symbol has pulsed once
    pub cycle_pause_secs: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            scale: 1.25,
            pulse_secs: 0.2,
            gap_secs: 0.1,
            cycle_pause_secs: 1.0,
        }
    }
}

/// Complete reel bank configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelBankConfig {
    pub catalog: CatalogConfig,
    pub reel: ReelConfig,
    pub timing: SpinTiming,
    pub highlight: HighlightConfig,
    /// Fixed RNG seed for reproducible spins
    pub seed: Option<u64>,
}

impl ReelBankConfig {
    /// Parse from JSON
    pub fn from_json_str(json: &str) -> ReelResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ReelError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML
    pub fn from_yaml_str(yaml: &str) -> ReelResult<Self> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| ReelError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            other => Err(ReelError::ConfigParse(format!(
                "unsupported config extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    pub fn to_json(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReelError::ConfigParse(e.to_string()))
    }

    /// Reject configs the bank cannot run with
    pub fn validate(&self) -> ReelResult<()> {
        self.catalog.catalog()?;

        if self.reel.filler_pool_size == 0 {
            return Err(ReelError::InvalidConfig("filler_pool_size must be > 0".into()));
        }
        if !(self.reel.reel_spacing.is_finite() && self.reel.reel_spacing > 0.0) {
            return Err(ReelError::InvalidConfig("reel_spacing must be > 0".into()));
        }

        let t = &self.timing;
        if !positive(t.spin_duration_secs) {
            return Err(ReelError::InvalidConfig("spin_duration_secs must be > 0".into()));
        }
        if !(t.stagger_secs.is_finite() && t.stagger_secs >= 0.0) {
            return Err(ReelError::InvalidConfig("stagger_secs must be >= 0".into()));
        }
        if let Some(grace) = t.watchdog_grace_secs {
            if !(grace.is_finite() && grace >= 0.0) {
                return Err(ReelError::InvalidConfig("watchdog_grace_secs must be >= 0".into()));
            }
        }

        let h = &self.highlight;
        if !(h.scale.is_finite() && h.scale > 0.0) {
            return Err(ReelError::InvalidConfig("highlight scale must be > 0".into()));
        }
        if !positive(h.pulse_secs) {
            return Err(ReelError::InvalidConfig("pulse_secs must be > 0".into()));
        }
        if !(h.gap_secs.is_finite() && h.gap_secs >= 0.0)
            || !(h.cycle_pause_secs.is_finite() && h.cycle_pause_secs >= 0.0)
        {
            return Err(ReelError::InvalidConfig("highlight pauses must be >= 0".into()));
        }

        Ok(())
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReelBankConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reel.filler_pool_size, 14);
        assert_eq!(config.highlight.scale, 1.25);
        assert_eq!(config.timing.stagger_secs, 0.1);
    }

    #[test]
    fn test_timing_profiles() {
        let normal = SpinTiming::normal();
        let turbo = SpinTiming::turbo();
        let instant = SpinTiming::instant();
        assert!(turbo.spin_duration_secs < normal.spin_duration_secs);
        assert!(instant.spin_duration_secs < turbo.spin_duration_secs);
        assert!((normal.total_spin_duration(3) - 4.2).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            ReelBankConfig::from_json_str(r#"{ "seed": 7, "timing": { "stagger_secs": 0.25 } }"#)
                .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.timing.stagger_secs, 0.25);
        assert_eq!(config.timing.spin_duration_secs, 4.0);
        assert_eq!(config.catalog, CatalogConfig::default());
    }

    #[test]
    fn test_yaml_config() {
        let yaml = "catalog:\n  min_id: 1\n  max_id: 4\nhighlight:\n  scale: 1.5\n";
        let config = ReelBankConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.catalog.max_id, 4);
        assert_eq!(config.highlight.scale, 1.5);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(matches!(
            ReelBankConfig::from_json_str(r#"{ "reel": { "filler_pool_size": 0 } }"#),
            Err(ReelError::InvalidConfig(_))
        ));
        assert!(matches!(
            ReelBankConfig::from_json_str(r#"{ "timing": { "spin_duration_secs": 0.0 } }"#),
            Err(ReelError::InvalidConfig(_))
        ));
        assert!(matches!(
            ReelBankConfig::from_json_str(r#"{ "catalog": { "min_id": 0 } }"#),
            Err(ReelError::InvalidConfig(_))
        ));
        assert!(matches!(
            ReelBankConfig::from_json_str("not json"),
            Err(ReelError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = ReelBankConfig {
            seed: Some(11),
            ..Default::default()
        }
        .to_json()
        .unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = ReelBankConfig::load(file.path()).unwrap();
        assert_eq!(loaded.seed, Some(11));

        let other = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            ReelBankConfig::load(other.path()),
            Err(ReelError::ConfigParse(_))
        ));
    }
}
