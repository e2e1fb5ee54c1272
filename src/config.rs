use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::market::{MarketLevel, VolatileBand};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the deviation from the average paid price.
    pub average: f64,
    /// Weight of the deviation from the historical high.
    pub highest: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            average: 0.6,
            highest: 0.4,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub bands: BTreeMap<MarketLevel, VolatileBand>,
    pub score_weights: ScoreWeights,
    /// Real-estate status considered "no change".
    pub real_estate_baseline: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bands: BTreeMap::from([
                (MarketLevel::ExtremeFear, VolatileBand::new(0.70, 0.90)),
                (MarketLevel::Fear, VolatileBand::new(0.60, 0.80)),
                (MarketLevel::Neutral, VolatileBand::new(0.50, 0.70)),
                (MarketLevel::Greed, VolatileBand::new(0.40, 0.60)),
                (MarketLevel::ExtremeGreed, VolatileBand::new(0.20, 0.40)),
            ]),
            score_weights: ScoreWeights::default(),
            real_estate_baseline: "designated as planned district".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for level in MarketLevel::ALL {
            let band = self
                .band(level)
                .with_context(|| format!("missing volatile band for {level}"))?;
            anyhow::ensure!(
                band.min_volatile_rate <= band.max_volatile_rate,
                "band for {level} has min {} above max {}",
                band.min_volatile_rate,
                band.max_volatile_rate
            );
        }
        Ok(())
    }

    pub fn band(&self, level: MarketLevel) -> Option<VolatileBand> {
        self.bands.get(&level).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_covers_every_level() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"real_estate_baseline": "stage 2"}"#).unwrap();
        assert_eq!(cfg.real_estate_baseline, "stage 2");
        assert_eq!(cfg.score_weights, ScoreWeights::default());
        cfg.validate().unwrap();
    }

    #[test]
    fn inverted_band_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.bands.insert(MarketLevel::Greed, VolatileBand::new(0.9, 0.1));
        assert!(cfg.validate().is_err());
    }
}
