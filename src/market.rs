use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EvalError;

/// Ordinal market phase. Stored as 1..=5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarketLevel {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl MarketLevel {
    pub const ALL: [MarketLevel; 5] = [
        MarketLevel::ExtremeFear,
        MarketLevel::Fear,
        MarketLevel::Neutral,
        MarketLevel::Greed,
        MarketLevel::ExtremeGreed,
    ];

    pub fn from_status(status: u32) -> Result<Self, EvalError> {
        match status {
            1 => Ok(MarketLevel::ExtremeFear),
            2 => Ok(MarketLevel::Fear),
            3 => Ok(MarketLevel::Neutral),
            4 => Ok(MarketLevel::Greed),
            5 => Ok(MarketLevel::ExtremeGreed),
            other => Err(EvalError::UnknownMarketLevel(other)),
        }
    }

    pub fn status(self) -> u32 {
        self as u32 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            MarketLevel::ExtremeFear => "EXTREME_FEAR",
            MarketLevel::Fear => "FEAR",
            MarketLevel::Neutral => "NEUTRAL",
            MarketLevel::Greed => "GREED",
            MarketLevel::ExtremeGreed => "EXTREME_GREED",
        }
    }
}

impl fmt::Display for MarketLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Acceptable share of volatile assets in a fund, both ends inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolatileBand {
    pub min_volatile_rate: f64,
    pub max_volatile_rate: f64,
}

impl VolatileBand {
    pub const fn new(min_volatile_rate: f64, max_volatile_rate: f64) -> Self {
        Self {
            min_volatile_rate,
            max_volatile_rate,
        }
    }

    pub fn position(&self, ratio: f64) -> BandPosition {
        if ratio > self.max_volatile_rate {
            BandPosition::Above
        } else if ratio < self.min_volatile_rate {
            BandPosition::Below
        } else {
            BandPosition::Inside
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandPosition {
    Below,
    Inside,
    Above,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_level() {
        for level in MarketLevel::ALL {
            assert_eq!(MarketLevel::from_status(level.status()).unwrap(), level);
        }
        assert!(MarketLevel::from_status(0).is_err());
        assert!(MarketLevel::from_status(6).is_err());
    }

    #[test]
    fn band_edges_are_inside() {
        let band = VolatileBand::new(0.4, 0.6);
        assert_eq!(band.position(0.4), BandPosition::Inside);
        assert_eq!(band.position(0.6), BandPosition::Inside);
        assert_eq!(band.position(0.61), BandPosition::Above);
        assert_eq!(band.position(0.39), BandPosition::Below);
    }
}
