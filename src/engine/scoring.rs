//! Sell/buy priority of a holding.
//!
//! The score grows as the current price rises above both the average paid
//! price and the historical high: high scores are sold first, low scores are
//! bought first.

use crate::config::ScoreWeights;
use crate::error::{EvalError, EvalResult};
use crate::types::{Asset, AssetId, PriceInfo};

pub fn priority_score(
    asset_id: AssetId,
    info: &PriceInfo,
    weights: &ScoreWeights,
) -> EvalResult<f64> {
    let cp = info.current;
    if !(cp.is_finite() && cp > 0.0) {
        return Err(EvalError::NonPositivePrice { asset_id, price: cp });
    }
    Ok(weights.average * ((cp - info.average) / cp) + weights.highest * ((cp - info.highest) / cp))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankMode {
    /// Highest score first.
    Sell,
    /// Lowest score first.
    Buy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ranked {
    pub asset: Asset,
    pub price: PriceInfo,
    pub score: f64,
}

/// Stable sort: equal scores keep their input order in both modes.
pub fn rank(items: &mut [Ranked], mode: RankMode) {
    match mode {
        RankMode::Sell => items.sort_by(|a, b| b.score.total_cmp(&a.score)),
        RankMode::Buy => items.sort_by(|a, b| a.score.total_cmp(&b.score)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Currency;

    fn ranked(id: u64, score: f64) -> Ranked {
        Ranked {
            asset: Asset {
                id: AssetId(id),
                name: format!("asset-{id}"),
                category: 5,
                currency: Currency::Krw,
                code: id.to_string(),
                top: 0.0,
                bottom: 0.0,
                sell_price: 0.0,
                buy_price: 0.0,
            },
            price: PriceInfo {
                current: 1.0,
                average: 1.0,
                highest: 1.0,
                lowest: 1.0,
            },
            score,
        }
    }

    fn scores(items: &[Ranked]) -> Vec<f64> {
        items.iter().map(|r| r.score).collect()
    }

    #[test]
    fn weighted_deviation_from_average_and_high() {
        let info = PriceInfo {
            current: 100.0,
            average: 80.0,
            highest: 120.0,
            lowest: 70.0,
        };
        let s = priority_score(AssetId(1), &info, &ScoreWeights::default()).unwrap();
        // 0.6 * 0.2 + 0.4 * -0.2
        assert!((s - 0.04).abs() < 1e-12, "{s}");
    }

    #[test]
    fn zero_current_price_is_rejected() {
        let info = PriceInfo {
            current: 0.0,
            average: 1.0,
            highest: 1.0,
            lowest: 0.0,
        };
        assert!(matches!(
            priority_score(AssetId(4), &info, &ScoreWeights::default()),
            Err(EvalError::NonPositivePrice { .. })
        ));
    }

    #[test]
    fn sell_descends_buy_ascends() {
        let mut items = vec![ranked(1, 0.2), ranked(2, -0.1), ranked(3, 0.5)];
        rank(&mut items, RankMode::Sell);
        assert_eq!(scores(&items), vec![0.5, 0.2, -0.1]);
        rank(&mut items, RankMode::Buy);
        assert_eq!(scores(&items), vec![-0.1, 0.2, 0.5]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut items = vec![ranked(1, 0.3), ranked(2, 0.3), ranked(3, 0.1)];
        rank(&mut items, RankMode::Sell);
        let ids: Vec<u64> = items.iter().map(|r| r.asset.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        rank(&mut items, RankMode::Buy);
        let ids: Vec<u64> = items.iter().map(|r| r.asset.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
