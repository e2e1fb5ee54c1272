use std::collections::HashMap;
use tracing::info;

use crate::alerts::{AlertCache, AlertKey, Direction};
use crate::engine::{EventEvaluator, Operation};
use crate::error::{EvalError, EvalResult};
use crate::outbox::Outbox;
use crate::types::{Asset, AssetId};

/// Current prices observed during one asset pass.
pub type PriceMap = HashMap<AssetId, f64>;

fn first_crossing(alerts: &AlertCache, key: AlertKey) -> bool {
    let fresh = alerts.mark_if_new(key);
    if fresh {
        info!(
            asset = %key.asset_id,
            direction = ?key.direction,
            threshold = key.threshold(),
            "threshold crossed"
        );
    }
    fresh
}

/// Buy side wins over sell side; each (asset, direction, threshold) fires once.
pub fn threshold_message(asset: &Asset, price: f64, alerts: &AlertCache) -> Option<String> {
    let buy = AlertKey::new(asset.id, Direction::Buy, asset.buy_price);
    if price <= asset.buy_price && first_crossing(alerts, buy) {
        return Some(format!(
            "BUY {}. ID : {}. LOWER BOUND : {}. CURRENT PRICE : {}",
            asset.name, asset.id, asset.buy_price, price
        ));
    }
    if asset.has_sell_threshold()
        && price >= asset.sell_price
        && first_crossing(alerts, AlertKey::new(asset.id, Direction::Sell, asset.sell_price))
    {
        return Some(format!(
            "SELL {}. ID : {}. UPPER BOUND : {}. CURRENT PRICE : {}",
            asset.name, asset.id, asset.sell_price, price
        ));
    }
    None
}

impl EventEvaluator {
    pub async fn asset_event(&self, out: &Outbox) {
        if let Err(e) = self.asset_pass(out).await {
            out.error(Operation::AssetEvent, e);
        }
    }

    async fn asset_pass(&self, out: &Outbox) -> EvalResult<()> {
        let assets = self
            .storage
            .asset_list()
            .await
            .map_err(|e| EvalError::lookup("asset_list", e))?;

        let mut prices = PriceMap::with_capacity(assets.len());
        for asset in &assets {
            if let Some(msg) = self.check_thresholds(asset.id, &mut prices).await? {
                out.send(msg);
            }
        }

        let mut summaries = self
            .storage
            .fund_summaries()
            .await
            .map_err(|e| EvalError::lookup("fund_summaries", e))?;
        if summaries.is_empty() {
            return Ok(());
        }
        self.update_fund_summaries(&mut summaries, &prices).await
    }

    /// Look up the asset's live price, remember it in `prices`, and decide
    /// whether a threshold alert is due.
    pub async fn check_thresholds(
        &self,
        asset_id: AssetId,
        prices: &mut PriceMap,
    ) -> EvalResult<Option<String>> {
        let asset = self
            .storage
            .asset(asset_id)
            .await
            .map_err(|e| EvalError::asset_lookup("asset", asset_id, e))?;
        let category = asset
            .category()
            .map_err(|e| EvalError::asset_lookup("category", asset_id, e.into()))?;
        let price = self
            .realtime
            .current_price(category, &asset.code)
            .await
            .map_err(|e| EvalError::asset_lookup("current_price", asset_id, e))?;

        info!(asset = %asset.name, category = category.name(), price, "current price");
        prices.insert(asset_id, price);

        Ok(threshold_message(&asset, price, &self.alerts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Currency;

    fn asset(buy: f64, sell: f64) -> Asset {
        Asset {
            id: AssetId(11),
            name: "TIGER S&P500".into(),
            category: 9,
            currency: Currency::Krw,
            code: "360750".into(),
            top: 0.0,
            bottom: 0.0,
            sell_price: sell,
            buy_price: buy,
        }
    }

    #[test]
    fn buy_fires_once_per_threshold() {
        let alerts = AlertCache::new();
        let a = asset(100.0, 150.0);

        let msg = threshold_message(&a, 95.0, &alerts).unwrap();
        assert_eq!(msg, "BUY TIGER S&P500. ID : 11. LOWER BOUND : 100. CURRENT PRICE : 95");
        assert_eq!(threshold_message(&a, 95.0, &alerts), None);
        assert_eq!(threshold_message(&a, 90.0, &alerts), None);

        // A new threshold is a new alert.
        let moved = asset(97.0, 150.0);
        assert!(threshold_message(&moved, 90.0, &alerts).is_some());
    }

    #[test]
    fn sell_fires_at_or_above_threshold() {
        let alerts = AlertCache::new();
        let a = asset(100.0, 150.0);
        assert_eq!(threshold_message(&a, 120.0, &alerts), None);
        let msg = threshold_message(&a, 150.0, &alerts).unwrap();
        assert!(msg.starts_with("SELL TIGER S&P500"), "{msg}");
        assert_eq!(threshold_message(&a, 160.0, &alerts), None);
    }

    #[test]
    fn zero_sell_price_never_sells() {
        let alerts = AlertCache::new();
        let a = asset(100.0, 0.0);
        for price in [101.0, 1_000.0, 1e12] {
            assert_eq!(threshold_message(&a, price, &alerts), None);
        }
        assert!(alerts.is_empty());
    }

    #[test]
    fn alerted_buy_falls_through_to_sell_check() {
        // buy == sell makes both sides eligible at the same price.
        let alerts = AlertCache::new();
        let a = asset(100.0, 100.0);
        assert!(threshold_message(&a, 100.0, &alerts).unwrap().starts_with("BUY"));
        assert!(threshold_message(&a, 100.0, &alerts).unwrap().starts_with("SELL"));
        assert_eq!(threshold_message(&a, 100.0, &alerts), None);
    }
}
