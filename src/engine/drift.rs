//! Portfolio drift: is each fund's volatile share inside the band of the
//! current market phase? Out-of-band funds get a ranked remediation list.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::debug;

use crate::engine::scoring::{priority_score, rank, RankMode, Ranked};
use crate::engine::{EventEvaluator, Operation};
use crate::error::{EvalError, EvalResult};
use crate::market::{BandPosition, MarketLevel, VolatileBand};
use crate::outbox::Outbox;
use crate::types::{FundId, InvestSummary};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FundTotals {
    pub stable: f64,
    pub volatile: f64,
}

impl FundTotals {
    pub fn total(&self) -> f64 {
        self.stable + self.volatile
    }

    /// `None` for an empty fund.
    pub fn volatile_ratio(&self) -> Option<f64> {
        let total = self.total();
        (total != 0.0).then(|| self.volatile / total)
    }
}

/// Base-currency stable/volatile totals per fund.
pub fn fund_totals(
    summaries: &[InvestSummary],
    exchange_rate: f64,
) -> EvalResult<BTreeMap<FundId, FundTotals>> {
    let mut totals: BTreeMap<FundId, FundTotals> = BTreeMap::new();
    for s in summaries {
        let value = if s.asset.currency.is_foreign() {
            s.sum * exchange_rate
        } else {
            s.sum
        };
        let category = s
            .asset
            .category()
            .map_err(|e| EvalError::asset_lookup("category", s.asset_id, e.into()))?;

        let t = totals.entry(s.fund_id).or_default();
        if category.is_stable() {
            t.stable += value;
        } else {
            t.volatile += value;
        }
    }
    Ok(totals)
}

#[derive(Clone, Debug, PartialEq)]
pub struct FundDrift {
    pub fund_id: FundId,
    pub ratio: f64,
    pub level: MarketLevel,
    pub band: VolatileBand,
    pub mode: RankMode,
    pub ranked: Vec<Ranked>,
}

impl FundDrift {
    pub fn breached_bound(&self) -> f64 {
        match self.mode {
            RankMode::Sell => self.band.max_volatile_rate,
            RankMode::Buy => self.band.min_volatile_rate,
        }
    }

    pub fn render(&self) -> String {
        let mut s = String::new();
        s.push_str(&"=".repeat(20));
        s.push('\n');
        let verdict = match self.mode {
            RankMode::Sell => "above",
            RankMode::Buy => "below",
        };
        let _ = writeln!(
            s,
            "Fund {} volatile ratio {verdict} band. ratio : {:.2}. market phase : {}({:.1})",
            self.fund_id,
            self.ratio,
            self.level,
            self.breached_bound()
        );
        s.push('\n');
        for r in &self.ranked {
            let _ = writeln!(
                s,
                "AssetId : {}, AssetName : {}, CurrentPrice : {}, AveragePrice : {}, HighestPrice : {}",
                r.asset.id, r.asset.name, r.price.current, r.price.average, r.price.highest
            );
        }
        s
    }
}

impl EventEvaluator {
    pub async fn portfolio_event(&self, out: &Outbox) {
        match self.portfolio_pass().await {
            Ok(report) => {
                for fund in &report {
                    out.send(fund.render());
                }
            }
            Err(e) => out.error(Operation::PortfolioEvent, e),
        }
    }

    async fn portfolio_pass(&self) -> EvalResult<Vec<FundDrift>> {
        let summaries = self
            .storage
            .fund_summaries()
            .await
            .map_err(|e| EvalError::lookup("fund_summaries", e))?;
        if summaries.is_empty() {
            return Ok(Vec::new());
        }

        let market = self
            .storage
            .market_status(self.today())
            .await
            .map_err(|e| EvalError::lookup("market_status", e))?;
        let level = MarketLevel::from_status(market.status)?;
        let exchange_rate = self
            .daily
            .exchange_rate()
            .await
            .map_err(|e| EvalError::lookup("exchange_rate", e))?;

        self.analyze_drift(&summaries, level, exchange_rate).await
    }

    /// Build the drift report. Any failure discards the whole report.
    pub async fn analyze_drift(
        &self,
        summaries: &[InvestSummary],
        level: MarketLevel,
        exchange_rate: f64,
    ) -> EvalResult<Vec<FundDrift>> {
        if exchange_rate == 0.0 {
            return Err(EvalError::ZeroExchangeRate);
        }
        let band = self.cfg.band(level).ok_or(EvalError::MissingBand(level))?;

        let mut report = Vec::new();
        for (fund_id, totals) in fund_totals(summaries, exchange_rate)? {
            let Some(ratio) = totals.volatile_ratio() else {
                continue;
            };
            let mode = match band.position(ratio) {
                BandPosition::Inside => continue,
                BandPosition::Above => RankMode::Sell,
                BandPosition::Below => RankMode::Buy,
            };
            debug!(%fund_id, ratio, ?mode, "fund outside volatile band");

            let mut ranked = Vec::new();
            for s in summaries.iter().filter(|s| s.fund_id == fund_id) {
                let category = s
                    .asset
                    .category()
                    .map_err(|e| EvalError::asset_lookup("category", s.asset_id, e.into()))?;
                if category.is_stable() {
                    continue;
                }
                let price = self
                    .realtime
                    .asset_price_info(category, &s.asset.code)
                    .await
                    .map_err(|e| EvalError::asset_lookup("asset_price_info", s.asset_id, e))?;
                let score = priority_score(s.asset_id, &price, &self.cfg.score_weights)?;
                ranked.push(Ranked {
                    asset: s.asset.clone(),
                    price,
                    score,
                });
            }
            rank(&mut ranked, mode);

            report.push(FundDrift {
                fund_id,
                ratio,
                level,
                band,
                mode,
                ranked,
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Asset, AssetId, Currency};

    fn holding(
        fund: u64,
        asset: u64,
        category: u32,
        currency: Currency,
        sum: f64,
    ) -> InvestSummary {
        InvestSummary {
            fund_id: FundId(fund),
            asset_id: AssetId(asset),
            asset: Asset {
                id: AssetId(asset),
                name: format!("asset-{asset}"),
                category,
                currency,
                code: format!("code-{asset}"),
                top: 0.0,
                bottom: 0.0,
                sell_price: 0.0,
                buy_price: 0.0,
            },
            count: 1.0,
            sum,
        }
    }

    #[test]
    fn foreign_holdings_are_converted_before_classification() {
        let summaries = vec![
            holding(1, 1, 1, Currency::Krw, 1_000.0),
            holding(1, 2, 7, Currency::Usd, 2.0),
            holding(2, 3, 6, Currency::Krw, 500.0),
        ];
        let totals = fund_totals(&summaries, 1_500.0).unwrap();

        assert_eq!(totals[&FundId(1)], FundTotals { stable: 1_000.0, volatile: 3_000.0 });
        assert_eq!(totals[&FundId(1)].volatile_ratio(), Some(0.75));
        assert_eq!(totals[&FundId(2)].volatile_ratio(), Some(1.0));
    }

    #[test]
    fn empty_fund_has_no_ratio() {
        let summaries = vec![holding(3, 1, 1, Currency::Krw, 0.0)];
        let totals = fund_totals(&summaries, 1.0).unwrap();
        assert_eq!(totals[&FundId(3)].volatile_ratio(), None);
    }

    #[test]
    fn unknown_category_aborts_totals() {
        let summaries = vec![holding(1, 5, 99, Currency::Krw, 10.0)];
        assert!(fund_totals(&summaries, 1.0).is_err());
    }

    #[test]
    fn render_names_the_breached_bound() {
        let drift = FundDrift {
            fund_id: FundId(2),
            ratio: 0.8512,
            level: MarketLevel::Greed,
            band: VolatileBand::new(0.4, 0.6),
            mode: RankMode::Sell,
            ranked: vec![],
        };
        let text = drift.render();
        assert!(text.starts_with("===================="), "{text}");
        let header = "Fund 2 volatile ratio above band. ratio : 0.85. market phase : GREED(0.6)";
        assert!(text.contains(header), "{text}");
    }
}
