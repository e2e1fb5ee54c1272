use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use crate::category::Category;
use crate::market::MarketLevel;
use crate::ports::{DailyDataProvider, RealtimeDataProvider, Storage};
use crate::types::*;

/// Injected failures for the in-memory ports, keyed by port method name.
#[derive(Debug, Default)]
pub struct FaultPlan {
    /// Remaining successful calls before the operation starts failing.
    remaining: DashMap<&'static str, usize>,
}

impl FaultPlan {
    pub fn fail(&self, op: &'static str) {
        self.fail_after(op, 0);
    }

    pub fn fail_after(&self, op: &'static str, successes: usize) {
        self.remaining.insert(op, successes);
    }

    pub fn heal(&self, op: &'static str) {
        self.remaining.remove(&op);
    }

    fn check(&self, op: &'static str) -> anyhow::Result<()> {
        let Some(mut left) = self.remaining.get_mut(&op) else {
            return Ok(());
        };
        if *left == 0 {
            anyhow::bail!("injected failure in {op}");
        }
        *left -= 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    funds: DashMap<FundId, Fund>,
    assets: DashMap<AssetId, Asset>,
    lots: Mutex<Vec<Invest>>,
    /// Ordered by (fund, asset) so listing comes out grouped by fund id.
    summaries: Mutex<BTreeMap<(FundId, AssetId), InvestSummary>>,
    markets: Mutex<BTreeMap<NaiveDate, Market>>,
    daily: DashMap<NaiveDate, DailyIndex>,
    cli: Mutex<BTreeMap<NaiveDate, CliIndex>>,
    pub faults: FaultPlan,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_fund(&self, fund: Fund) {
        self.funds.insert(fund.id, fund);
    }

    pub fn insert_asset(&self, asset: Asset) -> anyhow::Result<()> {
        asset.validate()?;
        asset.category()?;
        self.assets.insert(asset.id, asset);
        Ok(())
    }

    pub fn set_market(&self, date: NaiveDate, level: MarketLevel) {
        self.insert_market(Market {
            date,
            status: level.status(),
        });
    }

    /// Stores the record as-is; the status is only checked when it is read.
    pub fn insert_market(&self, market: Market) {
        self.markets.lock().insert(market.date, market);
    }

    pub fn insert_daily_index(&self, index: DailyIndex) {
        self.daily.insert(index.date, index);
    }

    /// Append a purchase lot and fold its count into the holding summary.
    pub fn record_invest(&self, lot: Invest) -> anyhow::Result<()> {
        anyhow::ensure!(self.funds.contains_key(&lot.fund_id), "unknown fund {}", lot.fund_id);
        let asset = self
            .assets
            .get(&lot.asset_id)
            .map(|a| a.value().clone())
            .with_context(|| format!("unknown asset {}", lot.asset_id))?;

        let mut summaries = self.summaries.lock();
        let entry = summaries
            .entry((lot.fund_id, lot.asset_id))
            .or_insert_with(|| InvestSummary {
                fund_id: lot.fund_id,
                asset_id: lot.asset_id,
                asset,
                count: 0.0,
                sum: 0.0,
            });
        entry.count += lot.count;
        self.lots.lock().push(lot);
        Ok(())
    }

    pub fn lots(&self) -> Vec<Invest> {
        self.lots.lock().clone()
    }

    pub fn summary(&self, fund_id: FundId, asset_id: AssetId) -> Option<InvestSummary> {
        self.summaries.lock().get(&(fund_id, asset_id)).cloned()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn market_status(&self, date: NaiveDate) -> anyhow::Result<Market> {
        self.faults.check("market_status")?;
        self.markets
            .lock()
            .range(..=date)
            .next_back()
            .map(|(_, m)| m.clone())
            .with_context(|| format!("no market status recorded on or before {date}"))
    }

    async fn asset_list(&self) -> anyhow::Result<Vec<Asset>> {
        self.faults.check("asset_list")?;
        let mut out: Vec<Asset> = self.assets.iter().map(|a| a.value().clone()).collect();
        out.sort_by_key(|a| a.id);
        Ok(out)
    }

    async fn asset(&self, id: AssetId) -> anyhow::Result<Asset> {
        self.faults.check("asset")?;
        self.assets
            .get(&id)
            .map(|a| a.value().clone())
            .with_context(|| format!("asset {id} not found"))
    }

    async fn fund_summaries(&self) -> anyhow::Result<Vec<InvestSummary>> {
        self.faults.check("fund_summaries")?;
        let summaries = self.summaries.lock();
        Ok(summaries
            .values()
            .map(|s| {
                let mut s = s.clone();
                if let Some(asset) = self.assets.get(&s.asset_id) {
                    s.asset = asset.value().clone();
                }
                s
            })
            .collect())
    }

    async fn update_summary_sum(
        &self,
        fund_id: FundId,
        asset_id: AssetId,
        sum: f64,
    ) -> anyhow::Result<()> {
        self.faults.check("update_summary_sum")?;
        let mut summaries = self.summaries.lock();
        let entry = summaries
            .get_mut(&(fund_id, asset_id))
            .with_context(|| format!("no holding of asset {asset_id} in fund {fund_id}"))?;
        entry.sum = sum;
        Ok(())
    }

    async fn daily_index(&self, date: NaiveDate) -> anyhow::Result<Option<DailyIndex>> {
        self.faults.check("daily_index")?;
        Ok(self.daily.get(&date).map(|d| d.value().clone()))
    }

    async fn save_daily_index(
        &self,
        date: NaiveDate,
        fear_greed: u32,
        benchmark: f64,
    ) -> anyhow::Result<()> {
        self.faults.check("save_daily_index")?;
        self.daily.insert(
            date,
            DailyIndex {
                date,
                fear_greed_index: fear_greed,
                benchmark,
            },
        );
        Ok(())
    }

    async fn cli_index_before(&self, date: NaiveDate) -> anyhow::Result<Option<CliIndex>> {
        self.faults.check("cli_index_before")?;
        Ok(self.cli.lock().range(..date).next_back().map(|(_, c)| c.clone()))
    }

    async fn save_cli_index(&self, date: NaiveDate, index: f64) -> anyhow::Result<()> {
        self.faults.check("save_cli_index")?;
        self.cli.lock().insert(date, CliIndex { date, index });
        Ok(())
    }
}

/// Realtime quotes held in memory, keyed by price code.
#[derive(Default)]
pub struct StaticRealtimeProvider {
    quotes: DashMap<String, PriceInfo>,
    real_estate: Mutex<String>,
    pub faults: FaultPlan,
}

impl StaticRealtimeProvider {
    pub fn new(real_estate_status: impl Into<String>) -> Self {
        Self {
            real_estate: Mutex::new(real_estate_status.into()),
            ..Self::default()
        }
    }

    pub fn set_price_info(&self, code: impl Into<String>, info: PriceInfo) {
        self.quotes.insert(code.into(), info);
    }

    /// Move the current price, widening the high/low marks when crossed.
    pub fn set_price(&self, code: &str, price: f64) {
        let mut entry = self.quotes.entry(code.to_string()).or_insert(PriceInfo {
            current: price,
            average: price,
            highest: price,
            lowest: price,
        });
        entry.current = price;
        entry.highest = entry.highest.max(price);
        entry.lowest = entry.lowest.min(price);
    }

    pub fn price(&self, code: &str) -> Option<f64> {
        self.quotes.get(code).map(|q| q.current)
    }

    pub fn set_real_estate_status(&self, status: impl Into<String>) {
        *self.real_estate.lock() = status.into();
    }

    fn quote(&self, category: Category, code: &str) -> anyhow::Result<PriceInfo> {
        self.quotes
            .get(code)
            .map(|q| *q.value())
            .with_context(|| format!("no {:?} quote for '{code}'", category.price_source()))
    }
}

#[async_trait]
impl RealtimeDataProvider for StaticRealtimeProvider {
    async fn current_price(&self, category: Category, code: &str) -> anyhow::Result<f64> {
        self.faults.check("current_price")?;
        Ok(self.quote(category, code)?.current)
    }

    async fn asset_price_info(&self, category: Category, code: &str) -> anyhow::Result<PriceInfo> {
        self.faults.check("asset_price_info")?;
        self.quote(category, code)
    }

    async fn real_estate_status(&self) -> anyhow::Result<String> {
        self.faults.check("real_estate_status")?;
        Ok(self.real_estate.lock().clone())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DailyValues {
    pub exchange_rate: f64,
    pub fear_greed_index: u32,
    pub benchmark: f64,
    pub cli: f64,
}

pub struct StaticDailyProvider {
    values: Mutex<DailyValues>,
    pub faults: FaultPlan,
}

impl StaticDailyProvider {
    pub fn new(values: DailyValues) -> Self {
        Self {
            values: Mutex::new(values),
            faults: FaultPlan::default(),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut DailyValues)) {
        f(&mut self.values.lock());
    }
}

#[async_trait]
impl DailyDataProvider for StaticDailyProvider {
    async fn exchange_rate(&self) -> anyhow::Result<f64> {
        self.faults.check("exchange_rate")?;
        Ok(self.values.lock().exchange_rate)
    }

    async fn fear_greed_index(&self) -> anyhow::Result<u32> {
        self.faults.check("fear_greed_index")?;
        Ok(self.values.lock().fear_greed_index)
    }

    async fn benchmark_index(&self) -> anyhow::Result<f64> {
        self.faults.check("benchmark_index")?;
        Ok(self.values.lock().benchmark)
    }

    async fn composite_leading_indicator(&self) -> anyhow::Result<f64> {
        self.faults.check("composite_leading_indicator")?;
        Ok(self.values.lock().cli)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn fault_plan_counts_down_successes() {
        let storage = MemoryStorage::new();
        storage.faults.fail_after("daily_index", 1);
        assert!(storage.daily_index(date(1)).await.is_ok());
        assert!(storage.daily_index(date(1)).await.is_err());
        storage.faults.heal("daily_index");
        assert!(storage.daily_index(date(1)).await.is_ok());
    }

    #[tokio::test]
    async fn market_status_uses_latest_record_not_after_date() {
        let storage = MemoryStorage::new();
        storage.set_market(date(1), MarketLevel::Fear);
        storage.set_market(date(10), MarketLevel::Greed);

        assert_eq!(storage.market_status(date(5)).await.unwrap().status, 2);
        assert_eq!(storage.market_status(date(10)).await.unwrap().status, 4);
        assert!(storage.market_status(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()).await.is_err());
    }

    #[tokio::test]
    async fn lots_accumulate_into_summary_count() {
        let storage = MemoryStorage::new();
        storage.insert_fund(Fund { id: FundId(1), name: "pension".into() });
        storage
            .insert_asset(Asset {
                id: AssetId(3),
                name: "BTC".into(),
                category: 6,
                currency: Currency::Krw,
                code: "KRW-BTC".into(),
                top: 0.0,
                bottom: 0.0,
                sell_price: 0.0,
                buy_price: 0.0,
            })
            .unwrap();

        for count in [0.5, 0.25] {
            storage
                .record_invest(Invest {
                    fund_id: FundId(1),
                    asset_id: AssetId(3),
                    price: 90_000_000.0,
                    count,
                })
                .unwrap();
        }

        assert_eq!(storage.lots().len(), 2);
        assert_eq!(storage.summary(FundId(1), AssetId(3)).unwrap().count, 0.75);
        assert!(storage
            .record_invest(Invest {
                fund_id: FundId(2),
                asset_id: AssetId(3),
                price: 1.0,
                count: 1.0,
            })
            .is_err());
    }

    #[tokio::test]
    async fn cli_lookup_skips_same_day() {
        let storage = MemoryStorage::new();
        storage.save_cli_index(date(1), 99.5).await.unwrap();
        storage.save_cli_index(date(2), 100.1).await.unwrap();
        let prev = storage.cli_index_before(date(2)).await.unwrap().unwrap();
        assert_eq!(prev.index, 99.5);
        assert!(storage.cli_index_before(date(1)).await.unwrap().is_none());
    }
}
