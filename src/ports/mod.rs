//! Capabilities the engine consumes. Backing adapters (database, scrapers,
//! vendor APIs) live behind these traits; `memory` provides in-process ones.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::category::Category;
use crate::types::{Asset, AssetId, CliIndex, DailyIndex, FundId, InvestSummary, Market, PriceInfo};

pub mod memory;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Market phase in effect on `date` (the latest record at or before it).
    async fn market_status(&self, date: NaiveDate) -> anyhow::Result<Market>;

    async fn asset_list(&self) -> anyhow::Result<Vec<Asset>>;

    async fn asset(&self, id: AssetId) -> anyhow::Result<Asset>;

    /// All holdings, ordered by fund id.
    async fn fund_summaries(&self) -> anyhow::Result<Vec<InvestSummary>>;

    async fn update_summary_sum(
        &self,
        fund_id: FundId,
        asset_id: AssetId,
        sum: f64,
    ) -> anyhow::Result<()>;

    async fn daily_index(&self, date: NaiveDate) -> anyhow::Result<Option<DailyIndex>>;

    async fn save_daily_index(
        &self,
        date: NaiveDate,
        fear_greed: u32,
        benchmark: f64,
    ) -> anyhow::Result<()>;

    /// Most recent CLI record strictly before `date`.
    async fn cli_index_before(&self, date: NaiveDate) -> anyhow::Result<Option<CliIndex>>;

    async fn save_cli_index(&self, date: NaiveDate, index: f64) -> anyhow::Result<()>;
}

#[async_trait]
pub trait RealtimeDataProvider: Send + Sync {
    async fn current_price(&self, category: Category, code: &str) -> anyhow::Result<f64>;

    async fn asset_price_info(&self, category: Category, code: &str) -> anyhow::Result<PriceInfo>;

    async fn real_estate_status(&self) -> anyhow::Result<String>;
}

#[async_trait]
pub trait DailyDataProvider: Send + Sync {
    /// Units of base currency per unit of foreign currency.
    async fn exchange_rate(&self) -> anyhow::Result<f64>;

    async fn fear_greed_index(&self) -> anyhow::Result<u32>;

    async fn benchmark_index(&self) -> anyhow::Result<f64>;

    async fn composite_leading_indicator(&self) -> anyhow::Result<f64>;
}
