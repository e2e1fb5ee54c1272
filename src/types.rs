use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::category::Category;
use crate::error::EvalError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FundId(pub u64);

impl fmt::Display for FundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted as its ISO code (`"KRW"`, `"USD"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    Krw,
    Usd,
}

impl Currency {
    /// Holdings in a foreign currency are multiplied by the FX rate before
    /// they are compared against base-currency holdings.
    pub fn is_foreign(self) -> bool {
        matches!(self, Currency::Usd)
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
        }
    }
}

impl FromStr for Currency {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "KRW" => Ok(Currency::Krw),
            "USD" => Ok(Currency::Usd),
            _ => Err(EvalError::UnknownCurrency(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for Currency {
    type Error = EvalError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    /// Raw category code as persisted; see [`Category::from_code`].
    pub category: u32,
    pub currency: Currency,
    /// Code understood by the realtime price source (ticker, market id, ...).
    pub code: String,
    pub top: f64,
    pub bottom: f64,
    /// 0 means "no sell threshold".
    pub sell_price: f64,
    pub buy_price: f64,
}

impl Asset {
    pub fn category(&self) -> Result<Category, EvalError> {
        Category::from_code(self.category)
    }

    pub fn has_sell_threshold(&self) -> bool {
        self.sell_price != 0.0
    }

    /// Buy threshold must not exceed the sell threshold when one is set.
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.has_sell_threshold() && self.buy_price > self.sell_price {
            return Err(EvalError::InvalidThresholds {
                asset_id: self.id,
                buy: self.buy_price,
                sell: self.sell_price,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    pub id: FundId,
    pub name: String,
}

/// A single purchase lot. Lots are only ever appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invest {
    pub fund_id: FundId,
    pub asset_id: AssetId,
    pub price: f64,
    pub count: f64,
}

/// Aggregate holding of one asset inside one fund.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvestSummary {
    pub fund_id: FundId,
    pub asset_id: AssetId,
    pub asset: Asset,
    pub count: f64,
    /// Current total value in the asset's own currency.
    pub sum: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub date: NaiveDate,
    /// Ordinal market level, see [`crate::market::MarketLevel`].
    pub status: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyIndex {
    pub date: NaiveDate,
    pub fear_greed_index: u32,
    /// Benchmark equity index (Nasdaq composite in practice).
    pub benchmark: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CliIndex {
    pub date: NaiveDate,
    pub index: f64,
}

/// Price history snapshot returned by the realtime provider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub current: f64,
    /// Weighted average paid price.
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
}
