use thiserror::Error;

use crate::market::MarketLevel;
use crate::types::{AssetId, FundId};

/// Failures raised while evaluating an event pass.
///
/// The evaluator never returns these to its caller; they are rendered onto the
/// output stream with the operation name in front.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("{operation} failed{}: {source:#}", fmt_asset(.asset_id))]
    Lookup {
        operation: &'static str,
        asset_id: Option<AssetId>,
        #[source]
        source: anyhow::Error,
    },

    #[error("unknown asset category code {0}")]
    UnknownCategory(u32),
    #[error("unknown currency '{0}'")]
    UnknownCurrency(String),
    #[error("unknown market level {0}")]
    UnknownMarketLevel(u32),
    #[error("no volatile band configured for market level {0}")]
    MissingBand(MarketLevel),

    #[error("exchange rate returned 0")]
    ZeroExchangeRate,

    #[error("no current price observed for asset {asset_id} (fund {fund_id})")]
    MissingPrice { fund_id: FundId, asset_id: AssetId },
    #[error("current price {price} for asset {asset_id} is not positive")]
    NonPositivePrice { asset_id: AssetId, price: f64 },

    #[error("asset {asset_id}: buy price {buy} exceeds sell price {sell}")]
    InvalidThresholds { asset_id: AssetId, buy: f64, sell: f64 },
}

fn fmt_asset(asset_id: &Option<AssetId>) -> String {
    asset_id.map(|id| format!(" for asset {id}")).unwrap_or_default()
}

impl EvalError {
    pub fn lookup(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Lookup {
            operation,
            asset_id: None,
            source,
        }
    }

    pub fn asset_lookup(operation: &'static str, asset_id: AssetId, source: anyhow::Error) -> Self {
        Self::Lookup {
            operation,
            asset_id: Some(asset_id),
            source,
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
