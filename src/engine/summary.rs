use tracing::debug;

use crate::engine::threshold::PriceMap;
use crate::engine::EventEvaluator;
use crate::error::{EvalError, EvalResult};
use crate::types::InvestSummary;

impl EventEvaluator {
    /// Revalue every holding as `price × count` and persist it.
    ///
    /// Stops at the first failure; holdings already written stay written.
    pub async fn update_fund_summaries(
        &self,
        summaries: &mut [InvestSummary],
        prices: &PriceMap,
    ) -> EvalResult<()> {
        for s in summaries.iter_mut() {
            let price = prices.get(&s.asset_id).copied().ok_or(EvalError::MissingPrice {
                fund_id: s.fund_id,
                asset_id: s.asset_id,
            })?;
            s.sum = price * s.count;
            self.storage
                .update_summary_sum(s.fund_id, s.asset_id, s.sum)
                .await
                .map_err(|e| EvalError::asset_lookup("update_summary_sum", s.asset_id, e))?;
        }
        debug!(holdings = summaries.len(), "fund summaries revalued");
        Ok(())
    }
}
