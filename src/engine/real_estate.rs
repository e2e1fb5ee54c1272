use tracing::info;

use crate::engine::{EventEvaluator, Operation};
use crate::error::EvalError;
use crate::outbox::Outbox;

impl EventEvaluator {
    /// Alert when the redevelopment status moves away from the configured
    /// baseline. Surrounding whitespace in the fetched text is ignored.
    pub async fn real_estate_event(&self, out: &Outbox) {
        let status = match self.realtime.real_estate_status().await {
            Ok(s) => s,
            Err(e) => {
                let err = EvalError::lookup("real_estate_status", e);
                return out.error(Operation::RealEstateEvent, err);
            }
        };

        let baseline = &self.cfg.real_estate_baseline;
        if status.trim() == baseline.as_str() {
            info!(%status, "real estate status unchanged");
        } else {
            out.send(format!(
                "Real estate status changed. {baseline} => {}",
                status.trim()
            ));
        }
    }
}
