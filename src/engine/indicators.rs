use crate::engine::{EventEvaluator, Operation};
use crate::error::EvalError;
use crate::outbox::Outbox;
use crate::types::{CliIndex, DailyIndex};

pub fn daily_message(fear_greed: u32, benchmark: f64, previous: Option<&DailyIndex>) -> String {
    match previous {
        Some(prev) => format!(
            "Fear & greed index today : {fear_greed} (previous : {})\nBenchmark today : {benchmark:.2} (previous : {:.2})",
            prev.fear_greed_index, prev.benchmark
        ),
        None => format!(
            "Fear & greed index today : {fear_greed}\nBenchmark today : {benchmark:.2}"
        ),
    }
}

pub fn cli_message(index: f64, previous: Option<&CliIndex>) -> String {
    match previous {
        Some(prev) => format!(
            "Composite leading indicator : {index:.2} (previous {} : {:.2}, change {:+.2})",
            prev.date,
            prev.index,
            index - prev.index
        ),
        None => format!("Composite leading indicator : {index:.2}"),
    }
}

impl EventEvaluator {
    /// Record today's fear-greed and benchmark values and compare them with
    /// yesterday's. Saving and reporting are independent best-effort steps.
    pub async fn index_event(&self, out: &Outbox) {
        let op = Operation::IndexEvent;

        let fear_greed = match self.daily.fear_greed_index().await {
            Ok(v) => v,
            Err(e) => return out.error(op, EvalError::lookup("fear_greed_index", e)),
        };
        let benchmark = match self.daily.benchmark_index().await {
            Ok(v) => v,
            Err(e) => return out.error(op, EvalError::lookup("benchmark_index", e)),
        };

        let today = self.today();
        if let Err(e) = self.storage.save_daily_index(today, fear_greed, benchmark).await {
            out.error(op, EvalError::lookup("save_daily_index", e));
        }

        let previous = match today.pred_opt() {
            Some(yesterday) => match self.storage.daily_index(yesterday).await {
                Ok(prev) => prev,
                Err(e) => {
                    out.error(op, EvalError::lookup("daily_index", e));
                    None
                }
            },
            None => None,
        };
        out.send(daily_message(fear_greed, benchmark, previous.as_ref()));
    }

    /// Record the composite leading indicator and compare it with the last
    /// stored value.
    pub async fn cli_event(&self, out: &Outbox) {
        let op = Operation::CliEvent;

        let index = match self.daily.composite_leading_indicator().await {
            Ok(v) => v,
            Err(e) => return out.error(op, EvalError::lookup("composite_leading_indicator", e)),
        };

        let today = self.today();
        if let Err(e) = self.storage.save_cli_index(today, index).await {
            out.error(op, EvalError::lookup("save_cli_index", e));
        }

        let previous = match self.storage.cli_index_before(today).await {
            Ok(prev) => prev,
            Err(e) => {
                out.error(op, EvalError::lookup("cli_index_before", e));
                None
            }
        };
        out.send(cli_message(index, previous.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn daily_message_with_and_without_previous() {
        assert_eq!(
            daily_message(25, 15_000.5, None),
            "Fear & greed index today : 25\nBenchmark today : 15000.50"
        );
        let prev = DailyIndex {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            fear_greed_index: 30,
            benchmark: 15_100.0,
        };
        assert_eq!(
            daily_message(25, 15_000.5, Some(&prev)),
            "Fear & greed index today : 25 (previous : 30)\nBenchmark today : 15000.50 (previous : 15100.00)"
        );
    }

    #[test]
    fn cli_message_shows_signed_change() {
        let prev = CliIndex {
            date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            index: 100.25,
        };
        assert_eq!(
            cli_message(99.75, Some(&prev)),
            "Composite leading indicator : 99.75 (previous 2024-04-01 : 100.25, change -0.50)"
        );
        assert_eq!(cli_message(99.75, None), "Composite leading indicator : 99.75");
    }
}
