//! Event evaluation engine.
//!
//! Each operation makes its own pass over the ports and reports through an
//! [`Outbox`]. Failures are converted to messages; nothing is returned to the
//! trigger.

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::alerts::AlertCache;
use crate::config::EngineConfig;
use crate::outbox::Outbox;
use crate::ports::{DailyDataProvider, RealtimeDataProvider, Storage};

pub mod drift;
pub mod indicators;
pub mod real_estate;
pub mod scoring;
pub mod summary;
pub mod threshold;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Operation {
    AssetEvent,
    PortfolioEvent,
    RealEstateEvent,
    IndexEvent,
    CliEvent,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::AssetEvent,
        Operation::PortfolioEvent,
        Operation::RealEstateEvent,
        Operation::IndexEvent,
        Operation::CliEvent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::AssetEvent => "AssetEvent",
            Operation::PortfolioEvent => "PortfolioEvent",
            Operation::RealEstateEvent => "RealEstateEvent",
            Operation::IndexEvent => "IndexEvent",
            Operation::CliEvent => "CliEvent",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Clone)]
pub struct EventEvaluator {
    cfg: Arc<EngineConfig>,
    storage: Arc<dyn Storage>,
    realtime: Arc<dyn RealtimeDataProvider>,
    daily: Arc<dyn DailyDataProvider>,
    /// The only state that outlives a pass.
    alerts: Arc<AlertCache>,
    clock: fn() -> NaiveDate,
}

impl EventEvaluator {
    pub fn new(
        cfg: EngineConfig,
        storage: Arc<dyn Storage>,
        realtime: Arc<dyn RealtimeDataProvider>,
        daily: Arc<dyn DailyDataProvider>,
    ) -> Self {
        Self {
            cfg: Arc::new(cfg),
            storage,
            realtime,
            daily,
            alerts: Arc::new(AlertCache::new()),
            clock: local_today,
        }
    }

    pub fn with_alert_cache(mut self, alerts: Arc<AlertCache>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn alerts(&self) -> &Arc<AlertCache> {
        &self.alerts
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub async fn run(&self, op: Operation, out: &Outbox) {
        tracing::debug!(%op, "event pass starting");
        match op {
            Operation::AssetEvent => self.asset_event(out).await,
            Operation::PortfolioEvent => self.portfolio_event(out).await,
            Operation::RealEstateEvent => self.real_estate_event(out).await,
            Operation::IndexEvent => self.index_event(out).await,
            Operation::CliEvent => self.cli_event(out).await,
        }
        tracing::debug!(%op, "event pass finished");
    }

    /// Run the given operations as concurrent tasks sharing one outbox and
    /// wait for all of them.
    pub async fn dispatch(&self, ops: &[Operation], out: &Outbox) {
        let mut tasks = JoinSet::new();
        for &op in ops {
            let engine = self.clone();
            let out = out.clone();
            tasks.spawn(async move { engine.run(op, &out).await });
        }
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                tracing::error!(error = %e, "event task aborted");
            }
        }
    }
}
