//! Portfolio event bot.
//!
//! Watches live and daily market data for a personal portfolio and turns it
//! into advisory messages: buy/sell threshold alerts, fund revaluation,
//! volatile-asset drift against the current market phase, and daily macro
//! indicator snapshots.

pub mod alerts;
pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod market;
pub mod outbox;
pub mod ports;
pub mod types;

pub use crate::config::EngineConfig;
pub use crate::engine::{EventEvaluator, Operation};
pub use crate::outbox::Outbox;
